//! Engine options drive the process log filter after installation.
//!
//! Kept to a single test: the subscriber is process-global.

use slotkeep::prelude::*;
use slotkeep::slotkeep_protocol::FORCED_LOG_TARGET;
use slotkeep::slotkeep_protocol::test_utils::StaticCatalog;
use std::sync::Arc;
use tracing::Level;

#[test]
fn options_and_hub_agree_with_the_subscriber() {
    assert!(init_tracing(LogLevel::Basic));
    let hub = Arc::new(DiagnosticsHub::default());
    let options = EngineOptions {
        log_level: LogLevel::Off,
        ..EngineOptions::default()
    };
    let _ctx = options.build_context(Arc::new(StaticCatalog::new(["Fire"])), hub.clone());

    assert_eq!(hub.level(), LogLevel::Off);
    assert!(!tracing::enabled!(Level::INFO));
    // per-instance debug logging still gets through
    assert!(tracing::enabled!(target: FORCED_LOG_TARGET, Level::INFO));

    hub.set_level(LogLevel::Verbose);
    assert!(hub.verbose_enabled());
    assert!(tracing::enabled!(Level::DEBUG));
}
