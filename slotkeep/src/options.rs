//! Process-wide engine options.

use serde::{Deserialize, Deserializer, Serialize};
use slotkeep_diagnostics::{DiagnosticsHub, LogLevel};
use slotkeep_engine::EngineContext;
use slotkeep_protocol::{ConfigError, EffectCatalog};
use std::sync::Arc;

/// Switches that apply to every controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// When false every maintenance pass is a no-op.
    pub enabled: bool,
    /// Process log level. Parsed case-insensitively; unknown names are `Off`.
    #[serde(deserialize_with = "log_level_from_str")]
    pub log_level: LogLevel,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: LogLevel::Basic,
        }
    }
}

fn log_level_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LogLevel, D::Error> {
    let name = String::deserialize(deserializer)?;
    Ok(name.parse().unwrap_or(LogLevel::Off))
}

impl EngineOptions {
    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply these options to `hub` and build a context around it.
    pub fn build_context(
        &self,
        catalog: Arc<dyn EffectCatalog>,
        hub: Arc<DiagnosticsHub>,
    ) -> EngineContext {
        hub.set_level(self.log_level);
        let ctx = EngineContext::new(catalog, hub);
        ctx.switch.set(self.enabled);
        ctx
    }
}
