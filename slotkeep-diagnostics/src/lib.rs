#![deny(missing_docs)]
//! Diagnostics for the slotkeep maintenance engine.
//!
//! [`DiagnosticsHub`] implements [`slotkeep_protocol::Diagnostics`]:
//! counters the engine bumps as it works, and a [`ThrottleGate`] that
//! rate-limits noisy per-slot log lines. The hub also produces the
//! periodic summary line and carries the process [`LogLevel`].

mod hub;
mod level;
mod throttle;

pub use hub::{CounterSnapshot, DiagnosticsHub, SUMMARY_INTERVAL};
pub use level::{LogLevel, init_tracing};
pub use throttle::{CLEANUP_INTERVAL, CLEANUP_THRESHOLD, MIN_THROTTLE_INTERVAL, ThrottleGate};
