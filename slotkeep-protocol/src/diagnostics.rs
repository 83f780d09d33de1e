//! The Diagnostics collaborator: counters and a log throttle gate.
//!
//! Diagnostics are side outputs. Nothing the engine decides depends on
//! what a counter reads or whether a throttled log fires.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `tracing` target for messages an instance asked to see regardless of
/// the process log level. Subscribers installed by the engine always let
/// it through at `INFO`.
pub const FORCED_LOG_TARGET: &str = "slotkeep::forced";

/// Event kinds the engine counts.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    /// A slot's effect was swapped to the configured one.
    Swap,
    /// An energy write was executed.
    Refill,
    /// A swap ended with no active effect.
    LoadFailure,
    /// An energy write was deferred by the per-slot cooldown.
    CooldownSkip,
    /// An externally loaded effect was left in place.
    Conflict,
}

impl Counter {
    /// Every counter kind, in summary order.
    pub const ALL: [Counter; 5] = [
        Counter::Swap,
        Counter::Refill,
        Counter::LoadFailure,
        Counter::CooldownSkip,
        Counter::Conflict,
    ];

    /// Position in [`Counter::ALL`].
    pub fn index(self) -> usize {
        match self {
            Counter::Swap => 0,
            Counter::Refill => 1,
            Counter::LoadFailure => 2,
            Counter::CooldownSkip => 3,
            Counter::Conflict => 4,
        }
    }

    /// Short name used in summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Counter::Swap => "swaps",
            Counter::Refill => "refills",
            Counter::LoadFailure => "loadFailures",
            Counter::CooldownSkip => "cooldownSkips",
            Counter::Conflict => "conflicts",
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives counters and rate-limits noisy logs.
pub trait Diagnostics: Send + Sync {
    /// Increment `counter` by one.
    fn record(&self, counter: Counter);

    /// Whether a log keyed by `key` may fire at `now`. Returns `true` at
    /// most once per `min_interval` seconds for the same key.
    fn should_log(&self, key: &str, min_interval: f32, now: f32) -> bool;

    /// Whether verbose (per-write) logging is active at all.
    fn verbose_enabled(&self) -> bool {
        false
    }
}
