//! The diagnostics hub shared by every controller.

use crate::level::{self, LogLevel};
use crate::throttle::ThrottleGate;
use serde::Serialize;
use slotkeep_protocol::{Counter, Diagnostics};
use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

/// Seconds between two summary lines.
pub const SUMMARY_INTERVAL: f32 = 5.0;

const COUNTERS: usize = Counter::ALL.len();

/// Counter values at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    values: [u64; COUNTERS],
}

impl CounterSnapshot {
    /// Value of `counter`.
    pub fn get(&self, counter: Counter) -> u64 {
        self.values[counter.index()]
    }

    /// True when every counter is zero.
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0)
    }
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, counter) in Counter::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", counter, self.get(*counter))?;
        }
        Ok(())
    }
}

/// Counters, throttle gate, summary clock and log level.
#[derive(Debug)]
pub struct DiagnosticsHub {
    since_summary: [AtomicU64; COUNTERS],
    totals: [AtomicU64; COUNTERS],
    throttle: Mutex<ThrottleGate>,
    next_summary: Mutex<f32>,
    level: AtomicU8,
}

impl Default for DiagnosticsHub {
    fn default() -> Self {
        Self::new(LogLevel::default())
    }
}

impl DiagnosticsHub {
    /// Create a hub logging at `level`.
    pub fn new(level: LogLevel) -> Self {
        Self {
            since_summary: Default::default(),
            totals: Default::default(),
            throttle: Mutex::new(ThrottleGate::new()),
            next_summary: Mutex::new(0.0),
            level: AtomicU8::new(level.to_u8()),
        }
    }

    fn throttle(&self) -> MutexGuard<'_, ThrottleGate> {
        self.throttle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current log level.
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Change the log level, including the filter of a subscriber
    /// installed by [`init_tracing`](crate::init_tracing).
    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level.to_u8(), Ordering::Relaxed);
        level::apply_level(level);
    }

    /// Counts since the last emitted summary.
    pub fn since_summary(&self) -> CounterSnapshot {
        snapshot(&self.since_summary)
    }

    /// Counts since the hub was created.
    pub fn totals(&self) -> CounterSnapshot {
        snapshot(&self.totals)
    }

    /// Sweep expired throttle keys if a sweep is due.
    pub fn cleanup(&self, now: f32) -> usize {
        self.throttle().cleanup(now)
    }

    /// Cached throttle keys.
    pub fn throttled_keys(&self) -> usize {
        self.throttle().len()
    }

    /// Log and reset the since-summary counters if the summary is due and
    /// anything happened. `active` is the number of live controllers.
    pub fn emit_summary(&self, now: f32, active: usize) -> Option<CounterSnapshot> {
        {
            let mut next = self.next_summary.lock().unwrap_or_else(PoisonError::into_inner);
            if now < *next {
                return None;
            }
            *next = now + SUMMARY_INTERVAL;
        }

        if self.since_summary().is_zero() {
            return None;
        }
        let mut values = [0; COUNTERS];
        for (value, counter) in values.iter_mut().zip(&self.since_summary) {
            *value = counter.swap(0, Ordering::Relaxed);
        }
        let summary = CounterSnapshot { values };
        info!(
            event = "slotkeep.summary",
            active,
            interval = SUMMARY_INTERVAL,
            "summary: {summary}"
        );
        Some(summary)
    }
}

fn snapshot(counters: &[AtomicU64; COUNTERS]) -> CounterSnapshot {
    let mut values = [0; COUNTERS];
    for (value, counter) in values.iter_mut().zip(counters) {
        *value = counter.load(Ordering::Relaxed);
    }
    CounterSnapshot { values }
}

impl Diagnostics for DiagnosticsHub {
    fn record(&self, counter: Counter) {
        let index = counter.index();
        self.since_summary[index].fetch_add(1, Ordering::Relaxed);
        self.totals[index].fetch_add(1, Ordering::Relaxed);
    }

    fn should_log(&self, key: &str, min_interval: f32, now: f32) -> bool {
        self.throttle().should_log(key, min_interval, now)
    }

    fn verbose_enabled(&self) -> bool {
        self.level().is_verbose_enabled()
    }
}
