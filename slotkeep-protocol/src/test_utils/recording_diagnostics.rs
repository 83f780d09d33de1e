//! RecordingDiagnostics: counts everything and lets every log through.

use crate::diagnostics::{Counter, Diagnostics};
use std::collections::HashMap;
use std::sync::Mutex;

/// A diagnostics sink that records counters and throttle keys.
/// `should_log` always answers `true`; use `.log_keys()` to see what
/// the engine asked for.
pub struct RecordingDiagnostics {
    counters: Mutex<HashMap<Counter, u64>>,
    log_keys: Mutex<Vec<String>>,
    verbose: bool,
}

impl RecordingDiagnostics {
    /// Create a recorder with verbose logging off.
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
            log_keys: Mutex::new(Vec::new()),
            verbose: false,
        }
    }

    /// Create a recorder that reports verbose logging as active.
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            ..Self::new()
        }
    }

    /// Current value of `counter`.
    pub fn count(&self, counter: Counter) -> u64 {
        self.counters
            .lock()
            .unwrap()
            .get(&counter)
            .copied()
            .unwrap_or(0)
    }

    /// Every key passed to `should_log`, in call order.
    pub fn log_keys(&self) -> Vec<String> {
        self.log_keys.lock().unwrap().clone()
    }
}

impl Default for RecordingDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn record(&self, counter: Counter) {
        *self.counters.lock().unwrap().entry(counter).or_insert(0) += 1;
    }

    fn should_log(&self, key: &str, _min_interval: f32, _now: f32) -> bool {
        self.log_keys.lock().unwrap().push(key.to_owned());
        true
    }

    fn verbose_enabled(&self) -> bool {
        self.verbose
    }
}
