//! Keyed log throttling.

use std::collections::HashMap;

/// Shortest interval a key can be throttled for, in seconds.
pub const MIN_THROTTLE_INTERVAL: f32 = 0.05;
/// Seconds between two sweeps of expired keys.
pub const CLEANUP_INTERVAL: f32 = 30.0;
/// Cached key count that makes a sweep due early.
pub const CLEANUP_THRESHOLD: usize = 256;

/// Answers "may this log line fire now?" per key.
///
/// A key that fires is blocked until `now + max(0.05, interval)`. Keys
/// compare case-insensitively. Expired keys are swept at most every
/// [`CLEANUP_INTERVAL`] seconds, or sooner once [`CLEANUP_THRESHOLD`]
/// keys are cached.
#[derive(Debug, Default)]
pub struct ThrottleGate {
    expiry: HashMap<String, f32>,
    next_cleanup: f32,
}

impl ThrottleGate {
    /// Create an empty gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `key` may log at `now`; if so, blocks it for `min_interval`.
    pub fn should_log(&mut self, key: &str, min_interval: f32, now: f32) -> bool {
        if self.expiry.len() >= CLEANUP_THRESHOLD && now >= self.next_cleanup {
            self.cleanup(now);
        }

        let key = key.to_ascii_lowercase();
        if self.expiry.get(&key).is_some_and(|&expiry| now < expiry) {
            return false;
        }
        self.expiry.insert(key, now + min_interval.max(MIN_THROTTLE_INTERVAL));
        true
    }

    /// Drop expired keys if a sweep is due. Returns how many were dropped.
    pub fn cleanup(&mut self, now: f32) -> usize {
        if now < self.next_cleanup && self.expiry.len() < CLEANUP_THRESHOLD {
            return 0;
        }
        self.next_cleanup = now + CLEANUP_INTERVAL;
        let before = self.expiry.len();
        self.expiry.retain(|_, expiry| now < *expiry);
        before - self.expiry.len()
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.expiry.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.expiry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_blocks_until_interval_passes() {
        let mut gate = ThrottleGate::new();
        assert!(gate.should_log("swap:Sword:0:Fire", 0.5, 1.0));
        assert!(!gate.should_log("swap:Sword:0:Fire", 0.5, 1.4));
        assert!(gate.should_log("swap:Sword:0:Fire", 0.5, 1.5));
    }

    #[test]
    fn keys_ignore_case() {
        let mut gate = ThrottleGate::new();
        assert!(gate.should_log("Conflict:Sword:0:Frost", 1.0, 0.0));
        assert!(!gate.should_log("conflict:sword:0:frost", 1.0, 0.5));
    }

    #[test]
    fn tiny_intervals_are_floored() {
        let mut gate = ThrottleGate::new();
        assert!(gate.should_log("k", 0.0, 0.0));
        assert!(!gate.should_log("k", 0.0, 0.04));
        assert!(gate.should_log("k", 0.0, 0.05));
    }

    #[test]
    fn cleanup_waits_for_interval() {
        let mut gate = ThrottleGate::new();
        gate.cleanup(0.0);
        gate.should_log("a", 1.0, 0.0);
        gate.should_log("b", 100.0, 0.0);
        assert_eq!(gate.cleanup(10.0), 0);
        assert_eq!(gate.cleanup(30.0), 1);
        assert_eq!(gate.len(), 1);
    }

    #[test]
    fn many_keys_trigger_early_sweep() {
        let mut gate = ThrottleGate::new();
        gate.cleanup(0.0);
        for i in 0..CLEANUP_THRESHOLD {
            gate.should_log(&format!("k{i}"), 0.1, 0.0);
        }
        assert_eq!(gate.len(), CLEANUP_THRESHOLD);
        assert_eq!(gate.cleanup(1.0), CLEANUP_THRESHOLD);
        assert!(gate.is_empty());
    }
}
