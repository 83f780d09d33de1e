//! Energy write scheduling.
//!
//! Two paths exist. The forced path (first apply, explicit reapply or a
//! swap this cycle) writes the full target and ignores the cooldown. The
//! maintenance path refills only once energy has dropped to the
//! configured threshold, and is rate limited per slot.

use crate::config::InstanceConfig;
use serde::Serialize;

/// Differences at or below this many energy units are not worth a write.
pub const ENERGY_EPSILON: f32 = 0.01;

/// Scheduler parameters taken from an [`InstanceConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyPolicy {
    /// Maintain between passes at all.
    pub keep_filled: bool,
    /// Refill threshold as a fraction of the target.
    pub maintain_below_ratio: f32,
    /// Refill level as a fraction of the target.
    pub refill_to_ratio: f32,
    /// Minimum seconds between maintenance writes to one slot.
    pub min_set_energy_interval: f32,
}

impl From<&InstanceConfig> for EnergyPolicy {
    fn from(config: &InstanceConfig) -> Self {
        Self {
            keep_filled: config.keep_filled,
            maintain_below_ratio: config.maintain_below_ratio,
            refill_to_ratio: config.refill_to_ratio,
            min_set_energy_interval: config.min_set_energy_interval,
        }
    }
}

/// Inputs for one slot in one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyRequest {
    /// Energy the slot holds now.
    pub current: f32,
    /// Target energy, already clamped into `[0, max]`.
    pub target: f32,
    /// First apply or explicit reapply.
    pub forced: bool,
    /// A swap happened for this slot this cycle.
    pub mismatch_handled: bool,
    /// Time of the last write to this slot this spawn.
    pub last_write: Option<f32>,
    /// Current time in seconds.
    pub now: f32,
}

/// What the scheduler decided for one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnergyDecision {
    /// Nothing to do: not maintaining and nothing forced.
    Idle,
    /// Energy is where it should be.
    Satisfied,
    /// Set the slot's energy to this value.
    Write {
        /// Value to write.
        energy: f32,
    },
    /// A write was due but the per-slot cooldown has not elapsed.
    Cooldown,
}

impl EnergyPolicy {
    /// Decide whether and what to write for `request`.
    pub fn decide(&self, request: &EnergyRequest) -> EnergyDecision {
        let forced_path = request.forced || request.mismatch_handled;
        if !self.keep_filled && !forced_path {
            return EnergyDecision::Idle;
        }

        if forced_path {
            let differs = (request.current - request.target).abs() > ENERGY_EPSILON;
            return if differs || request.forced {
                EnergyDecision::Write {
                    energy: request.target,
                }
            } else {
                EnergyDecision::Satisfied
            };
        }

        let threshold = request.target * self.maintain_below_ratio;
        let requested = request.target * self.refill_to_ratio;
        let due = request.current <= threshold
            && (request.current - requested).abs() > ENERGY_EPSILON;
        if !due {
            return EnergyDecision::Satisfied;
        }

        if self.cooling_down(request) {
            return EnergyDecision::Cooldown;
        }
        EnergyDecision::Write { energy: requested }
    }

    fn cooling_down(&self, request: &EnergyRequest) -> bool {
        if self.min_set_energy_interval <= 0.0 {
            return false;
        }
        request
            .last_write
            .is_some_and(|last| request.now - last < self.min_set_energy_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: EnergyPolicy = EnergyPolicy {
        keep_filled: true,
        maintain_below_ratio: 0.98,
        refill_to_ratio: 1.0,
        min_set_energy_interval: 0.5,
    };

    fn request(current: f32, target: f32) -> EnergyRequest {
        EnergyRequest {
            current,
            target,
            forced: false,
            mismatch_handled: false,
            last_write: None,
            now: 10.0,
        }
    }

    #[test]
    fn maintenance_refills_below_threshold() {
        // threshold 9.8, 9.7 is below it
        let decision = POLICY.decide(&request(9.7, 10.0));
        assert_eq!(decision, EnergyDecision::Write { energy: 10.0 });
    }

    #[test]
    fn maintenance_ignores_small_dips() {
        assert_eq!(POLICY.decide(&request(9.9, 10.0)), EnergyDecision::Satisfied);
    }

    #[test]
    fn maintenance_respects_cooldown() {
        let mut req = request(5.0, 10.0);
        req.last_write = Some(9.8);
        assert_eq!(POLICY.decide(&req), EnergyDecision::Cooldown);
        req.last_write = Some(9.5);
        assert_eq!(POLICY.decide(&req), EnergyDecision::Write { energy: 10.0 });
    }

    #[test]
    fn zero_interval_disables_cooldown() {
        let policy = EnergyPolicy {
            min_set_energy_interval: 0.0,
            ..POLICY
        };
        let mut req = request(5.0, 10.0);
        req.last_write = Some(10.0);
        assert_eq!(policy.decide(&req), EnergyDecision::Write { energy: 10.0 });
    }

    #[test]
    fn forced_pass_writes_even_when_full() {
        let mut req = request(10.0, 10.0);
        req.forced = true;
        req.last_write = Some(10.0);
        assert_eq!(POLICY.decide(&req), EnergyDecision::Write { energy: 10.0 });
    }

    #[test]
    fn swap_writes_target_and_skips_cooldown() {
        let mut req = request(0.01, 8.0);
        req.mismatch_handled = true;
        req.last_write = Some(10.0);
        assert_eq!(POLICY.decide(&req), EnergyDecision::Write { energy: 8.0 });
    }

    #[test]
    fn swap_close_to_target_is_satisfied() {
        let mut req = request(7.995, 8.0);
        req.mismatch_handled = true;
        assert_eq!(POLICY.decide(&req), EnergyDecision::Satisfied);
    }

    #[test]
    fn not_keeping_filled_is_idle_between_forced_passes() {
        let policy = EnergyPolicy {
            keep_filled: false,
            ..POLICY
        };
        assert_eq!(policy.decide(&request(0.0, 10.0)), EnergyDecision::Idle);
    }

    #[test]
    fn refill_ratio_caps_request() {
        let policy = EnergyPolicy {
            maintain_below_ratio: 0.5,
            refill_to_ratio: 0.8,
            ..POLICY
        };
        assert_eq!(
            policy.decide(&request(4.0, 10.0)),
            EnergyDecision::Write { energy: 8.0 }
        );
    }
}
