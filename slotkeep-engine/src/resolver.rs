//! Assignment resolution: which effect config a slot should carry.
//!
//! Resolution is a pure function of the slot index, the strategy and
//! the per-spawn [`ResolverState`]; the only impure inputs are the
//! random source for [`AssignmentStrategy::RandomPerSpawn`] and the
//! holder/speed/time snapshot in [`ResolveContext`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Velocity thresholds for [`AssignmentStrategy::ConditionalHandVelocity`].
///
/// All fields are non-negative after ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityGate {
    /// Centre speed separating fast from slow.
    pub threshold: f32,
    /// Half-width of the dead band around `threshold`.
    pub hysteresis: f32,
    /// Minimum seconds between two non-held state switches.
    pub min_switch_interval: f32,
}

impl VelocityGate {
    /// Speed at or above which a non-fast object becomes fast.
    pub fn enter_fast(&self) -> f32 {
        self.threshold + self.hysteresis
    }

    /// Speed below which a fast object becomes slow.
    pub fn exit_fast(&self) -> f32 {
        (self.threshold - self.hysteresis).max(0.0)
    }
}

/// How slots map onto the configured effect list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AssignmentStrategy {
    /// Slot `i` gets config `i`; slots past the end reuse the last config.
    ByIndex,
    /// Slot `i` gets config `i mod n`.
    Cycle,
    /// Only slot 0 is maintained.
    FirstOnly,
    /// Each slot draws a config once per spawn and keeps it.
    RandomPerSpawn,
    /// Slots rotate through configs from an offset shared by every spawn
    /// of the object type; the offset advances once per spawn.
    RoundRobinPerSpawn,
    /// Held, fast and slow objects get configs 0, 1 and 2 respectively.
    ConditionalHandVelocity(VelocityGate),
}

impl AssignmentStrategy {
    /// Short, stable name for logs and dumps.
    pub fn name(&self) -> &'static str {
        match self {
            AssignmentStrategy::ByIndex => "by_index",
            AssignmentStrategy::Cycle => "cycle",
            AssignmentStrategy::FirstOnly => "first_only",
            AssignmentStrategy::RandomPerSpawn => "random_per_spawn",
            AssignmentStrategy::RoundRobinPerSpawn => "round_robin_per_spawn",
            AssignmentStrategy::ConditionalHandVelocity(_) => "conditional_hand_velocity",
        }
    }

    /// Index into the config list for `slot`, or `None` when the slot
    /// should be left alone. `count` is the number of configs.
    pub fn resolve<R: Rng>(
        &self,
        slot: usize,
        count: usize,
        state: &mut ResolverState,
        ctx: &ResolveContext,
        rng: &mut R,
    ) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let index = match self {
            AssignmentStrategy::ByIndex => slot.min(count - 1),
            AssignmentStrategy::Cycle => slot % count,
            AssignmentStrategy::FirstOnly => {
                if slot != 0 {
                    return None;
                }
                0
            }
            AssignmentStrategy::RandomPerSpawn => *state
                .random_picks
                .entry(slot)
                .or_insert_with(|| rng.gen_range(0..count)),
            AssignmentStrategy::RoundRobinPerSpawn => {
                (state.round_robin_start + slot) % count
            }
            AssignmentStrategy::ConditionalHandVelocity(gate) => {
                let committed = state.conditional.update(gate, ctx);
                committed.config_index(count)
            }
        };
        Some(index)
    }
}

/// Snapshot of the inputs the conditional strategy reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveContext {
    /// Current time in seconds.
    pub now: f32,
    /// Whether an actor currently holds the object.
    pub held: bool,
    /// Object speed.
    pub speed: f32,
}

/// Committed state of the conditional strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalState {
    /// Nothing committed yet this spawn.
    Unset,
    /// Held by an actor.
    Held,
    /// Moving at or above the fast threshold.
    Fast,
    /// Moving below it.
    Slow,
}

impl ConditionalState {
    /// Numeric code: -1, 0, 1, 2.
    pub fn code(self) -> i8 {
        match self {
            ConditionalState::Unset => -1,
            ConditionalState::Held => 0,
            ConditionalState::Fast => 1,
            ConditionalState::Slow => 2,
        }
    }

    /// Config index for this state, clamped to `[0, count - 1]`.
    pub fn config_index(self, count: usize) -> usize {
        let index = match self {
            ConditionalState::Fast if count >= 2 => 1,
            ConditionalState::Slow if count >= 3 => 2,
            _ => 0,
        };
        index.min(count.saturating_sub(1))
    }
}

/// Conditional state with its switch timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionalTracker {
    state: ConditionalState,
    last_switch: f32,
}

impl Default for ConditionalTracker {
    fn default() -> Self {
        Self {
            state: ConditionalState::Unset,
            last_switch: 0.0,
        }
    }
}

impl ConditionalTracker {
    /// Committed state.
    pub fn state(&self) -> ConditionalState {
        self.state
    }

    /// Time of the last committed switch.
    pub fn last_switch(&self) -> f32 {
        self.last_switch
    }

    /// Back to `Unset`, with the switch clock started at `now`.
    pub fn reset(&mut self, now: f32) {
        self.state = ConditionalState::Unset;
        self.last_switch = now;
    }

    /// Compute the desired state for `ctx` and commit it if allowed.
    ///
    /// Held and the first decision commit immediately. Fast/slow flips
    /// commit only once `min_switch_interval` has passed since the last
    /// committed switch.
    pub fn update(&mut self, gate: &VelocityGate, ctx: &ResolveContext) -> ConditionalState {
        let desired = if ctx.held {
            ConditionalState::Held
        } else if self.state == ConditionalState::Fast {
            if ctx.speed >= gate.exit_fast() {
                ConditionalState::Fast
            } else {
                ConditionalState::Slow
            }
        } else if ctx.speed >= gate.enter_fast() {
            ConditionalState::Fast
        } else {
            ConditionalState::Slow
        };

        let immediate =
            self.state == ConditionalState::Unset || desired == ConditionalState::Held;
        let elapsed = ctx.now - self.last_switch;
        if immediate || (desired != self.state && elapsed >= gate.min_switch_interval) {
            self.state = desired;
            self.last_switch = ctx.now;
        }
        self.state
    }
}

/// Per-spawn resolver memory.
#[derive(Debug, Clone, Default)]
pub struct ResolverState {
    random_picks: HashMap<usize, usize>,
    round_robin_start: usize,
    conditional: ConditionalTracker,
}

impl ResolverState {
    /// Reset for a new spawn with the given round-robin offset.
    pub fn prepare(&mut self, round_robin_start: usize, now: f32) {
        self.random_picks.clear();
        self.round_robin_start = round_robin_start;
        self.conditional.reset(now);
    }

    /// Drop everything; used at despawn.
    pub fn clear(&mut self) {
        self.random_picks.clear();
        self.round_robin_start = 0;
        self.conditional = ConditionalTracker::default();
    }

    /// Offset assigned to this spawn by the rotation store.
    pub fn round_robin_start(&self) -> usize {
        self.round_robin_start
    }

    /// Cached random pick for `slot`, if one was drawn.
    pub fn random_pick(&self, slot: usize) -> Option<usize> {
        self.random_picks.get(&slot).copied()
    }

    /// Conditional strategy state.
    pub fn conditional(&self) -> &ConditionalTracker {
        &self.conditional
    }
}
