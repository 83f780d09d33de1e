//! Conflict arbitration between the desired effect and what a slot holds.
//!
//! [`classify`] is pure: it only looks at ids, the policy and the pass
//! kind. [`swap`] performs the unload/enable/load sequence against the
//! object and reports whether an effect ended up active.

use crate::config::ConflictPolicy;
use slotkeep_protocol::{ActorId, EffectDescriptor, EffectId, ObjectRuntime, SlotError};

/// Energy a freshly loaded effect starts with before the scheduler tops
/// it up.
pub const SEED_ENERGY: f32 = 0.01;

/// Outcome of comparing a slot's current effect with the desired one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The slot already carries the desired effect.
    InSync,
    /// The slot should be swapped to the desired effect.
    Swap {
        /// True when the slot held an effect this engine wrote last,
        /// i.e. a re-sync rather than an overwrite of someone else's work.
        framework_owned: bool,
    },
    /// Someone else loaded the current effect; leave it.
    Conflict {
        /// Also skip energy writes for this slot this cycle.
        suppress_energy: bool,
    },
}

impl Verdict {
    /// Whether a swap will be attempted.
    pub fn swaps(&self) -> bool {
        matches!(self, Verdict::Swap { .. })
    }

    /// Whether the energy scheduler must stay silent for this slot.
    pub fn suppresses_energy(&self) -> bool {
        matches!(
            self,
            Verdict::Conflict {
                suppress_energy: true
            }
        )
    }
}

/// Decide what to do with a slot.
///
/// `current` is the slot's active effect (`None` when empty), `desired`
/// the catalog id the resolver picked, `last_written` the id this engine
/// last loaded into the slot. Ownership is inferred from id equality
/// alone, so an external writer that loads the same id the engine last
/// wrote is treated as the engine.
pub fn classify(
    current: Option<&EffectId>,
    desired: &EffectId,
    policy: ConflictPolicy,
    forced: bool,
    last_written: Option<&EffectId>,
) -> Verdict {
    let Some(current) = current else {
        return Verdict::Swap {
            framework_owned: false,
        };
    };
    if current.matches(desired.as_str()) {
        return Verdict::InSync;
    }

    let framework_owned = last_written.is_some_and(|last| last.matches(current.as_str()));
    if forced || policy == ConflictPolicy::ForceConfigured || framework_owned {
        return Verdict::Swap { framework_owned };
    }

    Verdict::Conflict {
        suppress_energy: policy == ConflictPolicy::RespectExternalNoEnergyWrite,
    }
}

/// Replace whatever `slot` holds with `effect`.
///
/// Unloads the current effect, re-enables the slot and loads `effect`
/// with [`SEED_ENERGY`] credited to `actor`. Returns the id the slot
/// reports afterwards.
pub fn swap<O: ObjectRuntime + ?Sized>(
    object: &mut O,
    slot: usize,
    effect: &EffectDescriptor,
    actor: Option<&ActorId>,
) -> Result<EffectId, SlotError> {
    object.unload_effect(slot);
    object.set_enabled(slot, true);
    object.load_effect(slot, effect, SEED_ENERGY, actor);

    let state = object.slot(slot).ok_or(SlotError::SlotMissing(slot))?;
    state
        .current_effect()
        .cloned()
        .ok_or_else(|| SlotError::LoadFailed {
            slot,
            effect: effect.id.clone(),
        })
}
