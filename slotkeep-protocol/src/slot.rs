//! Read-only snapshot of an energy slot.

use crate::id::EffectId;
use serde::{Deserialize, Serialize};

/// Snapshot of one slot as the host reports it.
///
/// The host owns the slot; the engine only reads snapshots and writes
/// back through [`crate::ObjectRuntime`]. Hosts keep
/// `0 <= energy <= max_energy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotState {
    /// Host-side name of the slot (for logs and dumps).
    pub name: String,
    /// Effect currently loaded, if any.
    pub effect: Option<EffectId>,
    /// Current energy.
    pub energy: f32,
    /// Maximum energy the slot holds.
    pub max_energy: f32,
    /// Whether the slot currently allows an effect to be loaded.
    pub enabled: bool,
    /// Whether the slot can carry effects at all. Slots that never
    /// accept effects are skipped by maintenance.
    pub accepts_effects: bool,
}

impl SlotState {
    /// An enabled, effect-accepting slot with nothing loaded.
    pub fn empty(name: impl Into<String>, max_energy: f32) -> Self {
        Self {
            name: name.into(),
            effect: None,
            energy: 0.0,
            max_energy,
            enabled: true,
            accepts_effects: true,
        }
    }

    /// Id of the loaded effect, treating an empty id as nothing loaded.
    pub fn current_effect(&self) -> Option<&EffectId> {
        self.effect.as_ref().filter(|id| !id.is_blank())
    }
}
