//! Effect configuration and catalog descriptors.

use crate::id::EffectId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A desired effect and its energy target for one slot.
///
/// `level` is a fraction of the slot's maximum energy (intended `0..=1`,
/// clamped only when the target is computed). `energy`, when
/// non-negative, is an absolute target that takes precedence over
/// `level`; the default `-1` means "derive from level".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EffectConfig {
    /// Catalog id of the effect to keep loaded.
    pub effect_id: EffectId,
    /// Target energy as a fraction of the slot's maximum.
    #[serde(default = "default_level")]
    pub level: f32,
    /// Absolute target energy; negative derives the target from `level`.
    #[serde(default = "default_energy")]
    pub energy: f32,
}

fn default_level() -> f32 {
    1.0
}

fn default_energy() -> f32 {
    -1.0
}

impl EffectConfig {
    /// Create a config that targets `level` of the slot's maximum energy.
    pub fn new(effect_id: impl Into<EffectId>, level: f32) -> Self {
        Self {
            effect_id: effect_id.into(),
            level,
            energy: default_energy(),
        }
    }

    /// Create a config with an absolute energy target.
    pub fn with_energy(effect_id: impl Into<EffectId>, energy: f32) -> Self {
        Self {
            effect_id: effect_id.into(),
            level: default_level(),
            energy,
        }
    }

    /// Energy this config asks for on a slot holding at most `max_energy`.
    ///
    /// Always within `[0, max_energy]`.
    pub fn target_energy(&self, max_energy: f32) -> f32 {
        let max_energy = max_energy.max(0.0);
        let target = if self.energy >= 0.0 {
            self.energy
        } else {
            max_energy * self.level.clamp(0.0, 1.0)
        };
        target.clamp(0.0, max_energy)
    }
}

/// What the catalog knows about an effect. The engine only needs the
/// canonical id; hosts may carry more behind their own lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    /// Canonical id as spelled by the catalog.
    pub id: EffectId,
}

impl EffectDescriptor {
    /// Create a descriptor for `id`.
    pub fn new(id: impl Into<EffectId>) -> Self {
        Self { id: id.into() }
    }
}
