//! Static module definitions and their ingestion into instance configs.
//!
//! A [`ModuleDefinition`] is what an object type carries in its data
//! files: loosely typed, possibly out of range. [`InstanceConfig::ingest`]
//! validates and clamps it once at attach time; nothing downstream
//! re-checks ranges per tick.

use crate::resolver::{AssignmentStrategy, VelocityGate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use slotkeep_protocol::{ConfigError, EffectConfig};
use std::fmt;

/// Floor for the maintenance interval, in seconds.
pub const MIN_UPDATE_INTERVAL: f32 = 0.05;

/// The only schema version this engine understands.
pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

/// Assignment mode as written in a definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMode {
    /// See [`AssignmentStrategy::ByIndex`].
    #[default]
    ByIndex,
    /// See [`AssignmentStrategy::Cycle`].
    Cycle,
    /// See [`AssignmentStrategy::FirstOnly`].
    FirstOnly,
    /// See [`AssignmentStrategy::RandomPerSpawn`].
    RandomPerSpawn,
    /// See [`AssignmentStrategy::RoundRobinPerSpawn`].
    RoundRobinPerSpawn,
    /// See [`AssignmentStrategy::ConditionalHandVelocity`].
    ConditionalHandVelocity,
}

/// What to do when a slot carries an effect this engine did not load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Always swap to the configured effect.
    #[default]
    ForceConfigured,
    /// Leave external effects in place; keep topping up their energy.
    RespectExternal,
    /// Leave external effects in place and do not touch their energy.
    RespectExternalNoEnergyWrite,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConflictPolicy::ForceConfigured => "force_configured",
            ConflictPolicy::RespectExternal => "respect_external",
            ConflictPolicy::RespectExternalNoEnergyWrite => "respect_external_no_energy_write",
        };
        f.write_str(name)
    }
}

/// The static definition an object type carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ModuleDefinition {
    /// Ordered effect configs.
    pub effects: Vec<EffectConfig>,
    /// How slots map onto `effects`.
    pub assignment: AssignmentMode,
    /// How externally loaded effects are treated.
    pub conflict_policy: ConflictPolicy,
    /// Wait for a spawn event before the first apply.
    pub apply_on_spawn: bool,
    /// Keep maintaining after the first apply.
    pub keep_filled: bool,
    /// Seconds between maintenance passes.
    pub update_interval: f32,
    /// Definition format version.
    pub schema_version: u32,
    /// Refill once energy drops to this fraction of the target.
    pub maintain_below_ratio: f32,
    /// Refill up to this fraction of the target.
    pub refill_to_ratio: f32,
    /// Minimum seconds between two maintenance writes to one slot.
    pub min_set_energy_interval: f32,
    /// Speed separating fast from slow for the conditional mode.
    pub conditional_velocity_threshold: f32,
    /// Dead band around the threshold.
    pub conditional_velocity_hysteresis: f32,
    /// Minimum seconds between fast/slow switches.
    pub conditional_min_switch_interval: f32,
    /// Escalate this instance's verbose logs.
    pub debug_logging: bool,
}

impl Default for ModuleDefinition {
    fn default() -> Self {
        Self {
            effects: Vec::new(),
            assignment: AssignmentMode::ByIndex,
            conflict_policy: ConflictPolicy::ForceConfigured,
            apply_on_spawn: true,
            keep_filled: true,
            update_interval: 0.2,
            schema_version: SUPPORTED_SCHEMA_VERSION,
            maintain_below_ratio: 0.98,
            refill_to_ratio: 1.0,
            min_set_energy_interval: 0.5,
            conditional_velocity_threshold: 6.0,
            conditional_velocity_hysteresis: 1.0,
            conditional_min_switch_interval: 0.25,
            debug_logging: false,
        }
    }
}

impl ModuleDefinition {
    /// Parse a definition from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// JSON schema describing the definition format.
    pub fn json_schema() -> Result<serde_json::Value, ConfigError> {
        serde_json::to_value(schemars::schema_for!(ModuleDefinition))
            .map_err(|e| ConfigError::Other(Box::new(e)))
    }
}

/// Immutable per-instance configuration, clamped at ingestion.
///
/// Invariants: `update_interval >= 0.05`;
/// `0 <= maintain_below_ratio <= refill_to_ratio <= 1`;
/// `min_set_energy_interval >= 0`; velocity gate fields `>= 0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceConfig {
    /// Ordered effect configs.
    pub effects: Vec<EffectConfig>,
    /// Assignment strategy with its parameters.
    pub strategy: AssignmentStrategy,
    /// Conflict policy.
    pub conflict_policy: ConflictPolicy,
    /// Wait for a spawn event before the first apply.
    pub apply_on_spawn: bool,
    /// Keep maintaining after the first apply.
    pub keep_filled: bool,
    /// Seconds between maintenance passes.
    pub update_interval: f32,
    /// Refill threshold as a fraction of the target.
    pub maintain_below_ratio: f32,
    /// Refill level as a fraction of the target.
    pub refill_to_ratio: f32,
    /// Per-slot write cooldown for maintenance writes.
    pub min_set_energy_interval: f32,
    /// Conditional-mode thresholds. Kept even when another strategy is
    /// active so dumps show what was configured.
    pub velocity_gate: VelocityGate,
    /// Escalate this instance's verbose logs.
    pub debug_logging: bool,
}

fn non_negative(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

fn unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

impl InstanceConfig {
    /// Clamp `definition` into a usable configuration.
    pub fn ingest(definition: &ModuleDefinition) -> Self {
        let maintain_below_ratio = unit(definition.maintain_below_ratio);
        let refill_to_ratio = if definition.refill_to_ratio.is_nan() {
            1.0
        } else {
            definition.refill_to_ratio.clamp(maintain_below_ratio, 1.0)
        };
        let update_interval = if definition.update_interval.is_nan() {
            MIN_UPDATE_INTERVAL
        } else {
            definition.update_interval.max(MIN_UPDATE_INTERVAL)
        };
        let velocity_gate = VelocityGate {
            threshold: non_negative(definition.conditional_velocity_threshold),
            hysteresis: non_negative(definition.conditional_velocity_hysteresis),
            min_switch_interval: non_negative(definition.conditional_min_switch_interval),
        };
        let strategy = match definition.assignment {
            AssignmentMode::ByIndex => AssignmentStrategy::ByIndex,
            AssignmentMode::Cycle => AssignmentStrategy::Cycle,
            AssignmentMode::FirstOnly => AssignmentStrategy::FirstOnly,
            AssignmentMode::RandomPerSpawn => AssignmentStrategy::RandomPerSpawn,
            AssignmentMode::RoundRobinPerSpawn => AssignmentStrategy::RoundRobinPerSpawn,
            AssignmentMode::ConditionalHandVelocity => {
                AssignmentStrategy::ConditionalHandVelocity(velocity_gate)
            }
        };

        Self {
            effects: definition.effects.clone(),
            strategy,
            conflict_policy: definition.conflict_policy,
            apply_on_spawn: definition.apply_on_spawn,
            keep_filled: definition.keep_filled,
            update_interval,
            maintain_below_ratio,
            refill_to_ratio,
            min_set_energy_interval: non_negative(definition.min_set_energy_interval),
            velocity_gate,
            debug_logging: definition.debug_logging,
        }
    }
}

impl fmt::Display for InstanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "applyOnSpawn={} keepFilled={} assignment={} conflictPolicy={} interval={:.2}s \
             maintainBelow={:.2} refillTo={:.2} minSetInterval={:.2}s velocityThreshold={:.2} \
             hysteresis={:.2} minStateSwitch={:.2}s",
            self.apply_on_spawn,
            self.keep_filled,
            self.strategy.name(),
            self.conflict_policy,
            self.update_interval,
            self.maintain_below_ratio,
            self.refill_to_ratio,
            self.min_set_energy_interval,
            self.velocity_gate.threshold,
            self.velocity_gate.hysteresis,
            self.velocity_gate.min_switch_interval,
        )
    }
}
