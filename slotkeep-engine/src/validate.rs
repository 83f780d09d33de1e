//! Attach-time checks of a module definition.
//!
//! Findings are warnings, never errors: the definition is still ingested
//! and clamped afterwards. Each warning is keyed by object type and
//! finding so that a type spawned a hundred times warns once.

use crate::config::{AssignmentMode, ModuleDefinition, SUPPORTED_SCHEMA_VERSION};
use slotkeep_protocol::{EffectCatalog, ObjectTypeId, SlotState};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Deduplication key, `<type>:<finding>[:<detail>]`.
    pub key: String,
    /// Human-readable message.
    pub message: String,
}

impl ConfigWarning {
    fn new(type_id: &ObjectTypeId, finding: impl fmt::Display, message: String) -> Self {
        Self {
            key: format!("{type_id}:{finding}"),
            message,
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Keys of warnings already logged.
#[derive(Debug, Default)]
pub struct WarningLedger {
    seen: Mutex<HashSet<String>>,
}

impl WarningLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `warning` unless its key was logged before. Returns whether it
    /// was logged.
    pub fn warn_once(&self, warning: &ConfigWarning) -> bool {
        let fresh = self
            .seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(warning.key.clone());
        if fresh {
            warn!(event = "slotkeep.config.warning", key = %warning.key, "{}", warning.message);
        }
        fresh
    }

    /// Number of distinct warnings logged.
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True when nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Check `definition` for an object of `type_id` currently exposing
/// `slots`.
pub fn validate(
    type_id: &ObjectTypeId,
    definition: &ModuleDefinition,
    catalog: &dyn EffectCatalog,
    slots: &[SlotState],
) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    let effects = &definition.effects;
    if effects.is_empty() {
        warnings.push(ConfigWarning::new(
            type_id,
            "effects-empty",
            format!("object type '{type_id}' has a module definition but no effects configured"),
        ));
        return warnings;
    }

    if definition.schema_version != SUPPORTED_SCHEMA_VERSION {
        warnings.push(ConfigWarning::new(
            type_id,
            "schema-version",
            format!(
                "object type '{type_id}' uses schema_version={}; supported version is {SUPPORTED_SCHEMA_VERSION}",
                definition.schema_version
            ),
        ));
    }

    let mut valid_entries = 0;
    for (index, config) in effects.iter().enumerate() {
        if config.effect_id.is_blank() {
            warnings.push(ConfigWarning::new(
                type_id,
                format_args!("effect-empty:{index}"),
                format!("object type '{type_id}' effect config at index {index} has no effect id"),
            ));
            continue;
        }
        valid_entries += 1;
        if catalog.lookup(config.effect_id.as_str()).is_none() {
            warnings.push(ConfigWarning::new(
                type_id,
                format_args!("effect-missing:{}", config.effect_id),
                format!(
                    "object type '{type_id}' references missing effect '{}'",
                    config.effect_id
                ),
            ));
        }
    }
    if valid_entries == 0 {
        warnings.push(ConfigWarning::new(
            type_id,
            "effects-invalid",
            format!("object type '{type_id}' has no valid effect entries"),
        ));
    }

    if effects.len() < 2 {
        let few = match definition.assignment {
            AssignmentMode::RandomPerSpawn => Some((
                "mode-random-few",
                "random_per_spawn with fewer than 2 effects behaves like static assignment",
            )),
            AssignmentMode::RoundRobinPerSpawn => Some((
                "mode-roundrobin-few",
                "round_robin_per_spawn with fewer than 2 effects behaves like static assignment",
            )),
            AssignmentMode::ConditionalHandVelocity => Some((
                "mode-conditional-few",
                "conditional_hand_velocity with fewer than 2 effects; configure held/fast/slow effects at indices 0/1/2",
            )),
            _ => None,
        };
        if let Some((finding, detail)) = few {
            warnings.push(ConfigWarning::new(
                type_id,
                finding,
                format!("object type '{type_id}' uses {detail}"),
            ));
        }
    }

    let maintain = definition.maintain_below_ratio;
    let refill = definition.refill_to_ratio;
    if !(0.0..=1.0).contains(&maintain) {
        warnings.push(ConfigWarning::new(
            type_id,
            "maintain_below_ratio-range",
            format!("object type '{type_id}' maintain_below_ratio={maintain:.3} is outside 0..1"),
        ));
    }
    if !(0.0..=1.0).contains(&refill) {
        warnings.push(ConfigWarning::new(
            type_id,
            "refill_to_ratio-range",
            format!("object type '{type_id}' refill_to_ratio={refill:.3} is outside 0..1"),
        ));
    }
    if refill < maintain {
        warnings.push(ConfigWarning::new(
            type_id,
            "refill-below-maintain",
            format!(
                "object type '{type_id}' refill_to_ratio={refill:.3} is below maintain_below_ratio={maintain:.3}"
            ),
        ));
    }

    let non_negative = [
        ("min_set_energy_interval", definition.min_set_energy_interval),
        (
            "conditional_velocity_threshold",
            definition.conditional_velocity_threshold,
        ),
        (
            "conditional_velocity_hysteresis",
            definition.conditional_velocity_hysteresis,
        ),
        (
            "conditional_min_switch_interval",
            definition.conditional_min_switch_interval,
        ),
    ];
    for (field, value) in non_negative {
        if value < 0.0 {
            warnings.push(ConfigWarning::new(
                type_id,
                format_args!("{field}-negative"),
                format!("object type '{type_id}' {field}={value:.3} must be >= 0"),
            ));
        }
    }

    if slots.is_empty() {
        warnings.push(ConfigWarning::new(
            type_id,
            "slots-missing",
            format!("object type '{type_id}' has no slots detected at attach"),
        ));
    } else if !slots.iter().any(|slot| slot.accepts_effects) {
        warnings.push(ConfigWarning::new(
            type_id,
            "slots-invalid",
            format!("object type '{type_id}' has slots, but none accept effects"),
        ));
    }

    warnings
}
