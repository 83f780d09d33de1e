#![deny(missing_docs)]
//! The slotkeep maintenance engine.
//!
//! One [`BehaviourController`] is attached per live object. Once per
//! maintenance tick it walks the object's slots and, for each slot,
//! runs three decisions in order:
//!
//! 1. [`AssignmentStrategy::resolve`] picks the desired effect config.
//! 2. [`arbiter::classify`] decides whether to swap, leave an external
//!    effect alone, or also suppress energy writes.
//! 3. [`EnergyPolicy::decide`] decides whether and what to write to the
//!    slot's energy, honouring ratios and the per-slot cooldown.
//!
//! Counters and throttled logs are side outputs through the
//! [`slotkeep_protocol::Diagnostics`] collaborator; they never feed back
//! into decisions.

/// Emit at `INFO` on the forced target when the instance asked for debug
/// logging, else at `DEBUG`.
macro_rules! verbose {
    ($escalate:expr, $($arg:tt)+) => {
        if $escalate {
            tracing::info!(target: slotkeep_protocol::FORCED_LOG_TARGET, $($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

pub mod arbiter;
pub mod config;
pub mod context;
pub mod controller;
pub mod effect_cache;
pub mod energy;
pub mod fleet;
pub mod resolver;
pub mod rotation;
pub mod state;
pub mod validate;

pub use arbiter::Verdict;
pub use config::{AssignmentMode, ConflictPolicy, InstanceConfig, ModuleDefinition};
pub use context::{EngineContext, EngineSwitch};
pub use controller::{BehaviourController, ControllerPhase, PassReport};
pub use energy::{EnergyDecision, EnergyPolicy, EnergyRequest};
pub use fleet::{ControllerFleet, StateDump};
pub use resolver::{AssignmentStrategy, ConditionalState, ResolveContext, VelocityGate};
pub use rotation::RotationStore;
pub use validate::{ConfigWarning, WarningLedger};
