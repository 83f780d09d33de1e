#![deny(missing_docs)]
//! # slotkeep: umbrella crate
//!
//! Keeps a bounded set of energy slots on live objects supplied with a
//! configured effect and energy level. Re-exports the protocol and the
//! implementation crates behind feature flags, plus a `prelude` for the
//! happy path:
//!
//! 1. Build an [`EngineContext`](slotkeep_engine::EngineContext) from
//!    [`EngineOptions`] and a [`DiagnosticsHub`](slotkeep_diagnostics::DiagnosticsHub).
//! 2. Attach one controller per object through a
//!    [`ControllerFleet`](slotkeep_engine::ControllerFleet).
//! 3. Every host tick call `fleet.tick(now)` and `supervisor.update(now, &mut fleet)`.

pub use slotkeep_protocol;

#[cfg(feature = "engine")]
pub use slotkeep_engine;

#[cfg(feature = "diagnostics")]
pub use slotkeep_diagnostics;

#[cfg(feature = "diagnostics")]
mod options;
#[cfg(feature = "diagnostics")]
mod supervisor;

#[cfg(feature = "diagnostics")]
pub use options::EngineOptions;
#[cfg(feature = "diagnostics")]
pub use supervisor::{Command, CommandQueue, Supervisor, SupervisorReport, UPDATE_INTERVAL};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Happy-path imports.
pub mod prelude {
    pub use slotkeep_protocol::{
        ActorId, Counter, Diagnostics, EffectCatalog, EffectConfig, EffectDescriptor, EffectId,
        HostObject, LifecycleEvent, LifecycleSource, ObjectRuntime, ObjectTypeId, SlotState,
    };

    #[cfg(feature = "engine")]
    pub use slotkeep_engine::{
        AssignmentMode, BehaviourController, ConflictPolicy, ControllerFleet, ControllerPhase,
        EngineContext, InstanceConfig, ModuleDefinition, RotationStore,
    };

    #[cfg(feature = "diagnostics")]
    pub use slotkeep_diagnostics::{DiagnosticsHub, LogLevel, init_tracing};

    #[cfg(feature = "diagnostics")]
    pub use crate::{Command, EngineOptions, Supervisor};
}
