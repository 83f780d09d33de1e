//! # slotkeep-protocol: collaborator traits for the slotkeep engine
//!
//! The maintenance engine never owns the objects it keeps supplied. It
//! talks to the host through a small set of collaborator boundaries,
//! defined here so that hosts and tests can implement them independently
//! of the engine.
//!
//! ## The Collaborators
//!
//! | Collaborator | Trait | What it provides |
//! |--------------|-------|------------------|
//! | ① Object Runtime | [`ObjectRuntime`] | Slot list, holder, speed, slot writes |
//! | ② Lifecycle | [`LifecycleSource`] | Spawn/despawn notifications |
//! | ③ Catalog | [`EffectCatalog`] | Effect lookup by id |
//! | ④ Diagnostics | [`Diagnostics`] | Counters + log throttle gate |
//!
//! ## Time
//!
//! The engine is driven by the host's per-tick update. Every operation
//! that needs a clock receives `now` as seconds (`f32`) from the caller,
//! on a monotonic, unscaled timeline chosen by the host.

#![deny(missing_docs)]

pub mod catalog;
pub mod diagnostics;
pub mod effect;
pub mod error;
pub mod id;
pub mod lifecycle;
pub mod object;
pub mod slot;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use catalog::EffectCatalog;
pub use diagnostics::{Counter, Diagnostics, FORCED_LOG_TARGET};
pub use effect::{EffectConfig, EffectDescriptor};
pub use error::{ConfigError, SlotError};
pub use id::{ActorId, EffectId, ObjectTypeId, SubscriptionId};
pub use lifecycle::{EventPhase, LifecycleEvent, LifecycleKind, LifecycleSource};
pub use object::{HostObject, ObjectRuntime};
pub use slot::SlotState;
