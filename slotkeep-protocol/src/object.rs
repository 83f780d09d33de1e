//! The Object Runtime collaborator: the live object whose slots are kept.

use crate::effect::EffectDescriptor;
use crate::id::{ActorId, ObjectTypeId};
use crate::lifecycle::LifecycleSource;
use crate::slot::SlotState;

/// A live object instance as seen by the engine.
///
/// All reads are synchronous and cheap; the engine calls them several
/// times per maintenance pass. Writes address slots by their index in
/// the ordered slot list. Writes to an index that no longer exists are
/// ignored by implementations.
pub trait ObjectRuntime {
    /// Identity of the object's type; every spawn of the same type shares it.
    fn type_id(&self) -> ObjectTypeId;

    /// Number of slots currently exposed. Zero while the host is still
    /// materialising the object.
    fn slot_count(&self) -> usize;

    /// Snapshot of the slot at `index`, or `None` if it does not exist.
    fn slot(&self, index: usize) -> Option<SlotState>;

    /// The actor currently holding the object, if any.
    fn holder(&self) -> Option<ActorId>;

    /// Actor credited with loads when nobody holds the object.
    fn fallback_actor(&self) -> Option<ActorId> {
        None
    }

    /// Magnitude of the object's velocity.
    fn speed(&self) -> f32;

    /// Disable the slot and unload whatever effect it carries.
    fn unload_effect(&mut self, index: usize);

    /// Allow or forbid loading effects into the slot.
    fn set_enabled(&mut self, index: usize, enabled: bool);

    /// Load `effect` into the slot with `seed_energy`, credited to `actor`.
    ///
    /// The host may refuse; callers check the slot snapshot afterwards.
    fn load_effect(
        &mut self,
        index: usize,
        effect: &EffectDescriptor,
        seed_energy: f32,
        actor: Option<&ActorId>,
    );

    /// Set the slot's energy immediately.
    fn set_energy(&mut self, index: usize, energy: f32);
}

/// An object that is both a runtime and its own lifecycle event source.
/// Blanket-implemented; controllers are generic over this.
pub trait HostObject: ObjectRuntime + LifecycleSource {}

impl<T: ObjectRuntime + LifecycleSource> HostObject for T {}
