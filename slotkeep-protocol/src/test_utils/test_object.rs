//! TestObject: a shared-handle object runtime with a lifecycle queue.

use crate::effect::EffectDescriptor;
use crate::id::{ActorId, EffectId, ObjectTypeId, SubscriptionId};
use crate::lifecycle::{LifecycleEvent, LifecycleSource};
use crate::object::ObjectRuntime;
use crate::slot::SlotState;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// A write the engine performed, recorded for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotWrite {
    /// `unload_effect(slot)`.
    Unload {
        /// Slot index.
        slot: usize,
    },
    /// `set_enabled(slot, enabled)`.
    Enable {
        /// Slot index.
        slot: usize,
        /// New flag.
        enabled: bool,
    },
    /// `load_effect(slot, effect, seed, actor)`.
    Load {
        /// Slot index.
        slot: usize,
        /// Requested effect.
        effect: EffectId,
        /// Seed energy.
        seed: f32,
        /// Credited actor.
        actor: Option<ActorId>,
    },
    /// `set_energy(slot, energy)`.
    Energy {
        /// Slot index.
        slot: usize,
        /// Energy written.
        energy: f32,
    },
}

#[derive(Debug)]
struct Inner {
    type_id: ObjectTypeId,
    slots: Vec<SlotState>,
    holder: Option<ActorId>,
    fallback: Option<ActorId>,
    speed: f32,
    refused: HashSet<String>,
    subscriptions: HashMap<SubscriptionId, Vec<LifecycleEvent>>,
    next_subscription: u64,
    writes: Vec<SlotWrite>,
}

/// In-memory object. Clones share the same underlying state, so a test
/// can hand one clone to a controller and keep another for inspection.
#[derive(Debug, Clone)]
pub struct TestObject {
    inner: Arc<Mutex<Inner>>,
}

impl TestObject {
    /// An object of type `type_id` with no slots yet.
    pub fn new(type_id: impl Into<ObjectTypeId>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                type_id: type_id.into(),
                slots: Vec::new(),
                holder: None,
                fallback: None,
                speed: 0.0,
                refused: HashSet::new(),
                subscriptions: HashMap::new(),
                next_subscription: 1,
                writes: Vec::new(),
            })),
        }
    }

    /// Builder: add `count` empty slots with `max_energy` each.
    pub fn with_slots(self, count: usize, max_energy: f32) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            for i in 0..count {
                inner
                    .slots
                    .push(SlotState::empty(format!("slot{i}"), max_energy));
            }
        }
        self
    }

    /// Append a slot.
    pub fn push_slot(&self, slot: SlotState) {
        self.inner.lock().unwrap().slots.push(slot);
    }

    /// Remove every slot.
    pub fn clear_slots(&self) {
        self.inner.lock().unwrap().slots.clear();
    }

    /// Snapshot of slot `index`. Panics if it does not exist.
    pub fn slot_state(&self, index: usize) -> SlotState {
        self.inner.lock().unwrap().slots[index].clone()
    }

    /// Set a slot's effect and energy as an external actor would.
    pub fn set_external(&self, index: usize, effect: Option<&str>, energy: f32) {
        let mut inner = self.inner.lock().unwrap();
        let slot = &mut inner.slots[index];
        slot.effect = effect.map(EffectId::from);
        slot.energy = energy.clamp(0.0, slot.max_energy);
    }

    /// Drain a slot's energy to `energy`.
    pub fn set_slot_energy(&self, index: usize, energy: f32) {
        let mut inner = self.inner.lock().unwrap();
        let slot = &mut inner.slots[index];
        slot.energy = energy.clamp(0.0, slot.max_energy);
    }

    /// Mark a slot as unable to carry effects.
    pub fn set_accepts_effects(&self, index: usize, accepts: bool) {
        self.inner.lock().unwrap().slots[index].accepts_effects = accepts;
    }

    /// Make loads of `effect` fail silently, as a host rejecting it would.
    pub fn refuse_loads_of(&self, effect: &str) {
        self.inner
            .lock()
            .unwrap()
            .refused
            .insert(effect.to_ascii_lowercase());
    }

    /// Set or clear the holder.
    pub fn set_holder(&self, holder: Option<&str>) {
        self.inner.lock().unwrap().holder = holder.map(ActorId::from);
    }

    /// Set the fallback actor.
    pub fn set_fallback_actor(&self, actor: Option<&str>) {
        self.inner.lock().unwrap().fallback = actor.map(ActorId::from);
    }

    /// Set the velocity magnitude.
    pub fn set_speed(&self, speed: f32) {
        self.inner.lock().unwrap().speed = speed;
    }

    /// Queue `event` for every live subscription.
    pub fn emit(&self, event: LifecycleEvent) {
        let mut inner = self.inner.lock().unwrap();
        for queue in inner.subscriptions.values_mut() {
            queue.push(event);
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap().subscriptions.len()
    }

    /// Every write recorded so far.
    pub fn writes(&self) -> Vec<SlotWrite> {
        self.inner.lock().unwrap().writes.clone()
    }

    /// Energy writes only, as `(slot, energy)`.
    pub fn energy_writes(&self) -> Vec<(usize, f32)> {
        self.writes()
            .into_iter()
            .filter_map(|w| match w {
                SlotWrite::Energy { slot, energy } => Some((slot, energy)),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded writes.
    pub fn clear_writes(&self) {
        self.inner.lock().unwrap().writes.clear();
    }
}

impl ObjectRuntime for TestObject {
    fn type_id(&self) -> ObjectTypeId {
        self.inner.lock().unwrap().type_id.clone()
    }

    fn slot_count(&self) -> usize {
        self.inner.lock().unwrap().slots.len()
    }

    fn slot(&self, index: usize) -> Option<SlotState> {
        self.inner.lock().unwrap().slots.get(index).cloned()
    }

    fn holder(&self) -> Option<ActorId> {
        self.inner.lock().unwrap().holder.clone()
    }

    fn fallback_actor(&self) -> Option<ActorId> {
        self.inner.lock().unwrap().fallback.clone()
    }

    fn speed(&self) -> f32 {
        self.inner.lock().unwrap().speed
    }

    fn unload_effect(&mut self, index: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.writes.push(SlotWrite::Unload { slot: index });
        if let Some(slot) = inner.slots.get_mut(index) {
            slot.effect = None;
            slot.enabled = false;
            slot.energy = 0.0;
        }
    }

    fn set_enabled(&mut self, index: usize, enabled: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.writes.push(SlotWrite::Enable {
            slot: index,
            enabled,
        });
        if let Some(slot) = inner.slots.get_mut(index) {
            slot.enabled = enabled;
        }
    }

    fn load_effect(
        &mut self,
        index: usize,
        effect: &EffectDescriptor,
        seed_energy: f32,
        actor: Option<&ActorId>,
    ) {
        let mut inner = self.inner.lock().unwrap();
        inner.writes.push(SlotWrite::Load {
            slot: index,
            effect: effect.id.clone(),
            seed: seed_energy,
            actor: actor.cloned(),
        });
        let refused = inner.refused.contains(&effect.id.normalized());
        if let Some(slot) = inner.slots.get_mut(index) {
            if slot.enabled && !refused {
                slot.effect = Some(effect.id.clone());
                slot.energy = seed_energy.clamp(0.0, slot.max_energy);
            }
        }
    }

    fn set_energy(&mut self, index: usize, energy: f32) {
        let mut inner = self.inner.lock().unwrap();
        inner.writes.push(SlotWrite::Energy {
            slot: index,
            energy,
        });
        if let Some(slot) = inner.slots.get_mut(index) {
            slot.energy = energy.clamp(0.0, slot.max_energy);
        }
    }
}

impl LifecycleSource for TestObject {
    fn subscribe(&mut self) -> SubscriptionId {
        let mut inner = self.inner.lock().unwrap();
        let id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;
        inner.subscriptions.insert(id, Vec::new());
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.inner.lock().unwrap().subscriptions.remove(&id);
    }

    fn drain_events(&mut self, id: SubscriptionId) -> Vec<LifecycleEvent> {
        self.inner
            .lock()
            .unwrap()
            .subscriptions
            .get_mut(&id)
            .map(std::mem::take)
            .unwrap_or_default()
    }
}
