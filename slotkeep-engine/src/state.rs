//! Per-spawn runtime state of one controller.

use crate::resolver::ResolverState;
use slotkeep_protocol::EffectId;
use std::collections::HashMap;

/// What the engine remembers about one slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotMemory {
    /// Time of the last energy write this spawn.
    pub last_write: Option<f32>,
    /// Effect id this engine last loaded (or confirmed) in the slot.
    pub last_written_effect: Option<EffectId>,
}

/// Runtime state that lives from spawn preparation to despawn.
#[derive(Debug, Clone, Default)]
pub struct SpawnState {
    resolver: ResolverState,
    slots: HashMap<usize, SlotMemory>,
}

impl SpawnState {
    /// Reset for a new spawn.
    ///
    /// Random picks, write timestamps and the conditional state start
    /// over. Ownership ids survive; only despawn forgets them.
    pub fn prepare(&mut self, round_robin_start: usize, now: f32) {
        self.resolver.prepare(round_robin_start, now);
        for memory in self.slots.values_mut() {
            memory.last_write = None;
        }
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.resolver.clear();
        self.slots.clear();
    }

    /// Resolver memory.
    pub fn resolver(&self) -> &ResolverState {
        &self.resolver
    }

    /// Mutable resolver memory.
    pub fn resolver_mut(&mut self) -> &mut ResolverState {
        &mut self.resolver
    }

    /// Memory for `slot`, if any was recorded.
    pub fn slot(&self, slot: usize) -> Option<&SlotMemory> {
        self.slots.get(&slot)
    }

    /// Last write time for `slot`.
    pub fn last_write(&self, slot: usize) -> Option<f32> {
        self.slots.get(&slot).and_then(|m| m.last_write)
    }

    /// Last id this engine wrote into `slot`.
    pub fn last_written_effect(&self, slot: usize) -> Option<&EffectId> {
        self.slots
            .get(&slot)
            .and_then(|m| m.last_written_effect.as_ref())
    }

    /// Record an energy write at `now`.
    pub fn record_write(&mut self, slot: usize, now: f32) {
        self.slots.entry(slot).or_default().last_write = Some(now);
    }

    /// Record `effect` as engine-owned in `slot`.
    pub fn record_owner(&mut self, slot: usize, effect: EffectId) {
        self.slots.entry(slot).or_default().last_written_effect = Some(effect);
    }

    /// Number of slots with remembered writes or ownership.
    pub fn remembered_slots(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_keeps_ownership_but_drops_timestamps() {
        let mut state = SpawnState::default();
        state.record_write(0, 1.0);
        state.record_owner(0, EffectId::new("Fire"));
        state.prepare(1, 2.0);
        assert_eq!(state.last_write(0), None);
        assert_eq!(state.last_written_effect(0), Some(&EffectId::new("Fire")));
        assert_eq!(state.resolver().round_robin_start(), 1);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut state = SpawnState::default();
        state.prepare(2, 0.0);
        state.record_write(1, 1.0);
        state.record_owner(1, EffectId::new("Fire"));
        state.clear();
        assert_eq!(state.remembered_slots(), 0);
        assert_eq!(state.resolver().round_robin_start(), 0);
        assert!(state.slot(1).is_none());
    }
}
