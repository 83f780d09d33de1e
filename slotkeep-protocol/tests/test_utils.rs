//! Behaviour of the in-memory collaborators shipped behind `test-utils`.
#![cfg(feature = "test-utils")]

use slotkeep_protocol::test_utils::{RecordingDiagnostics, SlotWrite, StaticCatalog, TestObject};
use slotkeep_protocol::*;

#[test]
fn clones_share_state() {
    let object = TestObject::new("Dagger").with_slots(1, 10.0);
    let mut handle = object.clone();
    handle.set_energy(0, 4.0);
    assert_eq!(object.slot_state(0).energy, 4.0);
    assert_eq!(object.energy_writes(), vec![(0, 4.0)]);
}

#[test]
fn events_reach_only_live_subscriptions() {
    let mut object = TestObject::new("Dagger");
    let first = object.subscribe();
    let second = object.subscribe();
    object.unsubscribe(second);

    object.emit(LifecycleEvent::SPAWN_END);

    assert_eq!(object.drain_events(first), vec![LifecycleEvent::SPAWN_END]);
    assert!(object.drain_events(first).is_empty());
    assert!(object.drain_events(second).is_empty());
    assert_eq!(object.subscriber_count(), 1);
}

#[test]
fn refused_loads_leave_slot_empty() {
    let mut object = TestObject::new("Dagger").with_slots(1, 10.0);
    object.refuse_loads_of("Fire");
    object.load_effect(0, &EffectDescriptor::new("Fire"), 0.01, None);
    assert!(object.slot_state(0).effect.is_none());
    assert!(matches!(object.writes()[0], SlotWrite::Load { .. }));
}

#[test]
fn disabled_slot_rejects_load() {
    let mut object = TestObject::new("Dagger").with_slots(1, 10.0);
    object.unload_effect(0);
    object.load_effect(0, &EffectDescriptor::new("Fire"), 0.01, None);
    assert!(object.slot_state(0).effect.is_none());

    object.set_enabled(0, true);
    object.load_effect(0, &EffectDescriptor::new("Fire"), 0.01, None);
    assert_eq!(object.slot_state(0).effect, Some(EffectId::new("Fire")));
}

#[test]
fn static_catalog_is_case_insensitive_and_counts() {
    let catalog = StaticCatalog::new(["Fire"]);
    assert_eq!(catalog.lookup("FIRE"), Some(EffectDescriptor::new("Fire")));
    assert_eq!(catalog.lookup("Frost"), None);
    assert_eq!(catalog.lookups(), 2);
}

#[test]
fn recording_diagnostics_counts() {
    let diagnostics = RecordingDiagnostics::new();
    diagnostics.record(Counter::Swap);
    diagnostics.record(Counter::Swap);
    assert_eq!(diagnostics.count(Counter::Swap), 2);
    assert_eq!(diagnostics.count(Counter::Refill), 0);
    assert!(diagnostics.should_log("k", 1.0, 0.0));
    assert_eq!(diagnostics.log_keys(), vec!["k".to_string()]);
}
