//! Controller lifecycle against an in-memory object.

use slotkeep_engine::{
    BehaviourController, ControllerPhase, EngineContext, InstanceConfig, ModuleDefinition,
};
use slotkeep_protocol::test_utils::{RecordingDiagnostics, SlotWrite, StaticCatalog, TestObject};
use slotkeep_protocol::{ActorId, Counter, EffectConfig, EffectId, LifecycleEvent};
use std::sync::Arc;

fn context() -> (EngineContext, Arc<RecordingDiagnostics>) {
    let diagnostics = Arc::new(RecordingDiagnostics::new());
    let catalog = Arc::new(StaticCatalog::new(["Fire", "Frost"]));
    (EngineContext::new(catalog, diagnostics.clone()), diagnostics)
}

fn definition() -> ModuleDefinition {
    ModuleDefinition {
        effects: vec![EffectConfig::new("Fire", 1.0)],
        ..ModuleDefinition::default()
    }
}

fn spawned(object: &TestObject, ctx: EngineContext) -> BehaviourController<TestObject> {
    let mut controller = BehaviourController::from_definition(object.clone(), &definition(), ctx, 0.0);
    object.emit(LifecycleEvent::SPAWN_END);
    controller.tick(0.0);
    controller
}

#[test]
fn swap_sequence_unloads_enables_then_loads_with_seed() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    object.set_external(0, Some("Frost"), 4.0);
    object.set_holder(Some("player"));
    let (ctx, _) = context();
    let _controller = spawned(&object, ctx);

    let writes = object.writes();
    assert_eq!(writes[0], SlotWrite::Unload { slot: 0 });
    assert_eq!(
        writes[1],
        SlotWrite::Enable {
            slot: 0,
            enabled: true
        }
    );
    assert_eq!(
        writes[2],
        SlotWrite::Load {
            slot: 0,
            effect: EffectId::new("Fire"),
            seed: 0.01,
            actor: Some(ActorId::new("player")),
        }
    );
    assert_eq!(writes[3], SlotWrite::Energy { slot: 0, energy: 10.0 });
}

#[test]
fn load_is_credited_to_fallback_actor_without_holder() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    object.set_fallback_actor(Some("world"));
    let (ctx, _) = context();
    let _controller = spawned(&object, ctx);

    let load = object
        .writes()
        .into_iter()
        .find(|w| matches!(w, SlotWrite::Load { .. }));
    assert!(matches!(
        load,
        Some(SlotWrite::Load { actor: Some(ref a), .. }) if a.as_str() == "world"
    ));
}

#[test]
fn despawn_cancels_pending_maintenance() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    let (ctx, _) = context();
    let mut controller = spawned(&object, ctx);
    assert!(controller.next_maintenance().is_some());

    object.emit(LifecycleEvent::DESPAWN_START);
    object.clear_writes();
    object.set_slot_energy(0, 1.0);
    for step in 1..50 {
        controller.tick(step as f32 * 0.1);
    }

    assert!(object.writes().is_empty());
    assert_eq!(controller.phase(), ControllerPhase::Despawned);
    assert_eq!(controller.next_maintenance(), None);
    assert_eq!(controller.spawn_state().remembered_slots(), 0);
}

#[test]
fn despawn_queued_with_spawn_wins_when_last() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    let (ctx, _) = context();
    let mut controller = BehaviourController::from_definition(object.clone(), &definition(), ctx, 0.0);
    object.emit(LifecycleEvent::SPAWN_END);
    object.emit(LifecycleEvent::DESPAWN_START);
    controller.tick(0.0);
    assert!(object.writes().is_empty());
    assert!(!controller.apply_pending());
}

#[test]
fn respawn_starts_clean_and_applies_again() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    let (ctx, diagnostics) = context();
    let mut controller = spawned(&object, ctx);
    object.emit(LifecycleEvent::DESPAWN_START);
    controller.tick(1.0);

    object.set_external(0, None, 0.0);
    object.emit(LifecycleEvent::SPAWN_END);
    controller.tick(2.0);

    assert_eq!(controller.phase(), ControllerPhase::Maintaining);
    assert_eq!(diagnostics.count(Counter::Swap), 2);
    assert_eq!(object.slot_state(0).energy, 10.0);
}

#[test]
fn second_spawn_replaces_pending_apply() {
    let object = TestObject::new("Sword");
    let (ctx, _) = context();
    let mut controller = BehaviourController::from_definition(object.clone(), &definition(), ctx, 0.0);
    object.emit(LifecycleEvent::SPAWN_END);
    controller.tick(0.0);
    controller.tick(0.1);
    object.emit(LifecycleEvent::SPAWN_END);
    controller.tick(0.2);
    assert!(controller.apply_pending());

    object.push_slot(slotkeep_protocol::SlotState::empty("blade", 10.0));
    let report = controller.tick(0.3);
    // one forced pass plus the first maintenance pass
    assert_eq!(report.passes, 2);
    assert_eq!(report.swaps, 1);
    assert!(!controller.apply_pending());
}

#[test]
fn force_apply_starts_maintenance_when_idle() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    let (ctx, _) = context();
    let mut controller = BehaviourController::attach(
        object.clone(),
        InstanceConfig::ingest(&definition()),
        ctx,
        0.0,
    );
    assert_eq!(controller.next_maintenance(), None);

    let report = controller.force_apply(1.0, false);
    assert_eq!(report.swaps, 1);
    assert_eq!(controller.phase(), ControllerPhase::Maintaining);
    assert_eq!(controller.next_maintenance(), Some(1.0));
}

#[test]
fn force_apply_after_despawn_is_ignored() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    let (ctx, _) = context();
    let mut controller = spawned(&object, ctx);
    object.emit(LifecycleEvent::DESPAWN_START);
    controller.tick(1.0);
    object.clear_writes();

    assert_eq!(controller.force_apply(2.0, true).passes, 0);
    assert!(object.writes().is_empty());
}

#[test]
fn load_failure_skips_energy_and_retries_next_pass() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    object.refuse_loads_of("Fire");
    let (ctx, diagnostics) = context();
    let mut controller = spawned(&object, ctx);

    // forced pass and first maintenance pass both tried
    assert_eq!(diagnostics.count(Counter::LoadFailure), 2);
    assert!(object.energy_writes().is_empty());
    assert!(
        diagnostics
            .log_keys()
            .contains(&"loadfail:Sword:0:Fire".to_owned())
    );

    controller.tick(0.2);
    assert_eq!(diagnostics.count(Counter::LoadFailure), 3);
}

#[test]
fn slots_refusing_effects_are_left_alone() {
    let object = TestObject::new("Sword").with_slots(2, 10.0);
    object.set_accepts_effects(1, false);
    let (ctx, _) = context();
    let _controller = spawned(&object, ctx);
    assert!(object.slot_state(1).current_effect().is_none());
    assert!(object.slot_state(0).current_effect().is_some());
}

#[test]
fn missing_effect_warns_once_and_touches_nothing() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    let (ctx, _) = context();
    let definition = ModuleDefinition {
        effects: vec![EffectConfig::new("Void", 1.0)],
        ..ModuleDefinition::default()
    };
    let mut controller = BehaviourController::from_definition(object.clone(), &definition, ctx.clone(), 0.0);
    object.emit(LifecycleEvent::SPAWN_END);
    let report = controller.tick(0.0);
    assert!(report.missing_effects > 0);
    assert!(object.writes().is_empty());
    // validation warned about the missing id and the ledger remembers it
    assert!(!ctx.warnings.is_empty());
}
