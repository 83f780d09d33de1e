//! Energy scheduling and conflict arbitration through full passes.

use slotkeep_engine::{BehaviourController, ConflictPolicy, EngineContext, ModuleDefinition};
use slotkeep_protocol::test_utils::{RecordingDiagnostics, StaticCatalog, TestObject};
use slotkeep_protocol::{Counter, EffectConfig, EffectId, LifecycleEvent};
use std::sync::Arc;

fn context() -> (EngineContext, Arc<RecordingDiagnostics>) {
    let diagnostics = Arc::new(RecordingDiagnostics::new());
    let catalog = Arc::new(StaticCatalog::new(["Fire", "Frost"]));
    (EngineContext::new(catalog, diagnostics.clone()), diagnostics)
}

fn spawn(
    object: &TestObject,
    definition: ModuleDefinition,
    ctx: EngineContext,
) -> BehaviourController<TestObject> {
    let mut controller = BehaviourController::from_definition(object.clone(), &definition, ctx, 0.0);
    object.emit(LifecycleEvent::SPAWN_END);
    controller.tick(0.0);
    controller
}

fn fire() -> ModuleDefinition {
    ModuleDefinition {
        effects: vec![EffectConfig::new("Fire", 1.0)],
        ..ModuleDefinition::default()
    }
}

#[test]
fn cooldown_allows_one_write_per_interval() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    let (ctx, diagnostics) = context();
    let mut controller = spawn(&object, fire(), ctx);
    object.clear_writes();
    let skips_before = diagnostics.count(Counter::CooldownSkip);

    let first = 1.0;
    object.set_slot_energy(0, 5.0);
    controller.tick(first);
    object.set_slot_energy(0, 5.0);
    controller.tick(first + 0.2);

    assert_eq!(object.energy_writes(), vec![(0, 10.0)]);
    assert_eq!(diagnostics.count(Counter::CooldownSkip) - skips_before, 1);
}

#[test]
fn forced_pass_tops_up_small_gap() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    object.set_external(0, Some("Fire"), 9.7);
    let (ctx, diagnostics) = context();
    let _controller = spawn(&object, fire(), ctx);

    assert_eq!(diagnostics.count(Counter::Swap), 0);
    assert_eq!(object.energy_writes(), vec![(0, 10.0)]);
}

#[test]
fn maintenance_refills_below_threshold_only() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    let (ctx, _) = context();
    let mut controller = spawn(&object, fire(), ctx);
    object.clear_writes();

    object.set_slot_energy(0, 9.9);
    controller.tick(1.0);
    assert!(object.energy_writes().is_empty());

    object.set_slot_energy(0, 9.7);
    controller.tick(2.0);
    assert_eq!(object.energy_writes(), vec![(0, 10.0)]);
}

#[test]
fn refill_ratio_sets_partial_target() {
    let object = TestObject::new("Sword").with_slots(1, 20.0);
    let (ctx, _) = context();
    let definition = ModuleDefinition {
        effects: vec![EffectConfig::with_energy("Fire", 10.0)],
        maintain_below_ratio: 0.5,
        refill_to_ratio: 0.8,
        ..ModuleDefinition::default()
    };
    let mut controller = spawn(&object, definition, ctx);
    assert_eq!(object.slot_state(0).energy, 10.0);
    object.clear_writes();

    object.set_slot_energy(0, 4.0);
    controller.tick(1.0);
    assert_eq!(object.energy_writes(), vec![(0, 8.0)]);
}

#[test]
fn external_conflict_without_energy_write_is_left_alone() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    let (ctx, diagnostics) = context();
    let definition = ModuleDefinition {
        conflict_policy: ConflictPolicy::RespectExternalNoEnergyWrite,
        ..fire()
    };
    let mut controller = spawn(&object, definition, ctx);
    object.clear_writes();

    object.set_external(0, Some("Frost"), 3.0);
    controller.tick(1.0);

    let state = object.slot_state(0);
    assert_eq!(state.current_effect(), Some(&EffectId::new("Frost")));
    assert_eq!(diagnostics.count(Counter::Conflict), 1);
    assert!(object.writes().is_empty());
    assert!(
        diagnostics
            .log_keys()
            .contains(&"conflict:Sword:0:Frost".to_owned())
    );
}

#[test]
fn respect_external_still_tops_up_energy() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    let (ctx, diagnostics) = context();
    let definition = ModuleDefinition {
        conflict_policy: ConflictPolicy::RespectExternal,
        ..fire()
    };
    let mut controller = spawn(&object, definition, ctx);
    object.clear_writes();

    object.set_external(0, Some("Frost"), 3.0);
    controller.tick(1.0);

    assert_eq!(diagnostics.count(Counter::Conflict), 1);
    assert_eq!(object.energy_writes(), vec![(0, 10.0)]);
    assert_eq!(
        object.slot_state(0).current_effect(),
        Some(&EffectId::new("Frost"))
    );
}

#[test]
fn force_configured_swaps_external_effect_back() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    let (ctx, diagnostics) = context();
    let mut controller = spawn(&object, fire(), ctx);

    object.set_external(0, Some("Frost"), 3.0);
    controller.tick(1.0);

    assert_eq!(diagnostics.count(Counter::Conflict), 0);
    assert_eq!(
        object.slot_state(0).current_effect(),
        Some(&EffectId::new("Fire"))
    );
    assert_eq!(object.slot_state(0).energy, 10.0);
}

#[test]
fn forced_reapply_overrides_respected_conflict() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    let (ctx, _) = context();
    let definition = ModuleDefinition {
        conflict_policy: ConflictPolicy::RespectExternal,
        ..fire()
    };
    let mut controller = spawn(&object, definition, ctx);
    object.set_external(0, Some("Frost"), 3.0);

    let report = controller.force_apply(1.0, true);
    assert_eq!(report.swaps, 1);
    assert_eq!(report.conflicts, 0);
    assert_eq!(
        object.slot_state(0).current_effect(),
        Some(&EffectId::new("Fire"))
    );
}

#[test]
fn energy_logs_only_when_verbose() {
    let object = TestObject::new("Sword").with_slots(1, 10.0);
    let diagnostics = Arc::new(RecordingDiagnostics::verbose());
    let ctx = EngineContext::new(Arc::new(StaticCatalog::new(["Fire"])), diagnostics.clone());
    let _controller = spawn(&object, fire(), ctx);
    assert!(
        diagnostics
            .log_keys()
            .contains(&"energy:Sword:0".to_owned())
    );

    let quiet = TestObject::new("Axe").with_slots(1, 10.0);
    let (ctx, diagnostics) = context();
    let _controller = spawn(&quiet, fire(), ctx);
    assert!(
        !diagnostics
            .log_keys()
            .iter()
            .any(|key| key.starts_with("energy:"))
    );
}
