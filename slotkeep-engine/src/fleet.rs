//! The set of attached controllers and the bulk operations on it.

use crate::config::ModuleDefinition;
use crate::context::EngineContext;
use crate::controller::{BehaviourController, ControllerPhase, PassReport};
use serde::Serialize;
use slotkeep_protocol::{EffectConfig, HostObject, ObjectTypeId, SlotState};
use tracing::{info, warn};

/// Snapshot of one controller for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateDump {
    /// Object type.
    pub type_id: ObjectTypeId,
    /// Lifecycle phase.
    pub phase: ControllerPhase,
    /// Number of slots the object reports.
    pub slot_count: usize,
    /// One-line configuration summary.
    pub config_summary: String,
    /// Configured effects in order.
    pub configs: Vec<EffectConfig>,
    /// Current slot snapshots; missing slots are skipped.
    pub slots: Vec<SlotState>,
    /// Round-robin offset claimed by the current spawn.
    pub round_robin_start: usize,
    /// Offset the next spawn of this type will claim, once any spawned.
    pub next_rotation: Option<usize>,
    /// Slots with remembered writes or ownership this spawn.
    pub remembered_slots: usize,
}

/// Every controller attached in this process.
pub struct ControllerFleet<O: HostObject> {
    ctx: EngineContext,
    controllers: Vec<BehaviourController<O>>,
}

impl<O: HostObject> ControllerFleet<O> {
    /// Empty fleet sharing `ctx` with every controller it attaches.
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            ctx,
            controllers: Vec::new(),
        }
    }

    /// Shared context.
    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Validate `definition`, attach a controller to `object` and keep it.
    pub fn attach(
        &mut self,
        object: O,
        definition: &ModuleDefinition,
        now: f32,
    ) -> &mut BehaviourController<O> {
        let controller =
            BehaviourController::from_definition(object, definition, self.ctx.clone(), now);
        self.insert(controller)
    }

    /// Keep an already attached controller.
    pub fn insert(&mut self, controller: BehaviourController<O>) -> &mut BehaviourController<O> {
        let index = self.controllers.len();
        self.controllers.push(controller);
        &mut self.controllers[index]
    }

    /// Detach and drop every controller whose object matches `pred`.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&O) -> bool) -> usize {
        let before = self.controllers.len();
        self.controllers.retain(|controller| !pred(controller.object()));
        before - self.controllers.len()
    }

    /// Tick every controller.
    pub fn tick(&mut self, now: f32) -> PassReport {
        let mut report = PassReport::default();
        for controller in &mut self.controllers {
            report.merge(controller.tick(now));
        }
        report
    }

    /// Force-apply every active controller. Returns how many were
    /// processed; detached and despawned ones are skipped, and none are
    /// processed while the engine is disabled.
    pub fn reapply_all(&mut self, now: f32, reload: bool) -> usize {
        if !self.ctx.switch.is_enabled() {
            warn!(event = "slotkeep.fleet.reapply_skipped", "reapply skipped: engine disabled");
            return 0;
        }
        if self.controllers.is_empty() {
            info!(event = "slotkeep.fleet.reapply_empty", "no controllers attached");
            return 0;
        }
        let mut processed = 0;
        for controller in self.controllers.iter_mut().filter(|c| c.is_active()) {
            controller.force_apply(now, reload);
            processed += 1;
        }
        info!(event = "slotkeep.fleet.reapplied", processed, reload, "reapply complete");
        processed
    }

    /// Snapshot and log every controller.
    pub fn dump_state(&self) -> Vec<StateDump> {
        info!(
            event = "slotkeep.fleet.dump",
            controllers = self.controllers.len(),
            rotation_types = self.ctx.rotation.len(),
            "dumping controller state"
        );
        self.controllers
            .iter()
            .map(|controller| {
                let object = controller.object();
                let slot_count = object.slot_count();
                let dump = StateDump {
                    type_id: controller.type_id().clone(),
                    phase: controller.phase(),
                    slot_count,
                    config_summary: controller.config().to_string(),
                    configs: controller.config().effects.clone(),
                    slots: (0..slot_count).filter_map(|i| object.slot(i)).collect(),
                    round_robin_start: controller.spawn_state().resolver().round_robin_start(),
                    next_rotation: self.ctx.rotation.peek(controller.type_id()),
                    remembered_slots: controller.spawn_state().remembered_slots(),
                };
                log_dump(&dump);
                dump
            })
            .collect()
    }

    /// Number of controllers.
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    /// True when no controller is attached.
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Iterate over controllers.
    pub fn iter(&self) -> impl Iterator<Item = &BehaviourController<O>> {
        self.controllers.iter()
    }

    /// Iterate mutably over controllers.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BehaviourController<O>> {
        self.controllers.iter_mut()
    }
}

fn log_dump(dump: &StateDump) {
    info!(
        event = "slotkeep.fleet.dump.controller",
        object = %dump.type_id,
        phase = ?dump.phase,
        slots = dump.slot_count,
        remembered = dump.remembered_slots,
        rr_start = dump.round_robin_start,
        next_rotation = ?dump.next_rotation,
        "{}",
        dump.config_summary
    );
    if dump.configs.is_empty() {
        info!(event = "slotkeep.fleet.dump.config", "config: none");
    }
    for (index, config) in dump.configs.iter().enumerate() {
        info!(
            event = "slotkeep.fleet.dump.config",
            index,
            effect = %config.effect_id,
            level = config.level,
            energy = config.energy
        );
    }
    for (index, slot) in dump.slots.iter().enumerate() {
        info!(
            event = "slotkeep.fleet.dump.slot",
            index,
            name = %slot.name,
            effect = slot.current_effect().map_or("none", |id| id.as_str()),
            energy = slot.energy,
            max_energy = slot.max_energy,
            enabled = slot.enabled,
            accepts_effects = slot.accepts_effects
        );
    }
}
