//! The per-instance behaviour controller.
//!
//! A controller owns one live object and keeps its slots supplied. It is
//! driven entirely by [`BehaviourController::tick`]: each tick drains the
//! object's lifecycle events, advances the pending apply task, then runs
//! the maintenance pass if one is due. Tick boundaries are the only
//! suspension points, so no task body runs after a despawn has been
//! observed.
//!
//! ```text
//! Detached -> Attached -> AwaitingSlots -> Applying -> Maintaining | Idle
//!                              ^                              |
//!                              +---- spawn end ---- Despawned <+ despawn start
//! ```

use crate::arbiter::{self, Verdict};
use crate::config::{InstanceConfig, ModuleDefinition};
use crate::context::EngineContext;
use crate::effect_cache::EffectCache;
use crate::energy::{EnergyDecision, EnergyPolicy, EnergyRequest};
use crate::resolver::{AssignmentStrategy, ResolveContext};
use crate::state::SpawnState;
use crate::validate::validate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use slotkeep_protocol::{
    ActorId, Counter, EffectConfig, EventPhase, HostObject, LifecycleEvent, LifecycleKind,
    ObjectTypeId, SlotState, SubscriptionId,
};
use tracing::{debug, info, warn};

/// Ticks an apply task waits for slots to appear before applying anyway.
pub const APPLY_POLL_LIMIT: u32 = 120;

const CONFLICT_LOG_INTERVAL: f32 = 1.0;
const SWAP_LOG_INTERVAL: f32 = 0.5;
const LOAD_FAILURE_LOG_INTERVAL: f32 = 2.0;
const ENERGY_LOG_INTERVAL: f32 = 1.0;

/// Where a controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerPhase {
    /// Not subscribed to anything.
    Detached,
    /// Subscribed, waiting for the first spawn.
    Attached,
    /// Spawned; polling for slots.
    AwaitingSlots,
    /// Running the forced pass.
    Applying,
    /// Maintenance passes are scheduled.
    Maintaining,
    /// Applied once; not maintaining.
    Idle,
    /// Despawned; tasks cancelled and runtime state cleared.
    Despawned,
}

/// Counts from one or more maintenance passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Passes that actually walked slots.
    pub passes: u32,
    /// Slots that resolved to a config this pass.
    pub applied: u32,
    /// Swaps attempted.
    pub swaps: u32,
    /// Energy writes performed.
    pub energy_writes: u32,
    /// External conflicts left in place.
    pub conflicts: u32,
    /// Writes deferred by the cooldown.
    pub cooldown_skips: u32,
    /// Swaps that left the slot empty.
    pub load_failures: u32,
    /// Slots skipped because their effect is not in the catalog.
    pub missing_effects: u32,
}

impl PassReport {
    /// Add `other` into `self`.
    pub fn merge(&mut self, other: PassReport) {
        self.passes += other.passes;
        self.applied += other.applied;
        self.swaps += other.swaps;
        self.energy_writes += other.energy_writes;
        self.conflicts += other.conflicts;
        self.cooldown_skips += other.cooldown_skips;
        self.load_failures += other.load_failures;
        self.missing_effects += other.missing_effects;
    }
}

#[derive(Debug, Clone, Copy)]
struct ApplyTask {
    polls_left: u32,
}

#[derive(Debug, Clone, Copy)]
struct MaintainTask {
    next_due: f32,
}

/// Keeps the slots of one object supplied with their configured effects.
pub struct BehaviourController<O: HostObject> {
    object: O,
    type_id: ObjectTypeId,
    config: InstanceConfig,
    policy: EnergyPolicy,
    ctx: EngineContext,
    subscription: Option<SubscriptionId>,
    phase: ControllerPhase,
    apply_task: Option<ApplyTask>,
    maintain_task: Option<MaintainTask>,
    spawn: SpawnState,
    effects: EffectCache,
    rng: StdRng,
}

impl<O: HostObject> BehaviourController<O> {
    /// Attach to `object` with an already ingested config.
    pub fn attach(object: O, config: InstanceConfig, ctx: EngineContext, now: f32) -> Self {
        Self::attach_with_rng(object, config, ctx, now, StdRng::from_entropy())
    }

    /// Like [`attach`](Self::attach) with a deterministic random source.
    pub fn attach_seeded(
        object: O,
        config: InstanceConfig,
        ctx: EngineContext,
        now: f32,
        seed: u64,
    ) -> Self {
        Self::attach_with_rng(object, config, ctx, now, StdRng::seed_from_u64(seed))
    }

    /// Validate `definition` against the object, log any new warnings,
    /// ingest it and attach.
    pub fn from_definition(
        object: O,
        definition: &ModuleDefinition,
        ctx: EngineContext,
        now: f32,
    ) -> Self {
        let type_id = object.type_id();
        let slots: Vec<SlotState> = (0..object.slot_count())
            .filter_map(|i| object.slot(i))
            .collect();
        for warning in validate(&type_id, definition, ctx.catalog.as_ref(), &slots) {
            ctx.warnings.warn_once(&warning);
        }
        Self::attach(object, InstanceConfig::ingest(definition), ctx, now)
    }

    fn attach_with_rng(
        mut object: O,
        config: InstanceConfig,
        ctx: EngineContext,
        now: f32,
        rng: StdRng,
    ) -> Self {
        let type_id = object.type_id();
        let subscription = object.subscribe();
        verbose!(
            config.debug_logging,
            event = "slotkeep.controller.attached",
            object = %type_id,
            %subscription,
            "attached ({config})"
        );

        let mut controller = Self {
            object,
            type_id,
            policy: EnergyPolicy::from(&config),
            config,
            ctx,
            subscription: Some(subscription),
            phase: ControllerPhase::Attached,
            apply_task: None,
            maintain_task: None,
            spawn: SpawnState::default(),
            effects: EffectCache::new(),
            rng,
        };
        if !controller.config.apply_on_spawn {
            controller.start_apply(now);
        }
        controller
    }

    /// Advance by one host tick.
    ///
    /// Returns the counts of any passes that ran during this tick.
    pub fn tick(&mut self, now: f32) -> PassReport {
        let mut report = PassReport::default();
        if let Some(subscription) = self.subscription {
            for event in self.object.drain_events(subscription) {
                self.handle_event(event, now);
            }
        }

        if let Some(task) = self.apply_task {
            if self.object.slot_count() > 0 || task.polls_left == 0 {
                self.apply_task = None;
                self.phase = ControllerPhase::Applying;
                report.merge(self.run_pass(now, true));
                if self.config.keep_filled {
                    self.start_maintaining(now);
                } else {
                    self.phase = ControllerPhase::Idle;
                }
            } else {
                self.apply_task = Some(ApplyTask {
                    polls_left: task.polls_left - 1,
                });
            }
        }

        if let Some(task) = self.maintain_task {
            if now >= task.next_due {
                report.merge(self.run_pass(now, false));
                self.maintain_task = Some(MaintainTask {
                    next_due: now + self.config.update_interval,
                });
            }
        }
        report
    }

    /// React to one lifecycle event. Only spawn end and despawn start
    /// matter; everything else is ignored.
    pub fn handle_event(&mut self, event: LifecycleEvent, now: f32) {
        match (event.kind, event.phase) {
            (LifecycleKind::Spawn, EventPhase::End) => self.start_apply(now),
            (LifecycleKind::Despawn, EventPhase::Start) => self.despawn(),
            _ => {}
        }
    }

    /// Run one pass now. `reload` makes it a forced pass.
    ///
    /// Starts maintenance if it is configured but not running. Does
    /// nothing once detached or despawned.
    pub fn force_apply(&mut self, now: f32, reload: bool) -> PassReport {
        if !self.is_active() {
            debug!(
                event = "slotkeep.controller.force_apply_ignored",
                object = %self.type_id,
                phase = ?self.phase
            );
            return PassReport::default();
        }
        let report = self.run_pass(now, reload);
        if self.config.keep_filled && self.maintain_task.is_none() {
            self.start_maintaining(now);
        }
        report
    }

    /// Unsubscribe and cancel every task. Idempotent.
    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.object.unsubscribe(subscription);
            debug!(event = "slotkeep.controller.detached", object = %self.type_id, %subscription);
        }
        self.apply_task = None;
        self.maintain_task = None;
        self.phase = ControllerPhase::Detached;
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    /// False once detached or despawned; [`force_apply`](Self::force_apply)
    /// does nothing then.
    pub fn is_active(&self) -> bool {
        !matches!(
            self.phase,
            ControllerPhase::Detached | ControllerPhase::Despawned
        )
    }

    /// The ingested configuration.
    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    /// The controlled object.
    pub fn object(&self) -> &O {
        &self.object
    }

    /// Mutable access to the controlled object.
    pub fn object_mut(&mut self) -> &mut O {
        &mut self.object
    }

    /// Object type captured at attach.
    pub fn type_id(&self) -> &ObjectTypeId {
        &self.type_id
    }

    /// Per-spawn runtime state.
    pub fn spawn_state(&self) -> &SpawnState {
        &self.spawn
    }

    /// Whether an apply task is waiting for slots.
    pub fn apply_pending(&self) -> bool {
        self.apply_task.is_some()
    }

    /// When the next maintenance pass is due, if one is scheduled.
    pub fn next_maintenance(&self) -> Option<f32> {
        self.maintain_task.map(|task| task.next_due)
    }

    fn start_apply(&mut self, now: f32) {
        if self.apply_task.is_some() {
            debug!(event = "slotkeep.controller.apply_restarted", object = %self.type_id);
        }
        let offset = match self.config.strategy {
            AssignmentStrategy::RoundRobinPerSpawn => self
                .ctx
                .rotation
                .claim(&self.type_id, self.config.effects.len()),
            _ => 0,
        };
        self.spawn.prepare(offset, now);
        self.apply_task = Some(ApplyTask {
            polls_left: APPLY_POLL_LIMIT,
        });
        self.phase = ControllerPhase::AwaitingSlots;
    }

    fn start_maintaining(&mut self, first_due: f32) {
        self.maintain_task = Some(MaintainTask {
            next_due: first_due,
        });
        self.phase = ControllerPhase::Maintaining;
    }

    fn despawn(&mut self) {
        self.apply_task = None;
        self.maintain_task = None;
        self.spawn.clear();
        self.phase = ControllerPhase::Despawned;
        debug!(event = "slotkeep.controller.despawned", object = %self.type_id);
    }

    fn run_pass(&mut self, now: f32, forced: bool) -> PassReport {
        let mut report = PassReport::default();
        let escalate = self.config.debug_logging;

        if !self.ctx.switch.is_enabled() {
            verbose!(escalate, event = "slotkeep.pass.skipped", object = %self.type_id, reason = "disabled");
            return report;
        }
        if self.config.effects.is_empty() {
            verbose!(escalate, event = "slotkeep.pass.skipped", object = %self.type_id, reason = "no_effects");
            return report;
        }
        let slot_count = self.object.slot_count();
        if slot_count == 0 {
            verbose!(escalate, event = "slotkeep.pass.skipped", object = %self.type_id, reason = "no_slots");
            return report;
        }

        report.passes = 1;
        let holder = self.object.holder();
        let resolve_ctx = ResolveContext {
            now,
            held: holder.is_some(),
            speed: self.object.speed(),
        };
        let actor = holder.or_else(|| self.object.fallback_actor());
        let count = self.config.effects.len();

        for slot in 0..slot_count {
            let Some(state) = self.object.slot(slot) else {
                continue;
            };
            if !state.accepts_effects {
                continue;
            }
            let Some(index) = self.config.strategy.resolve(
                slot,
                count,
                self.spawn.resolver_mut(),
                &resolve_ctx,
                &mut self.rng,
            ) else {
                continue;
            };
            let config = self.config.effects[index].clone();
            if config.effect_id.is_blank() {
                continue;
            }
            report.applied += 1;
            self.apply_slot(slot, state, &config, actor.as_ref(), forced, now, &mut report);
        }
        report
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_slot(
        &mut self,
        slot: usize,
        state: SlotState,
        config: &EffectConfig,
        actor: Option<&ActorId>,
        forced: bool,
        now: f32,
        report: &mut PassReport,
    ) {
        let descriptor = match self
            .effects
            .resolve(self.ctx.catalog.as_ref(), &config.effect_id)
        {
            Ok(descriptor) => descriptor,
            Err(error) => {
                debug!(event = "slotkeep.slot.skipped", object = %self.type_id, slot, %error);
                report.missing_effects += 1;
                return;
            }
        };
        let diagnostics = self.ctx.diagnostics.clone();
        let escalate = self.config.debug_logging;
        let current = state.current_effect().cloned();
        let verdict = arbiter::classify(
            current.as_ref(),
            &descriptor.id,
            self.config.conflict_policy,
            forced,
            self.spawn.last_written_effect(slot),
        );

        match verdict {
            Verdict::InSync => {
                if let Some(current) = current {
                    self.spawn.record_owner(slot, current);
                }
            }
            Verdict::Conflict { suppress_energy } => {
                diagnostics.record(Counter::Conflict);
                report.conflicts += 1;
                let current = current.map(|id| id.0).unwrap_or_default();
                let key = format!("conflict:{}:{slot}:{current}", self.type_id);
                if diagnostics.should_log(&key, CONFLICT_LOG_INTERVAL, now) {
                    info!(
                        event = "slotkeep.slot.conflict",
                        object = %self.type_id,
                        slot,
                        current = %current,
                        desired = %descriptor.id,
                        policy = %self.config.conflict_policy,
                        suppress_energy,
                        "external effect left in place"
                    );
                }
            }
            Verdict::Swap { framework_owned } => {
                diagnostics.record(Counter::Swap);
                report.swaps += 1;
                let key = format!("swap:{}:{slot}:{}", self.type_id, descriptor.id);
                if diagnostics.should_log(&key, SWAP_LOG_INTERVAL, now) {
                    info!(
                        event = "slotkeep.slot.swap",
                        object = %self.type_id,
                        slot,
                        from = current.as_ref().map_or("none", |id| id.as_str()),
                        to = %descriptor.id,
                        framework_owned
                    );
                }
                match arbiter::swap(&mut self.object, slot, &descriptor, actor) {
                    Ok(loaded) => self.spawn.record_owner(slot, loaded),
                    Err(error) => {
                        diagnostics.record(Counter::LoadFailure);
                        report.load_failures += 1;
                        let key = format!("loadfail:{}:{slot}:{}", self.type_id, descriptor.id);
                        if diagnostics.should_log(&key, LOAD_FAILURE_LOG_INTERVAL, now) {
                            let enabled = self.object.slot(slot).is_some_and(|s| s.enabled);
                            warn!(
                                event = "slotkeep.slot.load_failed",
                                object = %self.type_id,
                                slot,
                                slot_name = %state.name,
                                enabled,
                                %error
                            );
                        }
                        return;
                    }
                }
            }
        }

        if verdict.suppresses_energy() {
            return;
        }
        let mismatch_handled = verdict.swaps();
        let live = if mismatch_handled {
            match self.object.slot(slot) {
                Some(live) => live,
                None => return,
            }
        } else {
            state
        };

        let request = EnergyRequest {
            current: live.energy,
            target: config.target_energy(live.max_energy),
            forced,
            mismatch_handled,
            last_write: self.spawn.last_write(slot),
            now,
        };
        match self.policy.decide(&request) {
            EnergyDecision::Idle | EnergyDecision::Satisfied => {}
            EnergyDecision::Cooldown => {
                diagnostics.record(Counter::CooldownSkip);
                report.cooldown_skips += 1;
            }
            EnergyDecision::Write { energy } => {
                if escalate || diagnostics.verbose_enabled() {
                    let key = format!("energy:{}:{slot}", self.type_id);
                    if diagnostics.should_log(&key, ENERGY_LOG_INTERVAL, now) {
                        verbose!(
                            escalate,
                            event = "slotkeep.slot.energy",
                            object = %self.type_id,
                            slot,
                            from = live.energy,
                            to = energy
                        );
                    }
                }
                self.object.set_energy(slot, energy);
                self.spawn.record_write(slot, now);
                diagnostics.record(Counter::Refill);
                report.energy_writes += 1;
            }
        }
    }
}

impl<O: HostObject> Drop for BehaviourController<O> {
    fn drop(&mut self) {
        self.detach();
    }
}
