//! Per-tick housekeeping around a controller fleet.
//!
//! The supervisor watches the enable switch, executes queued operator
//! commands, sweeps the throttle cache and emits the periodic summary.
//! It is rate limited to one run every [`UPDATE_INTERVAL`] seconds.

use slotkeep_diagnostics::{CounterSnapshot, DiagnosticsHub};
use slotkeep_engine::{ControllerFleet, EngineSwitch, StateDump};
use slotkeep_protocol::HostObject;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

/// Seconds between two supervisor runs.
pub const UPDATE_INTERVAL: f32 = 0.1;

/// An operator request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Log and return a snapshot of every controller.
    DumpState,
    /// Run a maintenance pass on every controller now.
    Reapply,
    /// Run a forced pass on every controller now.
    ForceReload,
}

/// Commands waiting for the next supervisor run. Shareable with
/// whatever UI produces them.
#[derive(Debug, Default)]
pub struct CommandQueue {
    queue: Mutex<VecDeque<Command>>,
}

impl CommandQueue {
    /// Queue `command`.
    pub fn push(&self, command: Command) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(command);
    }

    fn drain(&self) -> Vec<Command> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    /// Number of queued commands.
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What one [`Supervisor::update`] call did.
#[derive(Debug, Default)]
pub struct SupervisorReport {
    /// False when the call was rate limited away.
    pub ran: bool,
    /// New switch state, if it changed since the last run.
    pub toggled: Option<bool>,
    /// Controllers force-applied by toggles and commands.
    pub reapplied: usize,
    /// Dumps produced by [`Command::DumpState`].
    pub dumps: Vec<StateDump>,
    /// Throttle keys swept.
    pub swept: usize,
    /// Summary emitted this run.
    pub summary: Option<CounterSnapshot>,
}

/// Drives the process-level side of the engine.
pub struct Supervisor {
    hub: Arc<DiagnosticsHub>,
    switch: Arc<EngineSwitch>,
    commands: Arc<CommandQueue>,
    last_enabled: bool,
    next_update: f32,
}

impl Supervisor {
    /// Supervise `switch`, reporting through `hub`.
    pub fn new(hub: Arc<DiagnosticsHub>, switch: Arc<EngineSwitch>) -> Self {
        let last_enabled = switch.is_enabled();
        Self {
            hub,
            switch,
            commands: Arc::new(CommandQueue::default()),
            last_enabled,
            next_update: 0.0,
        }
    }

    /// Handle for queueing commands.
    pub fn commands(&self) -> Arc<CommandQueue> {
        self.commands.clone()
    }

    /// Queue `command` for the next run.
    pub fn queue(&self, command: Command) {
        self.commands.push(command);
    }

    /// Flip the enable switch. Takes effect at the next run.
    pub fn set_enabled(&self, enabled: bool) {
        self.switch.set(enabled);
    }

    /// Run housekeeping if [`UPDATE_INTERVAL`] has passed since the last run.
    pub fn update<O: HostObject>(
        &mut self,
        now: f32,
        fleet: &mut ControllerFleet<O>,
    ) -> SupervisorReport {
        let mut report = SupervisorReport::default();
        if now < self.next_update {
            return report;
        }
        self.next_update = now + UPDATE_INTERVAL;
        report.ran = true;

        let enabled = self.switch.is_enabled();
        if enabled != self.last_enabled {
            self.last_enabled = enabled;
            report.toggled = Some(enabled);
            if enabled {
                info!(event = "slotkeep.engine.enabled", "engine enabled; reapplying");
                report.reapplied += fleet.reapply_all(now, true);
            } else {
                info!(event = "slotkeep.engine.disabled", "engine disabled");
            }
        }

        for command in self.commands.drain() {
            match command {
                Command::DumpState => report.dumps.extend(fleet.dump_state()),
                Command::Reapply => report.reapplied += fleet.reapply_all(now, false),
                Command::ForceReload => report.reapplied += fleet.reapply_all(now, true),
            }
        }

        report.swept = self.hub.cleanup(now);
        report.summary = self.hub.emit_summary(now, fleet.len());
        report
    }
}
