//! Collaborators shared by every controller in a process.

use crate::rotation::RotationStore;
use crate::validate::WarningLedger;
use slotkeep_protocol::{Diagnostics, EffectCatalog};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide enable switch. When off, every maintenance pass is a
/// no-op.
#[derive(Debug)]
pub struct EngineSwitch(AtomicBool);

impl EngineSwitch {
    /// Create a switch in the given state.
    pub fn new(enabled: bool) -> Self {
        Self(AtomicBool::new(enabled))
    }

    /// Whether the engine is enabled.
    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set the state; returns the previous one.
    pub fn set(&self, enabled: bool) -> bool {
        self.0.swap(enabled, Ordering::AcqRel)
    }
}

impl Default for EngineSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Everything a controller needs besides its own object and config.
#[derive(Clone)]
pub struct EngineContext {
    /// Effect lookup.
    pub catalog: Arc<dyn EffectCatalog>,
    /// Counters and log throttling.
    pub diagnostics: Arc<dyn Diagnostics>,
    /// Shared round-robin offsets.
    pub rotation: Arc<RotationStore>,
    /// Process-wide enable switch.
    pub switch: Arc<EngineSwitch>,
    /// Attach-time validation warnings already emitted.
    pub warnings: Arc<WarningLedger>,
}

impl EngineContext {
    /// Context with a fresh rotation store, an enabled switch and an
    /// empty warning ledger.
    pub fn new(catalog: Arc<dyn EffectCatalog>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            catalog,
            diagnostics,
            rotation: Arc::new(RotationStore::new()),
            switch: Arc::new(EngineSwitch::default()),
            warnings: Arc::new(WarningLedger::new()),
        }
    }

    /// Replace the rotation store.
    pub fn with_rotation(mut self, rotation: Arc<RotationStore>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Replace the enable switch.
    pub fn with_switch(mut self, switch: Arc<EngineSwitch>) -> Self {
        self.switch = switch;
        self
    }
}

impl fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineContext")
            .field("rotation", &self.rotation)
            .field("switch", &self.switch)
            .finish_non_exhaustive()
    }
}
