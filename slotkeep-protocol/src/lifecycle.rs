//! Lifecycle events: the spawn/despawn vocabulary and its subscription.
//!
//! The engine never owns or simulates the event source. It subscribes
//! once at attach time, drains whatever the host queued for that
//! subscription at the start of every tick, and unsubscribes on detach.

use crate::id::SubscriptionId;
use serde::{Deserialize, Serialize};

/// Which lifecycle transition an event reports.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleKind {
    /// The object is (re)entering the world.
    Spawn,
    /// The object is leaving the world.
    Despawn,
}

/// Whether the transition is beginning or has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPhase {
    /// The transition is starting.
    Start,
    /// The transition has finished.
    End,
}

/// One lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// The transition.
    pub kind: LifecycleKind,
    /// Start or end of it.
    pub phase: EventPhase,
}

impl LifecycleEvent {
    /// Spawn finished; slots may still be materialising.
    pub const SPAWN_END: Self = Self {
        kind: LifecycleKind::Spawn,
        phase: EventPhase::End,
    };

    /// Despawn starting.
    pub const DESPAWN_START: Self = Self {
        kind: LifecycleKind::Despawn,
        phase: EventPhase::Start,
    };

    /// Build an event.
    pub fn new(kind: LifecycleKind, phase: EventPhase) -> Self {
        Self { kind, phase }
    }
}

/// A subscription interface for an object's lifecycle stream.
pub trait LifecycleSource {
    /// Start receiving events. Events that happened before subscribing
    /// are not replayed.
    fn subscribe(&mut self) -> SubscriptionId;

    /// Stop receiving events and drop anything still queued.
    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Take every event queued for `id`, oldest first.
    fn drain_events(&mut self, id: SubscriptionId) -> Vec<LifecycleEvent>;
}
