//! Round-robin offsets shared by every spawn of an object type.

use slotkeep_protocol::ObjectTypeId;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Next round-robin offset per object type.
///
/// Entries are created lazily on the first spawn of a type and outlive
/// every controller. Keys are case-insensitive. One store is shared by
/// every controller that should rotate together; tests create their own.
#[derive(Debug, Default)]
pub struct RotationStore {
    offsets: Mutex<HashMap<String, usize>>,
}

impl RotationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn offsets(&self) -> MutexGuard<'_, HashMap<String, usize>> {
        self.offsets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the offset for this spawn of `type_id` and advance the shared
    /// one to `(offset + 1) % count`. Returns 0 when `count` is 0.
    pub fn claim(&self, type_id: &ObjectTypeId, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        let mut offsets = self.offsets();
        let next = offsets.entry(type_id.normalized()).or_insert(0);
        let offset = *next % count;
        *next = (offset + 1) % count;
        offset
    }

    /// Offset the next spawn of `type_id` would get, without claiming it.
    pub fn peek(&self, type_id: &ObjectTypeId) -> Option<usize> {
        self.offsets().get(&type_id.normalized()).copied()
    }

    /// Number of object types seen.
    pub fn len(&self) -> usize {
        self.offsets().len()
    }

    /// True when no type has spawned yet.
    pub fn is_empty(&self) -> bool {
        self.offsets().is_empty()
    }
}
