//! Memoised catalog lookups.

use slotkeep_protocol::{EffectCatalog, EffectDescriptor, EffectId, SlotError};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Caches catalog hits and misses by id.
///
/// A miss is warned about once and never looked up again for the life of
/// the cache.
#[derive(Debug, Default)]
pub struct EffectCache {
    found: HashMap<String, EffectDescriptor>,
    missing: HashSet<String>,
}

impl EffectCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `id`, consulting `catalog` at most once per distinct id.
    /// Blank ids are never looked up.
    pub fn resolve(
        &mut self,
        catalog: &dyn EffectCatalog,
        id: &EffectId,
    ) -> Result<EffectDescriptor, SlotError> {
        let not_found = || SlotError::EffectNotFound(id.clone());
        if id.is_blank() {
            return Err(not_found());
        }
        let key = id.normalized();
        if let Some(descriptor) = self.found.get(&key) {
            return Ok(descriptor.clone());
        }
        if self.missing.contains(&key) {
            return Err(not_found());
        }

        match catalog.lookup(id.as_str()) {
            Some(descriptor) => {
                self.found.insert(key, descriptor.clone());
                Ok(descriptor)
            }
            None => {
                warn!(event = "slotkeep.effect.missing", effect = %id, "effect not found in catalog");
                self.missing.insert(key);
                Err(not_found())
            }
        }
    }

    /// Ids known to be missing.
    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }
}
