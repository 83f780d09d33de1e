//! StaticCatalog: HashMap-backed EffectCatalog for testing.

use crate::catalog::EffectCatalog;
use crate::effect::EffectDescriptor;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed set of effects. Lookups are case-insensitive and counted so
/// tests can assert on caching.
pub struct StaticCatalog {
    effects: HashMap<String, EffectDescriptor>,
    lookups: AtomicUsize,
}

impl StaticCatalog {
    /// Catalog containing exactly `ids`.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let effects = ids
            .into_iter()
            .map(|id| {
                let id = id.into();
                (id.to_ascii_lowercase(), EffectDescriptor::new(id))
            })
            .collect();
        Self {
            effects,
            lookups: AtomicUsize::new(0),
        }
    }

    /// How many times [`EffectCatalog::lookup`] was called.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl EffectCatalog for StaticCatalog {
    fn lookup(&self, id: &str) -> Option<EffectDescriptor> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.effects.get(&id.to_ascii_lowercase()).cloned()
    }
}
