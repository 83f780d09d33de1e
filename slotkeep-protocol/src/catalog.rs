//! The effect catalog collaborator.

use crate::effect::EffectDescriptor;

/// Lookup of effects by id.
///
/// Lookups may be slow on the host side; the engine caches both hits
/// and misses per controller.
pub trait EffectCatalog: Send + Sync {
    /// Find the effect with `id`, or `None` if the catalog has no such entry.
    fn lookup(&self, id: &str) -> Option<EffectDescriptor>;
}
