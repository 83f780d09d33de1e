//! Error types for slot handling and configuration.

use crate::id::EffectId;
use thiserror::Error;

/// Per-slot failures inside one maintenance cycle. These never escape
/// a pass: the controller counts and logs them, then moves on.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SlotError {
    /// The catalog has no effect with this id.
    #[error("effect not found: {0}")]
    EffectNotFound(EffectId),

    /// A swap was performed but the slot ended with no active effect.
    #[error("load failed on slot {slot} for effect {effect}")]
    LoadFailed {
        /// Index of the slot.
        slot: usize,
        /// The effect that was requested.
        effect: EffectId,
    },

    /// The slot disappeared between listing and reading.
    #[error("slot {0} missing")]
    SlotMissing(usize),
}

/// Configuration errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The definition could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
