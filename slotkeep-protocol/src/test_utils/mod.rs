//! In-memory collaborators for testing.
//!
//! Available behind the `test-utils` feature flag. These are minimal
//! implementations that let engine tests drive a full lifecycle without
//! a host.

mod recording_diagnostics;
mod static_catalog;
mod test_object;

pub use recording_diagnostics::RecordingDiagnostics;
pub use static_catalog::StaticCatalog;
pub use test_object::{SlotWrite, TestObject};
