//! Wizard session state and snapshot persistence for classgrid.

pub mod file_store;
pub mod in_memory;
pub mod wizard;

pub use file_store::FileSnapshotStore;
pub use in_memory::InMemorySnapshotStore;
pub use wizard::{DatasetSummary, WizardSession};
