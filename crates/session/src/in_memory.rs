//! In-memory snapshot store: useful for testing and throwaway sessions.

use async_trait::async_trait;
use classgrid_core::{SnapshotError, SnapshotStore, WizardSnapshot};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemorySnapshotStore {
    snapshot: Arc<RwLock<Option<WizardSnapshot>>>,
    saves: AtomicUsize,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a snapshot.
    pub fn with_snapshot(snapshot: WizardSnapshot) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Some(snapshot))),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    pub async fn current(&self) -> Option<WizardSnapshot> {
        self.snapshot.read().await.clone()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn load(&self) -> Result<Option<WizardSnapshot>, SnapshotError> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, snapshot: &WizardSnapshot) -> Result<(), SnapshotError> {
        *self.snapshot.write().await = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn clear(&self) -> Result<(), SnapshotError> {
        *self.snapshot.write().await = None;
        Ok(())
    }
}
