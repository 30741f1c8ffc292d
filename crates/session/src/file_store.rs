//! File-based snapshot store: one pretty-printed JSON document.
//!
//! Storage location: `~/.classgrid/session.json` unless configured otherwise.
//! Saves go through a sibling temp file and a rename, so a crash mid-write
//! leaves the previous snapshot in place.

use async_trait::async_trait;
use classgrid_core::{SnapshotError, SnapshotStore, WizardSnapshot};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A snapshot store backed by a single JSON file.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self) -> Result<Option<WizardSnapshot>, SnapshotError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SnapshotError::Storage(format!(
                    "Failed to read snapshot {}: {e}",
                    self.path.display()
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        let snapshot = serde_json::from_str(&content)
            .map_err(|e| SnapshotError::Corrupt(format!("{}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), "Snapshot loaded");
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &WizardSnapshot) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                SnapshotError::Storage(format!("Failed to create snapshot directory: {e}"))
            })?;
        }

        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|e| SnapshotError::Storage(format!("Failed to serialize snapshot: {e}")))?;

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| SnapshotError::Storage(format!("Failed to write snapshot: {e}")))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| SnapshotError::Storage(format!("Failed to replace snapshot: {e}")))?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), SnapshotError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SnapshotError::Storage(format!(
                "Failed to remove snapshot: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classgrid_core::{Discipline, Restriction, WizardStep};

    fn sample() -> WizardSnapshot {
        WizardSnapshot {
            step: WizardStep::Restrictions,
            disciplines: vec![Discipline::new("Calc I").with_semester("1")],
            restrictions: vec![Restriction::manual_fixed("Calc I", 2)],
            current_dataset_name: Some("bcc".into()),
            ..WizardSnapshot::default()
        }
    }

    #[tokio::test]
    async fn save_and_load_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("nested").join("session.json"));

        store.save(&sample()).await.unwrap();
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\"Calc I\""));
        assert!(!store.temp_path().exists());

        let reopened = FileSnapshotStore::new(store.path());
        assert_eq!(reopened.load().await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn save_replaces_whole_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("session.json"));

        store.save(&sample()).await.unwrap();
        store.save(&WizardSnapshot::default()).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert!(loaded.disciplines.is_empty());
        assert!(loaded.current_dataset_name.is_none());
    }

    #[tokio::test]
    async fn handles_missing_file_gracefully() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("absent.json"));
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ this is not json").unwrap();

        let err = FileSnapshotStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, SnapshotError::Corrupt(_)));
    }

    #[tokio::test]
    async fn clear_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("session.json"));
        store.save(&sample()).await.unwrap();
        store.clear().await.unwrap();
        assert!(!store.path().exists());
        assert!(store.load().await.unwrap().is_none());
    }
}
