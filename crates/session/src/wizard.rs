//! The wizard session.
//!
//! Owns configuration, disciplines, restrictions, the last allocation, the
//! current step and the loaded dataset name. Every mutation writes a full
//! snapshot through the [`SnapshotStore`]; a session opened on a missing or
//! unreadable snapshot starts from defaults.

use std::sync::Arc;

use chrono::Utc;
use classgrid_core::reconcile::stamp_imported;
use classgrid_core::{
    AllocationResult, Discipline, Error, ExportLocations, ExportRequest, Grid, ImportMode,
    MergeOutcome, Restriction, Result, ScheduleConfig, ScheduleRequest, SnapshotStore,
    SolverBackend, TabularExporter, WizardSnapshot, WizardStep, assemble_grid,
    normalize_disciplines, normalize_restrictions, reconcile,
};
use tracing::{debug, info, warn};

/// What a dataset load brought in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub name: String,
    pub disciplines: usize,
    /// Rows without a usable name.
    pub skipped_disciplines: usize,
    pub restrictions: usize,
}

pub struct WizardSession {
    store: Arc<dyn SnapshotStore>,
    defaults: ScheduleConfig,
    state: WizardSnapshot,
}

impl WizardSession {
    /// Restore the last snapshot, or start fresh with `defaults`.
    pub async fn open(store: Arc<dyn SnapshotStore>, defaults: ScheduleConfig) -> Self {
        let state = match store.load().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => WizardSnapshot::with_config(defaults.clone()),
            Err(e) => {
                warn!(store = store.name(), error = %e, "Discarding unreadable snapshot");
                WizardSnapshot::with_config(defaults.clone())
            }
        };
        debug!(
            step = %state.step,
            disciplines = state.disciplines.len(),
            restrictions = state.restrictions.len(),
            "Wizard session opened"
        );
        Self {
            store,
            defaults,
            state,
        }
    }

    pub fn snapshot(&self) -> &WizardSnapshot {
        &self.state
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    pub fn step(&self) -> WizardStep {
        self.state.step
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.state.config
    }

    pub fn disciplines(&self) -> &[Discipline] {
        &self.state.disciplines
    }

    pub fn restrictions(&self) -> &[Restriction] {
        &self.state.restrictions
    }

    pub fn allocation_result(&self) -> Option<&AllocationResult> {
        self.state.allocation_result.as_ref()
    }

    pub fn dataset_name(&self) -> Option<&str> {
        self.state.current_dataset_name.as_deref()
    }

    async fn persist(&mut self) -> Result<()> {
        self.state.saved_at = Some(Utc::now());
        self.store.save(&self.state).await?;
        Ok(())
    }

    pub async fn set_step(&mut self, step: WizardStep) -> Result<()> {
        if self.state.step == step {
            return Ok(());
        }
        self.state.step = step;
        self.persist().await
    }

    /// Replace the schedule configuration.
    pub async fn configure(&mut self, config: ScheduleConfig) -> Result<()> {
        config.validate()?;
        self.state.config = config;
        self.state.step = WizardStep::Disciplines;
        self.persist().await
    }

    /// Register a discipline. Fields are trimmed; the name must not be empty.
    pub async fn add_discipline(&mut self, discipline: Discipline) -> Result<()> {
        let discipline = Discipline {
            name: discipline.name.trim().to_string(),
            professor: discipline.professor.trim().to_string(),
            semester: discipline.semester.trim().to_string(),
        };
        if discipline.name.is_empty() {
            return Err(Error::InvalidInput("discipline name must not be empty".into()));
        }
        if self.state.disciplines.iter().any(|d| d.name == discipline.name) {
            warn!(name = %discipline.name, "Discipline name already registered; the solver will see both");
        }
        self.state.disciplines.push(discipline);
        self.persist().await
    }

    /// Remove the discipline at `index`. Out-of-range is a no-op.
    pub async fn remove_discipline(&mut self, index: usize) -> Result<Option<Discipline>> {
        if index >= self.state.disciplines.len() {
            return Ok(None);
        }
        let removed = self.state.disciplines.remove(index);
        self.persist().await?;
        Ok(Some(removed))
    }

    pub async fn clear_disciplines(&mut self) -> Result<()> {
        self.state.disciplines.clear();
        self.persist().await
    }

    /// Pin a discipline to a block, marked as manual.
    pub async fn add_fixed_restriction(&mut self, discipline: &str, block: u32) -> Result<()> {
        let discipline = discipline.trim();
        if discipline.is_empty() {
            return Err(Error::InvalidInput("discipline name must not be empty".into()));
        }
        let total = self.state.config.total_blocks();
        if block >= total {
            warn!(%discipline, block, total, "Fixed block lies outside the week; the solver will ignore it");
        }
        self.state
            .restrictions
            .push(Restriction::manual_fixed(discipline, block));
        self.persist().await
    }

    pub async fn remove_restriction(&mut self, index: usize) -> Result<Option<Restriction>> {
        if index >= self.state.restrictions.len() {
            return Ok(None);
        }
        let removed = self.state.restrictions.remove(index);
        self.persist().await?;
        Ok(Some(removed))
    }

    /// Import restriction files through the backend and reconcile them with
    /// the current list. A failed call leaves the list untouched.
    pub async fn import_restrictions(
        &mut self,
        backend: &dyn SolverBackend,
        files: &[String],
        mode: ImportMode,
    ) -> Result<MergeOutcome> {
        if files.is_empty() {
            return Err(Error::InvalidInput("no restriction files selected".into()));
        }
        let raw = backend.import_restriction_files(files).await?;
        let mut batch = normalize_restrictions(&raw);
        stamp_imported(&mut batch);

        let outcome = reconcile(&self.state.restrictions, batch, mode);
        self.state.restrictions = outcome.restrictions.clone();
        self.persist().await?;
        info!(
            files = files.len(),
            %mode,
            appended = outcome.appended,
            replaced = outcome.replaced,
            "Restrictions imported"
        );
        Ok(outcome)
    }

    /// Replace disciplines and restrictions with a bundled dataset.
    pub async fn load_dataset(
        &mut self,
        backend: &dyn SolverBackend,
        name: &str,
    ) -> Result<DatasetSummary> {
        let dataset = backend.load_dataset(name).await?;
        let disciplines = normalize_disciplines(&dataset.disciplines);
        let restrictions = normalize_restrictions(&dataset.restrictions);
        let skipped = dataset.disciplines.len().saturating_sub(disciplines.len());
        if skipped > 0 {
            debug!(dataset = %name, skipped, "Dropped dataset rows without a discipline name");
        }

        let summary = DatasetSummary {
            name: name.to_string(),
            disciplines: disciplines.len(),
            skipped_disciplines: skipped,
            restrictions: restrictions.len(),
        };

        self.state.disciplines = disciplines;
        self.state.restrictions = restrictions;
        self.state.current_dataset_name = Some(name.to_string());
        self.state.allocation_result = None;
        self.state.step = WizardStep::Disciplines;
        self.persist().await?;
        Ok(summary)
    }

    /// Send the current problem to the solver and keep the answer.
    ///
    /// When the service rejects the problem the previous allocation is
    /// discarded; when it cannot be reached nothing changes.
    pub async fn generate(&mut self, backend: &dyn SolverBackend) -> Result<&AllocationResult> {
        let request = ScheduleRequest {
            config: self.state.config.clone(),
            disciplines: self.state.disciplines.clone(),
            restrictions: self.state.restrictions.clone(),
        };

        match backend.generate_schedule(&request).await {
            Ok(result) => {
                info!(
                    backend = backend.name(),
                    allocated = result.allocation.len(),
                    used_blocks = result.stats.used_blocks,
                    "Schedule generated"
                );
                self.state.step = WizardStep::Review;
                self.state.allocation_result = Some(result);
                self.persist().await?;
                self.state
                    .allocation_result
                    .as_ref()
                    .ok_or_else(|| Error::Internal("allocation missing after save".into()))
            }
            Err(e) if e.is_rejection() => {
                self.state.allocation_result = None;
                self.state.step = WizardStep::Generate;
                self.persist().await?;
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Weekly grid of the last allocation.
    pub fn grid(&self) -> Option<Grid> {
        self.allocation_result()
            .map(|result| assemble_grid(&self.state.config, result, &self.state.disciplines))
    }

    /// Matrix and list projections of the last allocation.
    pub fn exporter(&self) -> Option<TabularExporter<'_>> {
        self.allocation_result()
            .map(|result| TabularExporter::new(&self.state.config, result))
    }

    /// File prefix for exports: the dataset name, else `fallback`.
    pub fn export_prefix(&self, fallback: &str) -> String {
        self.dataset_name()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    /// Have the backend write CSV/XLSX files for the last allocation.
    pub async fn export_remote(
        &self,
        backend: &dyn SolverBackend,
        prefix: &str,
    ) -> Result<ExportLocations> {
        let result = self
            .allocation_result()
            .ok_or_else(|| Error::InvalidInput("no schedule generated yet".into()))?;
        let locations = backend
            .export_schedule(&ExportRequest::from_result(prefix, result))
            .await?;
        Ok(locations)
    }

    /// Forget everything and start over from the configured defaults.
    pub async fn reset(&mut self) -> Result<()> {
        self.store.clear().await?;
        self.state = WizardSnapshot::with_config(self.defaults.clone());
        info!("Wizard session reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemorySnapshotStore;
    use async_trait::async_trait;
    use classgrid_core::{Dataset, SolverError};
    use serde_json::json;
    use std::sync::Mutex;

    /// Backend answering from fixed values.
    #[derive(Default)]
    struct StubBackend {
        generate: Mutex<Option<std::result::Result<AllocationResult, SolverError>>>,
        imported: Vec<serde_json::Value>,
        fail_import: bool,
    }

    #[async_trait]
    impl SolverBackend for StubBackend {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate_schedule(
            &self,
            _request: &ScheduleRequest,
        ) -> std::result::Result<AllocationResult, SolverError> {
            self.generate
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(SolverError::Network("no answer scripted".into())))
        }

        async fn list_restriction_files(&self) -> std::result::Result<Vec<String>, SolverError> {
            Ok(vec!["fixos.csv".into()])
        }

        async fn import_restriction_files(
            &self,
            _files: &[String],
        ) -> std::result::Result<Vec<serde_json::Value>, SolverError> {
            if self.fail_import {
                return Err(SolverError::Network("connection refused".into()));
            }
            Ok(self.imported.clone())
        }

        async fn export_schedule(
            &self,
            request: &ExportRequest,
        ) -> std::result::Result<ExportLocations, SolverError> {
            Ok(ExportLocations {
                csv_path: Some(format!("/out/{}.csv", request.prefix)),
                ..ExportLocations::default()
            })
        }

        async fn list_datasets(&self) -> std::result::Result<Vec<String>, SolverError> {
            Ok(vec!["bcc".into()])
        }

        async fn load_dataset(&self, name: &str) -> std::result::Result<Dataset, SolverError> {
            Ok(Dataset {
                name: name.into(),
                disciplines: vec![
                    json!({"Nome": "Calc I", "professores": "Ana", "Semestre": 1}),
                    json!({"prof": "nobody"}),
                ],
                restrictions: vec![json!({"tipo": "dia_fixo", "disciplina": "Calc I", "dia": "seg"})],
            })
        }

        async fn health_check(&self) -> std::result::Result<bool, SolverError> {
            Ok(true)
        }
    }

    fn answer() -> AllocationResult {
        AllocationResult {
            allocation: [("Calc I", 0), ("Phys I", 10)].into_iter().collect(),
            block_labels: [(0, "Seg 08:00".to_string()), (10, "Qua 14:00".to_string())]
                .into_iter()
                .collect(),
            ..AllocationResult::default()
        }
    }

    async fn session(store: &Arc<InMemorySnapshotStore>) -> WizardSession {
        WizardSession::open(store.clone(), ScheduleConfig::default()).await
    }

    #[tokio::test]
    async fn fresh_session_uses_defaults() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let defaults = ScheduleConfig {
            days_per_week: 6,
            ..ScheduleConfig::default()
        };
        let session = WizardSession::open(store.clone(), defaults).await;
        assert_eq!(session.config().days_per_week, 6);
        assert_eq!(session.step(), WizardStep::Setup);
        assert!(session.grid().is_none());
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn every_mutation_writes_full_snapshot() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut session = session(&store).await;

        session
            .add_discipline(Discipline::new("  Calc I ").with_semester(" 1 "))
            .await
            .unwrap();
        session.add_fixed_restriction("Calc I", 2).await.unwrap();
        assert_eq!(store.save_count(), 2);

        let saved = store.current().await.unwrap();
        assert_eq!(saved.disciplines[0].name, "Calc I");
        assert_eq!(saved.disciplines[0].semester, "1");
        assert_eq!(saved.restrictions, [Restriction::manual_fixed("Calc I", 2)]);
        assert!(saved.saved_at.is_some());

        let reopened = self::session(&store).await;
        assert_eq!(reopened.disciplines(), session.disciplines());
    }

    #[tokio::test]
    async fn blank_discipline_rejected_without_saving() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut session = session(&store).await;
        let err = session.add_discipline(Discipline::new("   ")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn invalid_config_rejected() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut session = session(&store).await;
        let bad = ScheduleConfig {
            days_per_week: 0,
            ..ScheduleConfig::default()
        };
        assert!(session.configure(bad).await.is_err());
        assert_eq!(session.config(), &ScheduleConfig::default());
    }

    #[tokio::test]
    async fn remove_out_of_range_is_noop() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut session = session(&store).await;
        session.add_discipline(Discipline::new("A")).await.unwrap();
        assert!(session.remove_discipline(5).await.unwrap().is_none());
        let removed = session.remove_discipline(0).await.unwrap();
        assert_eq!(removed.map(|d| d.name), Some("A".to_string()));
        assert!(session.disciplines().is_empty());
    }

    #[tokio::test]
    async fn merge_import_stamps_and_dedups() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut session = session(&store).await;
        session.add_fixed_restriction("Calc I", 2).await.unwrap();

        let backend = StubBackend {
            imported: vec![
                json!({"tipo": "fixo", "disciplina": "Calc I", "bloco": "2"}),
                json!({"type": "no_overlap", "d1": "A", "d2": "B", "origem": "pares.csv"}),
            ],
            ..StubBackend::default()
        };
        let files = vec!["fixos.csv".to_string()];
        let outcome = session
            .import_restrictions(&backend, &files, ImportMode::Merge)
            .await
            .unwrap();
        assert_eq!((outcome.appended, outcome.replaced), (1, 1));
        assert_eq!(session.restrictions().len(), 2);
        assert_eq!(session.restrictions()[0].origin.as_deref(), Some("imported"));
        assert_eq!(session.restrictions()[1].origin.as_deref(), Some("pares.csv"));

        let again = session
            .import_restrictions(&backend, &files, ImportMode::Merge)
            .await
            .unwrap();
        assert_eq!(again.restrictions, outcome.restrictions);
    }

    #[tokio::test]
    async fn failed_import_leaves_list_untouched() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut session = session(&store).await;
        session.add_fixed_restriction("Calc I", 2).await.unwrap();
        let before = session.restrictions().to_vec();

        let backend = StubBackend {
            fail_import: true,
            ..StubBackend::default()
        };
        let err = session
            .import_restrictions(&backend, &["x.csv".to_string()], ImportMode::Replace)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Solver(SolverError::Network(_))));
        assert_eq!(session.restrictions(), before.as_slice());
    }

    #[tokio::test]
    async fn dataset_load_replaces_and_clears_allocation() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut session = session(&store).await;
        let backend = StubBackend {
            generate: Mutex::new(Some(Ok(answer()))),
            ..StubBackend::default()
        };
        session.generate(&backend).await.unwrap();
        assert!(session.allocation_result().is_some());

        let summary = session.load_dataset(&backend, "bcc").await.unwrap();
        assert_eq!(summary.disciplines, 1);
        assert_eq!(summary.skipped_disciplines, 1);
        assert_eq!(session.disciplines()[0].professor, "Ana");
        assert_eq!(session.disciplines()[0].semester, "1");
        assert_eq!(session.restrictions()[0].day(), Some("seg"));
        assert_eq!(session.dataset_name(), Some("bcc"));
        assert!(session.allocation_result().is_none());
        assert_eq!(session.export_prefix("grade"), "bcc");
    }

    #[tokio::test]
    async fn rejection_discards_previous_allocation() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut session = session(&store).await;
        let backend = StubBackend {
            generate: Mutex::new(Some(Ok(answer()))),
            ..StubBackend::default()
        };
        session.generate(&backend).await.unwrap();

        *backend.generate.lock().unwrap() = Some(Err(SolverError::Validation(vec![])));
        assert!(session.generate(&backend).await.is_err());
        assert!(session.allocation_result().is_none());
        assert!(store.current().await.unwrap().allocation_result.is_none());
    }

    #[tokio::test]
    async fn transport_failure_keeps_previous_allocation() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut session = session(&store).await;
        let backend = StubBackend {
            generate: Mutex::new(Some(Ok(answer()))),
            ..StubBackend::default()
        };
        session.generate(&backend).await.unwrap();
        let saves = store.save_count();

        // Nothing scripted: the stub reports a network error.
        assert!(session.generate(&backend).await.is_err());
        assert!(session.allocation_result().is_some());
        assert_eq!(store.save_count(), saves);
    }

    #[tokio::test]
    async fn grid_and_exports_follow_allocation() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut session = session(&store).await;
        let backend = StubBackend {
            generate: Mutex::new(Some(Ok(answer()))),
            ..StubBackend::default()
        };
        assert!(session.export_remote(&backend, "grade").await.is_err());

        session.generate(&backend).await.unwrap();
        let grid = session.grid().unwrap();
        assert_eq!(grid.placed(), 2);
        let matrix = session.exporter().unwrap().matrix();
        assert_eq!(matrix.table.rows[0][1], "Calc I");

        let locations = session
            .export_remote(&backend, &session.export_prefix("grade"))
            .await
            .unwrap();
        assert_eq!(locations.csv_path.as_deref(), Some("/out/grade.csv"));
    }

    #[tokio::test]
    async fn reset_clears_store_and_state() {
        let store = Arc::new(InMemorySnapshotStore::new());
        let mut session = session(&store).await;
        session.add_discipline(Discipline::new("A")).await.unwrap();
        session.reset().await.unwrap();
        assert!(session.disciplines().is_empty());
        assert!(store.current().await.is_none());
    }

    #[tokio::test]
    async fn corrupt_snapshot_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = Arc::new(crate::FileSnapshotStore::new(&path));
        let session = WizardSession::open(store, ScheduleConfig::default()).await;
        assert_eq!(session.snapshot(), &WizardSnapshot::default());
    }
}
