//! SolverBackend trait: the seam to the external timetable service.
//!
//! The service owns the optimization, the restriction datasets on disk and
//! the durable CSV/XLSX writer. The wizard only talks to it through this
//! trait, so the CLI and the tests can swap in a scripted backend.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::discipline::Discipline;
use crate::error::SolverError;
use crate::restriction::Restriction;
use crate::schedule::{Allocation, AllocationResult, ScheduleConfig};

/// Body of a generate call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub config: ScheduleConfig,

    #[serde(rename = "disciplinas", alias = "disciplines", default)]
    pub disciplines: Vec<Discipline>,

    #[serde(rename = "restricoes", alias = "restrictions", default)]
    pub restrictions: Vec<Restriction>,
}

/// Body of an export call. The backend writes the files on its side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(rename = "prefixo", alias = "prefix")]
    pub prefix: String,

    #[serde(rename = "alocacao", alias = "allocation")]
    pub allocation: Allocation,

    #[serde(rename = "horarios", alias = "blockLabels", default)]
    pub block_labels: BTreeMap<u32, String>,

    #[serde(rename = "nome_exibicao", alias = "displayName", default)]
    pub display_name: HashMap<String, String>,
}

impl ExportRequest {
    /// Export of a full result under `prefix`.
    pub fn from_result(prefix: impl Into<String>, result: &AllocationResult) -> Self {
        Self {
            prefix: prefix.into(),
            allocation: result.allocation.clone(),
            block_labels: result.block_labels.clone(),
            display_name: result.display_name.clone(),
        }
    }
}

/// Where the backend put the exported files. Paths are relative to `base`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportLocations {
    #[serde(rename = "csv", alias = "csvPath", default)]
    pub csv_path: Option<String>,

    #[serde(rename = "xlsx", alias = "xlsxPath", default)]
    pub xlsx_path: Option<String>,

    #[serde(default)]
    pub base: Option<String>,

    /// Directory the backend reports having written into.
    #[serde(rename = "salvo_em", alias = "savedIn", default)]
    pub saved_in: Option<String>,
}

/// A bundled dataset as the backend sends it: raw records that still need
/// alias normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(rename = "nome", alias = "name", default)]
    pub name: String,

    #[serde(rename = "disciplinas", alias = "disciplines", default)]
    pub disciplines: Vec<serde_json::Value>,

    #[serde(rename = "restricoes", alias = "restrictions", default)]
    pub restrictions: Vec<serde_json::Value>,
}

/// The core SolverBackend trait.
///
/// Implementations: HTTP (the real service), scripted (tests).
#[async_trait]
pub trait SolverBackend: Send + Sync {
    /// Backend name for logs and `status` (e.g. "http").
    fn name(&self) -> &str;

    /// Solve one timetable problem.
    async fn generate_schedule(
        &self,
        request: &ScheduleRequest,
    ) -> std::result::Result<AllocationResult, SolverError>;

    /// Names of the restriction files the backend can import.
    async fn list_restriction_files(&self) -> std::result::Result<Vec<String>, SolverError>;

    /// Parse the named files and return their records unnormalized.
    async fn import_restriction_files(
        &self,
        files: &[String],
    ) -> std::result::Result<Vec<serde_json::Value>, SolverError>;

    /// Have the backend write CSV/XLSX files for an allocation.
    async fn export_schedule(
        &self,
        request: &ExportRequest,
    ) -> std::result::Result<ExportLocations, SolverError>;

    /// Names of the bundled datasets.
    async fn list_datasets(&self) -> std::result::Result<Vec<String>, SolverError>;

    async fn load_dataset(&self, name: &str) -> std::result::Result<Dataset, SolverError>;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> std::result::Result<bool, SolverError>;
}
