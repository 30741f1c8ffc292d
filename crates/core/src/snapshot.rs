//! Wizard snapshot: everything a session needs to resume.
//!
//! A snapshot is always written and read whole. Stores never merge.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::discipline::Discipline;
use crate::error::SnapshotError;
use crate::restriction::Restriction;
use crate::schedule::{AllocationResult, ScheduleConfig};

/// Wizard step the user was on. Purely informational for the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Setup,
    Disciplines,
    Restrictions,
    Generate,
    Review,
}

impl WizardStep {
    /// Position in the wizard, starting at 1.
    pub fn number(&self) -> u8 {
        match self {
            Self::Setup => 1,
            Self::Disciplines => 2,
            Self::Restrictions => 3,
            Self::Generate => 4,
            Self::Review => 5,
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::Disciplines => "disciplines",
            Self::Restrictions => "restrictions",
            Self::Generate => "generate",
            Self::Review => "review",
        };
        write!(f, "{} ({})", name, self.number())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    #[serde(default)]
    pub step: WizardStep,

    #[serde(default)]
    pub config: ScheduleConfig,

    #[serde(default)]
    pub disciplines: Vec<Discipline>,

    #[serde(default)]
    pub restrictions: Vec<Restriction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_result: Option<AllocationResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_dataset_name: Option<String>,

    /// Set by the store on every save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl WizardSnapshot {
    /// Fresh snapshot seeded with a schedule configuration.
    pub fn with_config(config: ScheduleConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }
}

/// Persistence for the wizard snapshot.
///
/// Implementations: JSON file, in-memory (for testing).
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// The store name (e.g., "file", "memory").
    fn name(&self) -> &str;

    /// Last saved snapshot, or `None` when nothing was saved yet.
    async fn load(&self) -> std::result::Result<Option<WizardSnapshot>, SnapshotError>;

    /// Replace the stored snapshot.
    async fn save(&self, snapshot: &WizardSnapshot) -> std::result::Result<(), SnapshotError>;

    async fn clear(&self) -> std::result::Result<(), SnapshotError>;
}
