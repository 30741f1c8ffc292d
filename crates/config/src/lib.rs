//! Configuration loading, validation, and management for classgrid.
//!
//! Loads configuration from `~/.classgrid/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use classgrid_core::ScheduleConfig;
use classgrid_core::schedule::{MAX_BLOCKS_PER_DAY, MAX_DAYS_PER_WEEK};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.classgrid/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Solver service connection
    #[serde(default)]
    pub solver: SolverConfig,

    /// Defaults for a fresh wizard session
    #[serde(default)]
    pub wizard: WizardDefaults,

    /// Where the session snapshot lives
    #[serde(default)]
    pub session: SessionConfig,

    /// Local export settings
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Base URL of the solver service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SolverConfig {
    /// Join a backend-relative path (e.g. `/exports/grade.csv`) onto the base URL.
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardDefaults {
    #[serde(default = "default_days_per_week")]
    pub days_per_week: u32,

    #[serde(default = "default_blocks_per_day")]
    pub blocks_per_day: u32,

    #[serde(default = "default_true")]
    pub conflict_by_professor: bool,

    #[serde(default = "default_true")]
    pub conflict_by_semester: bool,
}

fn default_days_per_week() -> u32 {
    5
}
fn default_blocks_per_day() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for WizardDefaults {
    fn default() -> Self {
        Self {
            days_per_week: default_days_per_week(),
            blocks_per_day: default_blocks_per_day(),
            conflict_by_professor: true,
            conflict_by_semester: true,
        }
    }
}

impl WizardDefaults {
    /// The schedule configuration a new session starts with.
    pub fn schedule_config(&self) -> ScheduleConfig {
        ScheduleConfig {
            days_per_week: self.days_per_week,
            blocks_per_day: self.blocks_per_day,
            conflict_by_professor: self.conflict_by_professor,
            conflict_by_semester: self.conflict_by_semester,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Snapshot file; defaults to `~/.classgrid/session.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Prefix used when no dataset is loaded
    #[serde(default = "default_prefix")]
    pub default_prefix: String,

    /// Directory for local CSV downloads
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_prefix() -> String {
    "grade".into()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_prefix: default_prefix(),
            output_dir: default_output_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.classgrid/config.toml).
    ///
    /// Environment overrides:
    /// - `CLASSGRID_SOLVER_URL` replaces `solver.base_url`
    /// - `CLASSGRID_SNAPSHOT` replaces `session.snapshot_path`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CLASSGRID_SOLVER_URL") {
            self.solver.base_url = url;
        }
        if let Ok(path) = std::env::var("CLASSGRID_SNAPSHOT") {
            self.session.snapshot_path = Some(PathBuf::from(path));
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".classgrid")
    }

    /// Path of the config file `load()` reads.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Snapshot file, honoring the configured override.
    pub fn snapshot_path(&self) -> PathBuf {
        self.session
            .snapshot_path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("session.json"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let wizard = &self.wizard;
        if !(1..=MAX_DAYS_PER_WEEK).contains(&wizard.days_per_week) {
            return Err(ConfigError::ValidationError(format!(
                "wizard.days_per_week must be between 1 and {MAX_DAYS_PER_WEEK}, got {}",
                wizard.days_per_week
            )));
        }

        if !(1..=MAX_BLOCKS_PER_DAY).contains(&wizard.blocks_per_day) {
            return Err(ConfigError::ValidationError(format!(
                "wizard.blocks_per_day must be between 1 and {MAX_BLOCKS_PER_DAY}, got {}",
                wizard.blocks_per_day
            )));
        }

        if self.solver.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "solver.timeout_secs must be > 0".into(),
            ));
        }

        let url = self.solver.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "solver.base_url must start with http:// or https://, got '{url}'"
            )));
        }

        if self.export.default_prefix.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "export.default_prefix must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
