//! Subcommand implementations and the helpers they share.

pub mod config_cmd;
pub mod dataset;
pub mod discipline;
pub mod doctor;
pub mod export;
pub mod generate;
pub mod grid;
pub mod onboard;
pub mod reset;
pub mod restriction;
pub mod setup;
pub mod status;

use std::sync::Arc;

use classgrid_config::AppConfig;
use classgrid_core::{Error, SolverError};
use classgrid_session::{FileSnapshotStore, WizardSession};
use classgrid_solver::HttpSolver;
use tracing::debug;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Session backed by the configured snapshot file.
pub async fn open_session(config: &AppConfig) -> WizardSession {
    let path = config.snapshot_path();
    debug!(path = %path.display(), "Opening wizard session");
    let store = Arc::new(FileSnapshotStore::new(path));
    WizardSession::open(store, config.wizard.schedule_config()).await
}

pub fn solver(config: &AppConfig) -> Result<HttpSolver, Box<dyn std::error::Error>> {
    Ok(HttpSolver::from_config(&config.solver)?)
}

/// An error already shown to the user; `main` only sets the exit status.
#[derive(Debug)]
pub struct Reported;

impl std::fmt::Display for Reported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("error already reported")
    }
}

impl std::error::Error for Reported {}

/// Print `err` and turn it into [`Reported`].
pub fn report(err: Error) -> Box<dyn std::error::Error> {
    print_error(&err);
    Box::new(Reported)
}

/// Print a solver failure the way the wizard shows it: field by field for
/// validation errors, one line otherwise.
fn print_error(err: &Error) {
    match err {
        Error::Solver(SolverError::Validation(issues)) => {
            println!("  ❌ The solver rejected the input:");
            for issue in issues {
                println!("     - {issue}");
            }
        }
        other => println!("  ❌ {other}"),
    }
}
