//! classgrid CLI: the main entry point.
//!
//! Commands follow the wizard's steps:
//! - `setup`: Days per week, blocks per day, conflict rules
//! - `discipline`: Register disciplines
//! - `restriction`: Add, import and review restrictions
//! - `dataset`: Load a bundled dataset from the solver
//! - `generate`: Ask the solver for an allocation
//! - `grid`: Show the weekly grid
//! - `export`: Write the matrix/list CSV, or have the solver export
//!
//! Plus `onboard`, `status`, `config`, `doctor` and `reset`.

use clap::{Parser, Subcommand};

mod commands;
mod render;

#[derive(Parser)]
#[command(
    name = "classgrid",
    about = "classgrid — weekly class timetable wizard",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration directory and config file
    Onboard,

    /// Show configuration and session status
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Configure the timetable (step 1)
    Setup {
        /// Days per week (1-7)
        #[arg(short, long)]
        days: Option<u32>,

        /// Blocks per day
        #[arg(short, long)]
        blocks: Option<u32>,

        /// Disciplines sharing a professor may not share a block
        #[arg(long)]
        conflict_by_professor: Option<bool>,

        /// Disciplines of the same semester may not share a block
        #[arg(long)]
        conflict_by_semester: Option<bool>,
    },

    /// Manage disciplines (step 2)
    Discipline {
        #[command(subcommand)]
        action: DisciplineAction,
    },

    /// Manage restrictions (step 3)
    Restriction {
        #[command(subcommand)]
        action: RestrictionAction,
    },

    /// Bundled datasets served by the solver
    Dataset {
        #[command(subcommand)]
        action: DatasetAction,
    },

    /// Generate the timetable (step 4)
    Generate,

    /// Show the weekly grid of the last generated timetable
    Grid,

    /// Export the last generated timetable
    Export {
        #[command(subcommand)]
        action: ExportAction,
    },

    /// Diagnose configuration, session and solver health
    Doctor,

    /// Forget the current session
    Reset,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Validate the config file
    Validate,
    /// Print the config file path
    Path,
}

#[derive(Subcommand)]
enum DisciplineAction {
    /// Register a discipline
    Add {
        name: String,

        /// Professors, e.g. "Silva|Santos"
        #[arg(short, long, default_value = "")]
        professor: String,

        #[arg(short, long, default_value = "")]
        semester: String,
    },
    /// List registered disciplines
    List,
    /// Remove a discipline by its position in `list`
    Remove { index: usize },
    /// Remove all disciplines
    Clear,
}

#[derive(Subcommand)]
enum RestrictionAction {
    /// Pin a discipline to a block
    AddFixed { discipline: String, block: u32 },
    /// List restrictions grouped by kind
    List {
        /// Only this kind (fixed, fixedDay, noOverlap, sameBlock, sameTime)
        #[arg(short, long)]
        kind: Option<String>,

        /// Only this origin (file name, "manual", "imported")
        #[arg(short, long)]
        origin: Option<String>,
    },
    /// Remove a restriction by its position in the session
    Remove { index: usize },
    /// List restriction files the solver can import
    Files,
    /// Import restriction files from the solver
    Import {
        #[arg(required = true)]
        files: Vec<String>,

        /// Merge with the current list instead of replacing it
        #[arg(short, long)]
        merge: bool,
    },
    /// Count restrictions per kind and origin
    Summary,
}

#[derive(Subcommand)]
enum DatasetAction {
    /// List datasets the solver offers
    List,
    /// Replace disciplines and restrictions with a dataset
    Load { name: String },
}

#[derive(Subcommand)]
enum ExportAction {
    /// Day-by-time matrix as CSV
    Matrix {
        /// Output file (default: <output_dir>/<prefix>_matrix.csv)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
    /// One row per discipline as CSV
    List {
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
    /// Have the solver write CSV/XLSX files on its side
    Remote {
        /// File prefix (default: dataset name, then export.default_prefix)
        #[arg(short, long)]
        prefix: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli.command).await {
        if !e.is::<commands::Reported>() {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Status => commands::status::run().await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
        Commands::Setup {
            days,
            blocks,
            conflict_by_professor,
            conflict_by_semester,
        } => {
            commands::setup::run(commands::setup::SetupArgs {
                days,
                blocks,
                conflict_by_professor,
                conflict_by_semester,
            })
            .await?
        }
        Commands::Discipline { action } => match action {
            DisciplineAction::Add {
                name,
                professor,
                semester,
            } => commands::discipline::add(&name, &professor, &semester).await?,
            DisciplineAction::List => commands::discipline::list().await?,
            DisciplineAction::Remove { index } => commands::discipline::remove(index).await?,
            DisciplineAction::Clear => commands::discipline::clear().await?,
        },
        Commands::Restriction { action } => match action {
            RestrictionAction::AddFixed { discipline, block } => {
                commands::restriction::add_fixed(&discipline, block).await?
            }
            RestrictionAction::List { kind, origin } => {
                commands::restriction::list(kind.as_deref(), origin).await?
            }
            RestrictionAction::Remove { index } => commands::restriction::remove(index).await?,
            RestrictionAction::Files => commands::restriction::files().await?,
            RestrictionAction::Import { files, merge } => {
                commands::restriction::import(&files, merge).await?
            }
            RestrictionAction::Summary => commands::restriction::summary().await?,
        },
        Commands::Dataset { action } => match action {
            DatasetAction::List => commands::dataset::list().await?,
            DatasetAction::Load { name } => commands::dataset::load(&name).await?,
        },
        Commands::Generate => commands::generate::run().await?,
        Commands::Grid => commands::grid::run().await?,
        Commands::Export { action } => match action {
            ExportAction::Matrix { output } => commands::export::matrix(output).await?,
            ExportAction::List { output } => commands::export::list(output).await?,
            ExportAction::Remote { prefix } => commands::export::remote(prefix).await?,
        },
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Reset => commands::reset::run().await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn import_parses_merge_flag() {
        let cli = Cli::parse_from(["classgrid", "restriction", "import", "a.csv", "b.csv", "--merge"]);
        match cli.command {
            Commands::Restriction {
                action: RestrictionAction::Import { files, merge },
            } => {
                assert_eq!(files, ["a.csv", "b.csv"]);
                assert!(merge);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn setup_accepts_boolean_flags() {
        let cli = Cli::parse_from([
            "classgrid",
            "setup",
            "--days",
            "6",
            "--conflict-by-semester",
            "false",
        ]);
        match cli.command {
            Commands::Setup {
                days,
                blocks,
                conflict_by_semester,
                ..
            } => {
                assert_eq!(days, Some(6));
                assert_eq!(blocks, None);
                assert_eq!(conflict_by_semester, Some(false));
            }
            _ => panic!("wrong command"),
        }
    }
}
