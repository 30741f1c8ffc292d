//! `classgrid export`: Write the timetable as CSV, or have the solver export it.

use std::path::{Path, PathBuf};

use classgrid_config::AppConfig;
use classgrid_core::{CsvTable, TabularExporter};
use classgrid_session::WizardSession;

use super::{CmdResult, load_config, open_session, report, solver};

const NO_TIMETABLE: &str = "no timetable generated yet, run `classgrid generate` first";

fn default_output(config: &AppConfig, session: &WizardSession, kind: &str) -> PathBuf {
    let prefix = session.export_prefix(&config.export.default_prefix);
    config.export.output_dir.join(format!("{prefix}_{kind}.csv"))
}

fn write(table: &CsvTable, path: &Path) -> CmdResult {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    table
        .to_file(path)
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    println!(
        "📄 Wrote {} row(s) to {}",
        table.rows.len(),
        path.display()
    );
    Ok(())
}

fn exporter(session: &WizardSession) -> Result<TabularExporter<'_>, Box<dyn std::error::Error>> {
    session.exporter().ok_or_else(|| NO_TIMETABLE.into())
}

pub async fn matrix(output: Option<PathBuf>) -> CmdResult {
    let config = load_config()?;
    let session = open_session(&config).await;
    let export = exporter(&session)?.matrix();

    let path = output.unwrap_or_else(|| default_output(&config, &session, "matrix"));
    write(&export.table, &path)?;

    for c in &export.collisions {
        println!(
            "   ⚠️  Block {} holds '{}'; '{}' left out of the matrix",
            c.block, c.kept, c.discarded
        );
    }
    Ok(())
}

pub async fn list(output: Option<PathBuf>) -> CmdResult {
    let config = load_config()?;
    let session = open_session(&config).await;
    let table = exporter(&session)?.list();

    let path = output.unwrap_or_else(|| default_output(&config, &session, "list"));
    write(&table, &path)
}

pub async fn remote(prefix: Option<String>) -> CmdResult {
    let config = load_config()?;
    let backend = solver(&config)?;
    let session = open_session(&config).await;

    let prefix = prefix
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| session.export_prefix(&config.export.default_prefix));

    let locations = match session.export_remote(&backend, &prefix).await {
        Ok(locations) => locations,
        Err(e) => return Err(report(e)),
    };

    println!("📦 Solver exported '{prefix}'");
    if let Some(csv) = &locations.csv_path {
        println!("   CSV:  {}", config.solver.resolve_url(csv));
    }
    if let Some(xlsx) = &locations.xlsx_path {
        println!("   XLSX: {}", config.solver.resolve_url(xlsx));
    }
    if let Some(dir) = &locations.saved_in {
        println!("   Saved in: {dir}");
    }
    Ok(())
}
