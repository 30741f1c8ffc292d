//! `classgrid dataset`: Bundled datasets served by the solver.

use classgrid_core::SolverBackend;

use super::{CmdResult, load_config, open_session, report, solver};

pub async fn list() -> CmdResult {
    let config = load_config()?;
    let backend = solver(&config)?;
    let datasets = backend.list_datasets().await?;

    println!("🗂️  Datasets ({})", datasets.len());
    if datasets.is_empty() {
        println!("   The solver offers no bundled datasets.");
    }
    for name in &datasets {
        println!("   - {name}");
    }
    Ok(())
}

pub async fn load(name: &str) -> CmdResult {
    let config = load_config()?;
    let backend = solver(&config)?;
    let mut session = open_session(&config).await;

    let summary = match session.load_dataset(&backend, name).await {
        Ok(summary) => summary,
        Err(e) => return Err(report(e)),
    };

    println!("✅ Dataset '{}' loaded", summary.name);
    println!("   Disciplines:  {}", summary.disciplines);
    if summary.skipped_disciplines > 0 {
        println!(
            "   ⚠️  {} row(s) without a discipline name were skipped",
            summary.skipped_disciplines
        );
    }
    println!("   Restrictions: {}", summary.restrictions);
    println!("   Previous timetable discarded.");
    Ok(())
}
