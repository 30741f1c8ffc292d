//! `classgrid status`: Show configuration and session status.

use classgrid_config::AppConfig;

use super::{CmdResult, load_config, open_session};

pub async fn run() -> CmdResult {
    let config = load_config()?;
    let session = open_session(&config).await;
    let snapshot = session.snapshot();

    println!("🗓️  classgrid Status");
    println!("===================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Solver:       {}", config.solver.base_url);
    println!("  Timeout:      {}s", config.solver.timeout_secs);
    println!("  Snapshot:     {} ({})", config.snapshot_path().display(), session.store_name());
    println!();
    println!("  Step:         {}", snapshot.step);
    println!(
        "  Week:         {} days × {} blocks ({} total)",
        snapshot.config.days_per_week,
        snapshot.config.blocks_per_day,
        snapshot.config.total_blocks()
    );
    println!(
        "  Conflicts:    professor={}, semester={}",
        snapshot.config.conflict_by_professor, snapshot.config.conflict_by_semester
    );
    println!("  Disciplines:  {}", snapshot.disciplines.len());
    println!("  Restrictions: {}", snapshot.restrictions.len());
    println!(
        "  Dataset:      {}",
        session.dataset_name().unwrap_or("(none)")
    );
    match session.allocation_result() {
        Some(result) => println!(
            "  Timetable:    {} disciplines in {}/{} blocks",
            result.allocation.len(),
            result.stats.used_blocks,
            result.stats.total_blocks
        ),
        None => println!("  Timetable:    not generated"),
    }
    if let Some(saved_at) = snapshot.saved_at {
        println!("  Saved at:     {}", saved_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    if AppConfig::config_path().exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file, run `classgrid onboard` first");
    }

    Ok(())
}
