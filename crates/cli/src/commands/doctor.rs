//! `classgrid doctor`: Diagnose configuration, session and solver health.

use classgrid_config::AppConfig;
use classgrid_core::{SnapshotStore, SolverBackend};
use classgrid_session::FileSnapshotStore;
use classgrid_solver::HttpSolver;

use super::CmdResult;

pub async fn run() -> CmdResult {
    println!("🩺 classgrid Doctor — System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    if !AppConfig::config_path().exists() {
        println!("  ⚠️  No config file, using defaults. Run `classgrid onboard`");
        issues += 1;
    }
    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config file invalid: {e}");
            println!("\n  ⚠️  {} issue(s) found. See above for details.", issues + 1);
            return Ok(());
        }
    };

    // Session snapshot
    let store = FileSnapshotStore::new(config.snapshot_path());
    match store.load().await {
        Ok(Some(snapshot)) => println!(
            "  ✅ Session readable ({} disciplines, step {})",
            snapshot.disciplines.len(),
            snapshot.step
        ),
        Ok(None) => println!("  ✅ No saved session yet"),
        Err(e) => {
            println!("  ❌ Session unreadable: {e}. Run `classgrid reset`");
            issues += 1;
        }
    }

    // Solver service
    match HttpSolver::from_config(&config.solver) {
        Ok(solver) => match solver.health_check().await {
            Ok(true) => println!("  ✅ Solver reachable at {}", solver.base_url()),
            Ok(false) => {
                println!("  ❌ Solver at {} reports unhealthy", solver.base_url());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Solver unreachable: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Solver not configured: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
