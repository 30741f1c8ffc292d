//! `classgrid generate`: Ask the solver for an allocation.

use super::{CmdResult, load_config, open_session, report, solver};

pub async fn run() -> CmdResult {
    let config = load_config()?;
    let backend = solver(&config)?;
    let mut session = open_session(&config).await;

    if session.disciplines().is_empty() {
        println!("  ⚠️  No disciplines registered; the solver will likely reject the request");
    }
    println!(
        "⏳ Generating timetable for {} disciplines and {} restrictions...",
        session.disciplines().len(),
        session.restrictions().len()
    );

    let result = match session.generate(&backend).await {
        Ok(result) => result.clone(),
        Err(e) => return Err(report(e)),
    };

    println!("✅ Timetable generated");
    println!("   Allocated:   {}", result.allocation.len());
    println!(
        "   Used blocks: {}/{}",
        result.stats.used_blocks, result.stats.total_blocks
    );
    println!("   Imbalance:   {}", result.stats.imbalance);

    if let Some(grid) = session.grid() {
        if !grid.unplaceable.is_empty() {
            println!(
                "   ⚠️  {} discipline(s) fall outside the grid",
                grid.unplaceable.len()
            );
        }
    }

    if let Some(logs) = result.logs.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        println!("\n   Solver log:");
        for line in logs.lines() {
            println!("   │ {line}");
        }
    }

    println!("\n   Next: classgrid grid");
    Ok(())
}
