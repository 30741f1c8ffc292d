//! `classgrid restriction`: Add, import and review restrictions.

use classgrid_core::{
    ImportMode, RestrictionFilter, RestrictionKind, RestrictionSummary, SolverBackend, group_by_kind,
};

use super::{CmdResult, load_config, open_session, report, solver};

pub async fn add_fixed(discipline: &str, block: u32) -> CmdResult {
    let config = load_config()?;
    let mut session = open_session(&config).await;

    if !session.disciplines().iter().any(|d| d.name == discipline.trim()) {
        println!("   ⚠️  '{discipline}' is not a registered discipline");
    }
    session.add_fixed_restriction(discipline, block).await?;
    println!("📌 {discipline} fixed to block {block}");
    Ok(())
}

pub async fn list(kind: Option<&str>, origin: Option<String>) -> CmdResult {
    let config = load_config()?;
    let session = open_session(&config).await;

    let kind = kind
        .map(|k| {
            RestrictionKind::parse(k).ok_or_else(|| {
                let known: Vec<_> = RestrictionKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown restriction kind '{k}' (expected one of {})", known.join(", "))
            })
        })
        .transpose()?;
    let filter = RestrictionFilter { kind, origin };

    let groups = group_by_kind(session.restrictions(), &filter);
    if groups.is_empty() {
        println!("   No restrictions match.");
        return Ok(());
    }

    for group in groups {
        println!("{} ({})", group.kind.title(), group.rows.len());
        println!("  {}", group.header);
        for row in &group.rows {
            println!("  {row}");
        }
        println!();
    }
    Ok(())
}

/// `index` is 1-based.
pub async fn remove(index: usize) -> CmdResult {
    let config = load_config()?;
    let mut session = open_session(&config).await;

    match session.remove_restriction(index.wrapping_sub(1)).await? {
        Some(r) => println!("🗑️  Removed {} restriction", r.kind()),
        None => println!("   No restriction at position {index}"),
    }
    Ok(())
}

pub async fn files() -> CmdResult {
    let config = load_config()?;
    let backend = solver(&config)?;
    let files = backend.list_restriction_files().await?;

    println!("📂 Restriction files ({})", files.len());
    for f in &files {
        println!("   - {f}");
    }
    Ok(())
}

pub async fn import(files: &[String], merge: bool) -> CmdResult {
    let config = load_config()?;
    let backend = solver(&config)?;
    let mut session = open_session(&config).await;
    let mode = if merge {
        ImportMode::Merge
    } else {
        ImportMode::Replace
    };

    let outcome = match session.import_restrictions(&backend, files, mode).await {
        Ok(outcome) => outcome,
        Err(e) => return Err(report(e)),
    };

    println!(
        "📥 Imported {} file(s) ({mode}): {} new, {} overwritten, {} total",
        files.len(),
        outcome.appended,
        outcome.replaced,
        outcome.restrictions.len()
    );
    Ok(())
}

pub async fn summary() -> CmdResult {
    let config = load_config()?;
    let session = open_session(&config).await;
    let summary = RestrictionSummary::of(session.restrictions());

    println!("📋 Restrictions: {}", summary.total);
    if summary.total > 0 {
        println!("   {}", summary.line());
    }
    if !summary.origins.is_empty() {
        println!("   Origins: {}", summary.origins.join(", "));
    }
    Ok(())
}
