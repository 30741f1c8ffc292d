//! `classgrid discipline`: Register disciplines.

use classgrid_core::Discipline;

use super::{CmdResult, load_config, open_session};

pub async fn add(name: &str, professor: &str, semester: &str) -> CmdResult {
    let config = load_config()?;
    let mut session = open_session(&config).await;

    session
        .add_discipline(
            Discipline::new(name)
                .with_professor(professor)
                .with_semester(semester),
        )
        .await?;

    println!(
        "✅ Added discipline ({} registered)",
        session.disciplines().len()
    );
    Ok(())
}

pub async fn list() -> CmdResult {
    let config = load_config()?;
    let session = open_session(&config).await;
    let disciplines = session.disciplines();

    println!("📚 Disciplines ({})", disciplines.len());
    if disciplines.is_empty() {
        println!("   None registered. Use `classgrid discipline add` or `classgrid dataset load`.");
        return Ok(());
    }

    for (i, d) in disciplines.iter().enumerate() {
        let mut line = format!("  {:>3}. {}", i + 1, d.name);
        if !d.professor.is_empty() {
            line.push_str(&format!(" / {}", d.professor));
        }
        if !d.semester.is_empty() {
            line.push_str(&format!(" / {}", d.semester));
        }
        println!("{line}");
    }
    Ok(())
}

/// `index` is 1-based, as printed by `list`.
pub async fn remove(index: usize) -> CmdResult {
    let config = load_config()?;
    let mut session = open_session(&config).await;

    match session.remove_discipline(index.wrapping_sub(1)).await? {
        Some(d) => println!("🗑️  Removed {}", d.name),
        None => println!("   No discipline at position {index}"),
    }
    Ok(())
}

pub async fn clear() -> CmdResult {
    let config = load_config()?;
    let mut session = open_session(&config).await;
    let count = session.disciplines().len();
    session.clear_disciplines().await?;
    println!("🗑️  Removed {count} discipline(s)");
    Ok(())
}
