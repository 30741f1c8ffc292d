//! `classgrid reset`: Forget the current session.

use super::{CmdResult, load_config, open_session};

pub async fn run() -> CmdResult {
    let config = load_config()?;
    let mut session = open_session(&config).await;
    session.reset().await?;
    println!("🧹 Session cleared ({})", config.snapshot_path().display());
    Ok(())
}
