//! `classgrid grid`: Show the weekly grid.

use super::{CmdResult, load_config, open_session};
use crate::render;

pub async fn run() -> CmdResult {
    let config = load_config()?;
    let session = open_session(&config).await;

    match session.grid() {
        Some(grid) => println!("{}", render::grid(&grid)),
        None => println!("   No timetable yet. Run `classgrid generate` first."),
    }
    Ok(())
}
