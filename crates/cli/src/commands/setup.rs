//! `classgrid setup`: Timetable shape and conflict rules.

use super::{CmdResult, load_config, open_session};

/// Values given on the command line; `None` keeps the current setting.
pub struct SetupArgs {
    pub days: Option<u32>,
    pub blocks: Option<u32>,
    pub conflict_by_professor: Option<bool>,
    pub conflict_by_semester: Option<bool>,
}

pub async fn run(args: SetupArgs) -> CmdResult {
    let config = load_config()?;
    let mut session = open_session(&config).await;

    let mut schedule = session.config().clone();
    if let Some(days) = args.days {
        schedule.days_per_week = days;
    }
    if let Some(blocks) = args.blocks {
        schedule.blocks_per_day = blocks;
    }
    if let Some(flag) = args.conflict_by_professor {
        schedule.conflict_by_professor = flag;
    }
    if let Some(flag) = args.conflict_by_semester {
        schedule.conflict_by_semester = flag;
    }

    session.configure(schedule).await?;
    let schedule = session.config();

    println!("⚙️  Timetable configured");
    println!("   Days per week:          {}", schedule.days_per_week);
    println!("   Blocks per day:         {}", schedule.blocks_per_day);
    println!("   Total blocks:           {}", schedule.total_blocks());
    println!("   Professor conflicts:    {}", on_off(schedule.conflict_by_professor));
    println!("   Semester conflicts:     {}", on_off(schedule.conflict_by_semester));
    println!("\n   Next: classgrid discipline add <name>");

    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}
