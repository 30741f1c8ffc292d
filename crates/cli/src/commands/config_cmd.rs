//! `classgrid config`: Configuration management commands.

use classgrid_config::AppConfig;

use super::{CmdResult, Reported, load_config};

pub async fn validate() -> CmdResult {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if config.solver.base_url.starts_with("http://")
                && !is_local(&config.solver.base_url)
            {
                warnings.push("Solver URL uses plain http to a remote host");
            }

            if config.solver.timeout_secs < 10 {
                warnings.push("Solver timeout below 10s; large timetables may not finish");
            }

            if !config.export.output_dir.exists() {
                warnings.push("export.output_dir does not exist yet");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Solver:    {}", config.solver.base_url);
            println!(
                "   Wizard:    {} days × {} blocks",
                config.wizard.days_per_week, config.wizard.blocks_per_day
            );
            println!("   Snapshot:  {}", config.snapshot_path().display());
            println!("   Exports:   {}", config.export.output_dir.display());
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(Box::new(Reported));
        }
    }

    Ok(())
}

fn is_local(url: &str) -> bool {
    let host = url
        .trim_start_matches("http://")
        .split(['/', ':'])
        .next()
        .unwrap_or("");
    matches!(host, "localhost" | "127.0.0.1")
}

pub async fn show() -> CmdResult {
    let config = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> CmdResult {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}
