//! `classgrid onboard`: First-time setup.

use classgrid_config::AppConfig;

use super::CmdResult;

pub async fn run() -> CmdResult {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();

    println!("🗓️  classgrid — First-Time Setup");
    println!("================================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        let default_toml = AppConfig::default_toml();
        std::fs::write(&config_path, &default_toml)?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Point [solver] base_url at your solver service");
        println!("   2. Run: classgrid setup --days 5 --blocks 4");
        println!("   3. Add disciplines or run: classgrid dataset list\n");
    }

    println!("🎉 Setup complete! Run `classgrid doctor` to check the solver.\n");

    Ok(())
}
