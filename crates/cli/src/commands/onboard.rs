//! `tradewind onboard` — First-time setup.

use tradewind_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🌬️  Tradewind — First-Time Setup");
    println!("================================\n");

    // Create directories
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    let storage_root = AppConfig::default().storage.root;
    if !storage_root.exists() {
        std::fs::create_dir_all(&storage_root)?;
        println!("✅ Created storage directory: {}", storage_root.display());
    }

    // Create config file
    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        let default_toml = AppConfig::default_toml();
        std::fs::write(&config_path, &default_toml)?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Set TRADEWIND_API_KEY (or edit {})", config_path.display());
        println!("   2. Point agent.endpoint at your Azure OpenAI resource");
        println!("   3. Run: tradewind gateway\n");
    }

    println!("🎉 Setup complete! Run `tradewind gateway` to start serving.\n");

    Ok(())
}
