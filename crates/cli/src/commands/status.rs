//! `tradewind status` — Show system status.

use tradewind_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🌬️  Tradewind Status");
    println!("==================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Storage:      {}", config.storage.root.display());
    println!("  Agent:        azure ({})", config.agent.deployment);
    println!("  Model:        {}", config.agent.model);
    println!("  Temperature:  {}", config.agent.temperature);
    println!("  Timeout:      {}s", config.agent.timeout_secs);
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!(
        "  API key:      {}",
        if config.has_api_key() { "configured" } else { "missing" }
    );

    // Storage stats: owners and conversation records on disk
    if config.storage.root.exists() {
        let mut owners = 0usize;
        let mut records = 0usize;
        for entry in std::fs::read_dir(&config.storage.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                owners += 1;
                records += std::fs::read_dir(entry.path())?
                    .filter_map(|e| e.ok())
                    .filter(|e| {
                        e.path().extension().and_then(|x| x.to_str()) == Some("json")
                    })
                    .count();
            }
        }
        println!("  Stored:       {records} conversations across {owners} owners");
    } else {
        println!("  Stored:       (storage directory not created yet)");
    }

    // Check config file existence
    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `tradewind onboard` first");
    }

    Ok(())
}
