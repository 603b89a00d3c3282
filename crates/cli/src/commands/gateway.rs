//! `tradewind gateway` — Start the HTTP API server.

use std::sync::Arc;

use tradewind_agent::AzureAgent;
use tradewind_chat::ChatService;
use tradewind_config::AppConfig;
use tradewind_store::FileStore;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    let agent = AzureAgent::from_config(&config.agent).map_err(|e| {
        format!("Agent not configured: {e} — set TRADEWIND_API_KEY or run `tradewind onboard`")
    })?;
    let store = FileStore::new(config.storage.root.clone());
    let chat = Arc::new(ChatService::new(Arc::new(store), Arc::new(agent)));

    println!("🌬️  Tradewind Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Storage:   {}", config.storage.root.display());
    println!("   Agent:     azure ({})", config.agent.deployment);

    tradewind_gateway::start(config, chat).await?;

    Ok(())
}
