//! Tradewind CLI — the main entry point.
//!
//! Commands:
//! - `onboard`  — Initialize config & storage directories
//! - `gateway`  — Start the HTTP API server
//! - `threads`  — Inspect and manage stored conversation threads
//! - `status`   — Show system status

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "tradewind",
    about = "Tradewind — conversational trading assistant backend",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and storage directories
    Onboard,

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage stored conversation threads
    Threads {
        #[command(subcommand)]
        action: commands::threads::ThreadsAction,
    },

    /// Show system status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Threads { action } => commands::threads::run(action).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
