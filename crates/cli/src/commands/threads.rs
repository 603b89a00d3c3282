//! `tradewind threads` — Thread management from the command line.
//!
//! Operates on the file store directly; useful for inspecting what the
//! gateway has persisted without going through HTTP.

use clap::Subcommand;

use tradewind_config::AppConfig;
use tradewind_core::message::ConversationId;
use tradewind_core::store::ConversationStore;
use tradewind_store::FileStore;

#[derive(Subcommand)]
pub enum ThreadsAction {
    /// List all threads for an owner
    List {
        /// Owner (user UUID) to list threads for
        #[arg(short, long)]
        owner: String,
    },

    /// Show one thread in full
    Show {
        #[arg(short, long)]
        owner: String,
        /// Conversation ID
        id: String,
    },

    /// Rename a thread
    Rename {
        #[arg(short, long)]
        owner: String,
        /// Conversation ID
        id: String,
        /// The new thread name
        new_name: String,
    },

    /// Delete a thread
    Delete {
        #[arg(short, long)]
        owner: String,
        /// Conversation ID
        id: String,
    },
}

pub async fn run(action: ThreadsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = FileStore::new(config.storage.root);

    match action {
        ThreadsAction::List { owner } => {
            let threads = store.list(&owner).await?;
            if threads.is_empty() {
                println!("   No threads stored for {owner}.");
                return Ok(());
            }
            println!("💬 Threads for {owner}");
            println!("====================");
            for t in threads {
                println!(
                    "  {}  {:<40}  {} messages, {} tokens, ${:.4}",
                    t.conversation_id, t.thread_name, t.message_count, t.total_tokens, t.total_cost
                );
                println!("      updated: {}", t.updated_at.format("%Y-%m-%d %H:%M:%S"));
            }
        }
        ThreadsAction::Show { owner, id } => {
            match store.load(&owner, &ConversationId::from(&id)).await? {
                Some(conversation) => {
                    println!("{}", serde_json::to_string_pretty(&conversation)?);
                }
                None => println!("   Thread {id} not found for {owner}."),
            }
        }
        ThreadsAction::Rename { owner, id, new_name } => {
            if store
                .rename(&owner, &ConversationId::from(&id), &new_name)
                .await?
            {
                println!("✅ Renamed {id} to \"{new_name}\"");
            } else {
                println!("   Thread {id} not found for {owner}.");
            }
        }
        ThreadsAction::Delete { owner, id } => {
            if store.delete(&owner, &ConversationId::from(&id)).await? {
                println!("✅ Deleted {id}");
            } else {
                println!("   Thread {id} not found for {owner}.");
            }
        }
    }

    Ok(())
}
