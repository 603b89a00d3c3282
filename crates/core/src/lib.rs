//! # Tradewind Core
//!
//! Domain types, traits, and error definitions for the Tradewind conversation
//! backend. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two subsystems with real collaborators — conversation persistence and
//! the stateless LLM agent — are defined as traits here. Implementations live
//! in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod agent;
pub mod error;
pub mod message;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentReply, StrategyAgent, StructuredAnswer};
pub use error::{AgentError, Error, Result, StoreError};
pub use message::{
    Conversation, ConversationId, ConversationSummary, Message, MessageMetadata, Role,
};
pub use store::ConversationStore;
