//! ConversationStore trait — durable CRUD for conversation records.
//!
//! The store is the only shared mutable resource in the system. Every record
//! is addressed by `(owner_id, conversation_id)`; reads report a missing
//! record as a value, mutations raise `StoreError::NotFound`.
//!
//! Implementations: file-backed (durable, one JSON file per conversation),
//! in-memory (tests, ephemeral sessions).

use async_trait::async_trait;

use crate::error::StoreError;
use crate::message::{Conversation, ConversationId, ConversationSummary, Message};

/// The core ConversationStore trait.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// The backend name (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// Create a new empty conversation and return its ID.
    ///
    /// If `thread_name` is absent, a name is synthesized from the current
    /// timestamp. The generated ID never collides with an existing one.
    async fn create(
        &self,
        owner_id: &str,
        thread_name: Option<String>,
    ) -> std::result::Result<ConversationId, StoreError>;

    /// List all conversations owned by `owner_id`, most recently updated
    /// first. A malformed record is skipped, not fatal to the listing.
    async fn list(
        &self,
        owner_id: &str,
    ) -> std::result::Result<Vec<ConversationSummary>, StoreError>;

    /// Load the full record, or `None` if it does not exist.
    async fn load(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
    ) -> std::result::Result<Option<Conversation>, StoreError>;

    /// Append a message as a single logical load-mutate-persist step.
    ///
    /// Stamps the message timestamp if missing, folds usage metadata into the
    /// running totals, and refreshes `updated_at`. Fails with
    /// `StoreError::NotFound` if the conversation does not exist.
    async fn append(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
        message: Message,
    ) -> std::result::Result<(), StoreError>;

    /// Rename a conversation. Returns `false` if it does not exist.
    async fn rename(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
        new_name: &str,
    ) -> std::result::Result<bool, StoreError>;

    /// Delete a conversation, irreversibly. Returns `false` if it does not
    /// exist.
    async fn delete(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
    ) -> std::result::Result<bool, StoreError>;
}
