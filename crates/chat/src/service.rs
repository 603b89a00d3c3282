//! The chat orchestrator — turns one request into a persisted, enriched
//! response.
//!
//! `process` is the sole write path into the store and the sole caller of the
//! agent collaborator. Per call: at most one `create`, exactly two `append`s,
//! and nothing is persisted at all when the agent call fails — a failed turn
//! leaves no half-recorded exchange behind.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use tradewind_core::agent::{StrategyAgent, StructuredAnswer};
use tradewind_core::error::{Error, Result};
use tradewind_core::message::{
    Conversation, ConversationId, ConversationSummary, Message, MessageMetadata,
};
use tradewind_core::store::ConversationStore;

use crate::assembler::{ContextAssembler, NO_HISTORY_SENTINEL};
use crate::char_prefix;

/// Stored assistant content is capped to this prefix; the full structured
/// answer lives in message metadata.
const STORED_ANSWER_PREFIX_CHARS: usize = 500;
/// Thread names synthesized from a first query use this prefix length.
const THREAD_NAME_QUERY_CHARS: usize = 50;

/// The structured answer enriched with conversation bookkeeping, returned to
/// the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    #[serde(flatten)]
    pub answer: StructuredAnswer,
    pub conversation_id: ConversationId,
    pub tokens_used: u64,
    pub cost: f64,
}

/// Coordinates store, assembler, and agent for chat turns and fronts the
/// thread-management operations.
pub struct ChatService {
    store: Arc<dyn ConversationStore>,
    agent: Arc<dyn StrategyAgent>,
    assembler: ContextAssembler,
}

impl ChatService {
    /// Create a service over an injected store and agent.
    pub fn new(store: Arc<dyn ConversationStore>, agent: Arc<dyn StrategyAgent>) -> Self {
        Self {
            store,
            agent,
            assembler: ContextAssembler::new(),
        }
    }

    /// Process one chat turn. Always stores the exchange.
    pub async fn process(
        &self,
        owner_id: &str,
        query: &str,
        conversation_id: Option<ConversationId>,
    ) -> Result<ChatReply> {
        // Build context from prior turns when a conversation was supplied.
        let previous_summary = match &conversation_id {
            Some(id) => {
                let conversation = self.store.load(owner_id, id).await?;
                self.assembler.digest(conversation.as_ref())
            }
            None => NO_HISTORY_SENTINEL.to_string(),
        };

        debug!(owner = %owner_id, agent = %self.agent.name(), "Running agent turn");
        let reply = self.agent.complete(query, &previous_summary).await?;

        // Nothing has touched the store yet; a fresh thread is created only
        // after the agent answered.
        let conversation_id = match conversation_id {
            Some(id) => id,
            None => {
                let name = format!("Chat - {}...", char_prefix(query, THREAD_NAME_QUERY_CHARS));
                self.store.create(owner_id, Some(name)).await?
            }
        };

        self.store
            .append(owner_id, &conversation_id, Message::user(query))
            .await?;

        let metadata = MessageMetadata {
            tokens: Some(reply.tokens),
            cost: Some(reply.cost),
            full_response: Some(reply.answer.to_value()),
        };
        self.store
            .append(
                owner_id,
                &conversation_id,
                Message::assistant(
                    char_prefix(&reply.answer.answer, STORED_ANSWER_PREFIX_CHARS),
                    metadata,
                ),
            )
            .await?;

        info!(
            owner = %owner_id,
            conversation = %conversation_id,
            tokens = reply.tokens,
            "Chat turn stored"
        );

        Ok(ChatReply {
            answer: reply.answer,
            conversation_id,
            tokens_used: reply.tokens,
            cost: reply.cost,
        })
    }

    /// Create a new thread, optionally named.
    pub async fn create_conversation(
        &self,
        owner_id: &str,
        thread_name: Option<String>,
    ) -> Result<ConversationId> {
        Ok(self.store.create(owner_id, thread_name).await?)
    }

    /// List all threads for an owner, most recently updated first.
    pub async fn list_conversations(&self, owner_id: &str) -> Result<Vec<ConversationSummary>> {
        Ok(self.store.list(owner_id).await?)
    }

    /// Fetch one full thread.
    pub async fn get_conversation(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
    ) -> Result<Option<Conversation>> {
        Ok(self.store.load(owner_id, conversation_id).await?)
    }

    /// Rename a thread. An empty name is a caller error, checked before the
    /// store is touched.
    pub async fn rename_conversation(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
        new_name: &str,
    ) -> Result<bool> {
        if new_name.trim().is_empty() {
            return Err(Error::Validation {
                message: "new_name is required".into(),
            });
        }
        Ok(self
            .store
            .rename(owner_id, conversation_id, new_name)
            .await?)
    }

    /// Delete a thread, irreversibly.
    pub async fn delete_conversation(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
    ) -> Result<bool> {
        Ok(self.store.delete(owner_id, conversation_id).await?)
    }
}
