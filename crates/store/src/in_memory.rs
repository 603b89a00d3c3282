//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use tradewind_core::error::StoreError;
use tradewind_core::message::{Conversation, ConversationId, ConversationSummary, Message};
use tradewind_core::store::ConversationStore;

/// An in-memory store keyed by `(owner_id, conversation_id)`.
/// Useful for tests and sessions where persistence isn't needed.
pub struct InMemoryStore {
    records: RwLock<HashMap<(String, String), Conversation>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn key(owner_id: &str, conversation_id: &ConversationId) -> (String, String) {
    (owner_id.to_string(), conversation_id.0.clone())
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn create(
        &self,
        owner_id: &str,
        thread_name: Option<String>,
    ) -> Result<ConversationId, StoreError> {
        let name = thread_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(Conversation::default_thread_name);

        let conversation = Conversation::new(owner_id, name);
        let id = conversation.conversation_id.clone();
        self.records
            .write()
            .await
            .insert(key(owner_id, &id), conversation);
        Ok(id)
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<ConversationSummary>, StoreError> {
        let records = self.records.read().await;
        let mut summaries: Vec<ConversationSummary> = records
            .iter()
            .filter(|((owner, _), _)| owner == owner_id)
            .map(|(_, c)| c.summary())
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn load(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(&key(owner_id, conversation_id)).cloned())
    }

    async fn append(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
        message: Message,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let conversation = records
            .get_mut(&key(owner_id, conversation_id))
            .ok_or_else(|| StoreError::NotFound(conversation_id.to_string()))?;
        conversation.push(message);
        Ok(())
    }

    async fn rename(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
        new_name: &str,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(&key(owner_id, conversation_id)) {
            Some(conversation) => {
                conversation.thread_name = new_name.to_string();
                conversation.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        Ok(records.remove(&key(owner_id, conversation_id)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradewind_core::message::MessageMetadata;

    #[tokio::test]
    async fn create_and_load() {
        let store = InMemoryStore::new();
        let id = store.create("u1", Some("thread".into())).await.unwrap();

        let conversation = store.load("u1", &id).await.unwrap().unwrap();
        assert_eq!(conversation.thread_name, "thread");
        assert!(conversation.messages.is_empty());
    }

    #[tokio::test]
    async fn append_tracks_totals() {
        let store = InMemoryStore::new();
        let id = store.create("u1", None).await.unwrap();

        store.append("u1", &id, Message::user("q")).await.unwrap();
        store
            .append(
                "u1",
                &id,
                Message::assistant(
                    "a",
                    MessageMetadata {
                        tokens: Some(42),
                        cost: Some(0.001),
                        full_response: None,
                    },
                ),
            )
            .await
            .unwrap();

        let conversation = store.load("u1", &id).await.unwrap().unwrap();
        assert_eq!(conversation.total_tokens, 42);
        assert_eq!(conversation.messages.len(), 2);
    }

    #[tokio::test]
    async fn owners_are_isolated() {
        let store = InMemoryStore::new();
        let id = store.create("u1", Some("mine".into())).await.unwrap();

        assert!(store.load("u2", &id).await.unwrap().is_none());
        assert!(store.list("u2").await.unwrap().is_empty());
        assert!(!store.delete("u2", &id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_then_gone() {
        let store = InMemoryStore::new();
        let id = store.create("u1", None).await.unwrap();

        assert!(store.delete("u1", &id).await.unwrap());
        assert!(store.load("u1", &id).await.unwrap().is_none());
        assert!(!store.delete("u1", &id).await.unwrap());
    }
}
