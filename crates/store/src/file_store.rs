//! File-based conversation store — one pretty-printed JSON record per
//! conversation, one directory per owner.
//!
//! Storage layout: `{root}/{owner_id}/{conversation_id}.json`
//!
//! The format is human-inspectable by design: operators can open a record in
//! an editor and read the full turn history. Writes go through a temp file
//! followed by an atomic rename so a crash mid-write never leaves a
//! half-written record.
//!
//! `append` and `rename` are load-mutate-persist sequences. A per-conversation
//! async mutex serializes them, so two in-flight requests touching the same
//! conversation cannot lose each other's updates.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use tradewind_core::error::StoreError;
use tradewind_core::message::{Conversation, ConversationId, ConversationSummary, Message};
use tradewind_core::store::ConversationStore;

/// A file-backed conversation store.
pub struct FileStore {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FileStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory tree is created lazily on first write.
    pub fn new(root: PathBuf) -> Self {
        debug!(root = %root.display(), "File conversation store ready");
        Self {
            root,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn owner_dir(&self, owner_id: &str) -> Result<PathBuf, StoreError> {
        validate_component(owner_id)?;
        Ok(self.root.join(owner_id))
    }

    fn record_path(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
    ) -> Result<PathBuf, StoreError> {
        validate_component(&conversation_id.0)?;
        Ok(self
            .owner_dir(owner_id)?
            .join(format!("{conversation_id}.json")))
    }

    /// The mutex guarding one conversation's load-mutate-persist sequence.
    async fn lock_for(&self, owner_id: &str, conversation_id: &ConversationId) -> Arc<Mutex<()>> {
        let key = format!("{owner_id}/{conversation_id}");
        let mut locks = self.locks.lock().await;
        locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn read_record(&self, path: &PathBuf) -> Result<Option<Conversation>, StoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let conversation = serde_json::from_str(&content)
            .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))?;
        Ok(Some(conversation))
    }

    /// Persist a record via write-to-temp + atomic rename.
    async fn write_record(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let path = self.record_path(&conversation.owner_id, &conversation.conversation_id)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::Storage(format!("Failed to create owner directory: {e}"))
            })?;
        }

        let content = serde_json::to_string_pretty(conversation)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to write record: {e}")))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to replace record: {e}")))?;

        Ok(())
    }
}

/// Owner and conversation ids become path components; keep them inside the
/// storage root.
fn validate_component(component: &str) -> Result<(), StoreError> {
    if component.is_empty()
        || component == ".."
        || component.contains('/')
        || component.contains('\\')
    {
        return Err(StoreError::Storage(format!(
            "Invalid identifier: {component:?}"
        )));
    }
    Ok(())
}

#[async_trait]
impl ConversationStore for FileStore {
    fn name(&self) -> &str {
        "file"
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
        self.write_record(&conversation).await?;

        debug!(owner = %owner_id, conversation = %id, "Conversation created");
        Ok(id)
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<ConversationSummary>, StoreError> {
        let dir = self.owner_dir(owner_id)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Storage(format!(
                    "Failed to list {}: {e}",
                    dir.display()
                )));
            }
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read_record(&path).await {
                Ok(Some(conversation)) => summaries.push(conversation.summary()),
                Ok(None) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable conversation record");
                }
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn load(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        let path = self.record_path(owner_id, conversation_id)?;
        self.read_record(&path).await
    }

    async fn append(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
        message: Message,
    ) -> Result<(), StoreError> {
        let lock = self.lock_for(owner_id, conversation_id).await;
        let _guard = lock.lock().await;

        let mut conversation = self
            .load(owner_id, conversation_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(conversation_id.to_string()))?;

        conversation.push(message);
        self.write_record(&conversation).await
    }

    async fn rename(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
        new_name: &str,
    ) -> Result<bool, StoreError> {
        let lock = self.lock_for(owner_id, conversation_id).await;
        let _guard = lock.lock().await;

        let Some(mut conversation) = self.load(owner_id, conversation_id).await? else {
            return Ok(false);
        };

        conversation.thread_name = new_name.to_string();
        conversation.updated_at = chrono::Utc::now();
        self.write_record(&conversation).await?;
        Ok(true)
    }

    async fn delete(
        &self,
        owner_id: &str,
        conversation_id: &ConversationId,
    ) -> Result<bool, StoreError> {
        let lock = self.lock_for(owner_id, conversation_id).await;
        let _guard = lock.lock().await;

        let path = self.record_path(owner_id, conversation_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                drop(_guard);
                self.locks
                    .lock()
                    .await
                    .remove(&format!("{owner_id}/{conversation_id}"));
                debug!(owner = %owner_id, conversation = %conversation_id, "Conversation deleted");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Storage(format!("Failed to delete record: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradewind_core::message::MessageMetadata;

    fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[tokio::test]
    async fn create_persists_and_reloads() {
        let (_dir, store) = store();
        let id = store.create("u1", Some("RSI chat".into())).await.unwrap();

        let conversation = store.load("u1", &id).await.unwrap().unwrap();
        assert_eq!(conversation.thread_name, "RSI chat");
        assert_eq!(conversation.owner_id, "u1");
        assert!(conversation.messages.is_empty());
        assert_eq!(conversation.total_tokens, 0);
    }

    #[tokio::test]
    async fn create_without_name_synthesizes_timestamp_name() {
        let (_dir, store) = store();
        let id = store.create("u1", None).await.unwrap();

        let conversation = store.load("u1", &id).await.unwrap().unwrap();
        assert!(conversation.thread_name.starts_with("Chat - "));
    }

    #[tokio::test]
    async fn append_grows_messages_and_totals() {
        let (_dir, store) = store();
        let id = store.create("u1", None).await.unwrap();

        store
            .append("u1", &id, Message::user("Create an RSI strategy"))
            .await
            .unwrap();
        store
            .append(
                "u1",
                &id,
                Message::assistant(
                    "# RSI Strategy ...",
                    MessageMetadata {
                        tokens: Some(500),
                        cost: Some(0.01),
                        full_response: Some(serde_json::json!({"answer": "# RSI Strategy ..."})),
                    },
                ),
            )
            .await
            .unwrap();

        let conversation = store.load("u1", &id).await.unwrap().unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.total_tokens, 500);
        assert!((conversation.total_cost - 0.01).abs() < f64::EPSILON);
        assert!(conversation.messages.iter().all(|m| m.timestamp.is_some()));
    }

    #[tokio::test]
    async fn append_preserves_order() {
        let (_dir, store) = store();
        let id = store.create("u1", None).await.unwrap();

        for i in 0..5 {
            store
                .append("u1", &id, Message::user(format!("message {i}")))
                .await
                .unwrap();
        }

        let conversation = store.load("u1", &id).await.unwrap().unwrap();
        let contents: Vec<_> = conversation
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(
            contents,
            vec!["message 0", "message 1", "message 2", "message 3", "message 4"]
        );
    }

    #[tokio::test]
    async fn append_to_missing_conversation_errors() {
        let (_dir, store) = store();
        let missing = ConversationId::from("nonexistent");
        let err = store
            .append("u1", &missing, Message::user("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let (_dir, store) = store();
        let missing = ConversationId::from("nonexistent");
        assert!(store.load("u1", &missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn load_is_a_pure_read() {
        let (_dir, store) = store();
        let id = store.create("u1", Some("thread".into())).await.unwrap();
        store.append("u1", &id, Message::user("q")).await.unwrap();

        let first = store.load("u1", &id).await.unwrap().unwrap();
        let second = store.load("u1", &id).await.unwrap().unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn list_orders_by_updated_at_descending() {
        let (_dir, store) = store();
        let first = store.create("u1", Some("first".into())).await.unwrap();
        let _second = store.create("u1", Some("second".into())).await.unwrap();

        // Touch the first conversation so it becomes the most recent.
        store
            .append("u1", &first, Message::user("bump"))
            .await
            .unwrap();

        let listing = store.list("u1").await.unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].thread_name, "first");
        assert_eq!(listing[0].message_count, 1);
        assert!(listing[0].updated_at >= listing[1].updated_at);
    }

    #[tokio::test]
    async fn list_skips_corrupt_records() {
        let (dir, store) = store();
        store.create("u1", Some("valid".into())).await.unwrap();

        let owner_dir = dir.path().join("u1");
        std::fs::write(owner_dir.join("broken.json"), "this is not json").unwrap();

        let listing = store.list("u1").await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].thread_name, "valid");
    }

    #[tokio::test]
    async fn list_unknown_owner_is_empty() {
        let (_dir, store) = store();
        assert!(store.list("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_is_scoped_per_owner() {
        let (_dir, store) = store();
        store.create("u1", Some("mine".into())).await.unwrap();
        store.create("u2", Some("theirs".into())).await.unwrap();

        let listing = store.list("u1").await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].thread_name, "mine");
    }

    #[tokio::test]
    async fn rename_persists_and_reports_missing() {
        let (_dir, store) = store();
        let id = store.create("u1", None).await.unwrap();

        assert!(store.rename("u1", &id, "RSI chat").await.unwrap());
        let listing = store.list("u1").await.unwrap();
        assert_eq!(listing[0].thread_name, "RSI chat");

        let missing = ConversationId::from("nonexistent");
        assert!(!store.rename("u1", &missing, "name").await.unwrap());
    }

    #[tokio::test]
    async fn delete_is_true_once_then_false() {
        let (_dir, store) = store();
        let id = store.create("u1", None).await.unwrap();

        assert!(store.delete("u1", &id).await.unwrap());
        assert!(store.load("u1", &id).await.unwrap().is_none());
        assert!(store.list("u1").await.unwrap().is_empty());
        assert!(!store.delete("u1", &id).await.unwrap());
    }

    #[tokio::test]
    async fn records_are_human_readable_json() {
        let (dir, store) = store();
        let id = store.create("u1", Some("readable".into())).await.unwrap();
        store.append("u1", &id, Message::user("q")).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("u1").join(format!("{id}.json"))).unwrap();
        assert!(raw.contains('\n')); // pretty-printed
        assert!(raw.contains("\"thread_name\": \"readable\""));
    }

    #[tokio::test]
    async fn no_temp_files_left_behind() {
        let (dir, store) = store();
        let id = store.create("u1", None).await.unwrap();
        store.append("u1", &id, Message::user("q")).await.unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("u1"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn path_traversal_identifiers_rejected() {
        let (_dir, store) = store();
        let err = store.create("../evil", None).await.unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));

        let bad = ConversationId::from("../../etc/passwd");
        assert!(store.load("u1", &bad).await.is_err());
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let (_dir, store) = store();
        let store = Arc::new(store);
        let id = store.create("u1", None).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append("u1", &id, Message::user(format!("msg {i}")))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let conversation = store.load("u1", &id).await.unwrap().unwrap();
        assert_eq!(conversation.messages.len(), 10);
    }
}
