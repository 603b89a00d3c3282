//! Message and Conversation domain types.
//!
//! These are the core value objects that flow through the entire system:
//! a user sends a query → the orchestrator loads the conversation → the agent
//! answers → both turns are appended and persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation (thread).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
}

/// Usage and provenance metadata attached to assistant messages.
///
/// `full_response` holds the entire structured answer as returned by the
/// agent; the stored `content` is only a bounded prefix of the answer text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Total tokens consumed producing this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,

    /// Estimated cost in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,

    /// The complete structured answer object from the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_response: Option<serde_json::Value>,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Usage metadata (assistant messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,

    /// Stamped at append time if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            metadata: None,
            timestamp: None,
        }
    }

    /// Create a new assistant message with usage metadata.
    pub fn assistant(content: impl Into<String>, metadata: MessageMetadata) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            metadata: Some(metadata),
            timestamp: None,
        }
    }
}

/// A conversation is an ordered, append-only sequence of messages owned by
/// one user, plus running usage totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID
    pub conversation_id: ConversationId,

    /// The owning user
    pub owner_id: String,

    /// Human-readable thread label (mutable via rename)
    pub thread_name: String,

    /// Ordered messages
    pub messages: Vec<Message>,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,

    /// When the last mutation happened
    pub updated_at: DateTime<Utc>,

    /// Sum of `metadata.tokens` over all messages carrying it
    #[serde(default)]
    pub total_tokens: u64,

    /// Sum of `metadata.cost` over all messages carrying it
    #[serde(default)]
    pub total_cost: f64,
}

impl Conversation {
    /// Create a new empty conversation for `owner_id`.
    pub fn new(owner_id: impl Into<String>, thread_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            conversation_id: ConversationId::new(),
            owner_id: owner_id.into(),
            thread_name: thread_name.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            total_tokens: 0,
            total_cost: 0.0,
        }
    }

    /// Synthesize the default thread name from the current UTC time.
    pub fn default_thread_name() -> String {
        format!("Chat - {}", Utc::now().format("%Y-%m-%d %H:%M"))
    }

    /// Append a message, stamping its timestamp if absent and folding any
    /// usage metadata into the running totals.
    ///
    /// This is the single place the totals invariant is maintained: after any
    /// sequence of pushes, `total_tokens`/`total_cost` equal the sum of the
    /// metadata values present in `messages`.
    pub fn push(&mut self, mut message: Message) {
        if message.timestamp.is_none() {
            message.timestamp = Some(Utc::now());
        }
        if let Some(meta) = &message.metadata {
            if let Some(tokens) = meta.tokens {
                self.total_tokens += tokens;
            }
            if let Some(cost) = meta.cost {
                self.total_cost += cost;
            }
        }
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Produce the listing record for this conversation.
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            conversation_id: self.conversation_id.clone(),
            thread_name: self.thread_name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            message_count: self.messages.len(),
            total_tokens: self.total_tokens,
            total_cost: self.total_cost,
        }
    }
}

/// Minimal per-conversation record returned by listing operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: ConversationId,
    pub thread_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
    pub total_tokens: u64,
    pub total_cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Create an RSI strategy");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Create an RSI strategy");
        assert!(msg.metadata.is_none());
        assert!(msg.timestamp.is_none());
    }

    #[test]
    fn push_stamps_timestamp_and_updates_totals() {
        let mut conv = Conversation::new("u1", "Test thread");
        let created = conv.created_at;

        conv.push(Message::user("First message"));
        conv.push(Message::assistant(
            "Here is the strategy",
            MessageMetadata {
                tokens: Some(500),
                cost: Some(0.01),
                full_response: None,
            },
        ));

        assert_eq!(conv.messages.len(), 2);
        assert!(conv.messages.iter().all(|m| m.timestamp.is_some()));
        assert_eq!(conv.total_tokens, 500);
        assert!((conv.total_cost - 0.01).abs() < f64::EPSILON);
        assert!(conv.updated_at >= created);
    }

    #[test]
    fn push_without_metadata_leaves_totals_alone() {
        let mut conv = Conversation::new("u1", "Test thread");
        conv.push(Message::user("hello"));
        assert_eq!(conv.total_tokens, 0);
        assert_eq!(conv.total_cost, 0.0);
    }

    #[test]
    fn conversation_serialization_roundtrip() {
        let mut conv = Conversation::new("u1", "RSI chat");
        conv.push(Message::user("Create an RSI strategy"));

        let json = serde_json::to_string(&conv).unwrap();
        let deserialized: Conversation = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.owner_id, "u1");
        assert_eq!(deserialized.thread_name, "RSI chat");
        assert_eq!(deserialized.messages.len(), 1);
        assert_eq!(deserialized.messages[0].role, Role::User);
    }

    #[test]
    fn records_without_totals_deserialize_with_zeros() {
        // Records written before token/cost accounting carry no totals fields.
        let json = r#"{
            "conversation_id": "abc",
            "owner_id": "u1",
            "thread_name": "old thread",
            "messages": [],
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }"#;
        let conv: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conv.total_tokens, 0);
        assert_eq!(conv.total_cost, 0.0);
    }

    #[test]
    fn summary_reflects_conversation() {
        let mut conv = Conversation::new("u1", "RSI chat");
        conv.push(Message::user("q"));
        let summary = conv.summary();
        assert_eq!(summary.message_count, 1);
        assert_eq!(summary.thread_name, "RSI chat");
        assert_eq!(summary.conversation_id, conv.conversation_id);
    }

    #[test]
    fn default_thread_name_is_timestamp_derived() {
        let name = Conversation::default_thread_name();
        assert!(name.starts_with("Chat - "));
        // "Chat - YYYY-MM-DD HH:MM"
        assert_eq!(name.len(), "Chat - ".len() + 16);
    }
}
