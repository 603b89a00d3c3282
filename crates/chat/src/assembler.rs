//! Context assembly — the digest handed to the stateless agent.
//!
//! The agent has no memory of its own; the only history it sees is one short
//! string built here. The policy is a two-stage window:
//!
//! 1. Pull the last 5 messages in order and turn each into a fragment:
//!    user messages become `"User: <content>"`; assistant messages prefer the
//!    `chatsummary` embedded in their stored full response, falling back to a
//!    100-char prefix of raw content only when no full response was recorded.
//! 2. Keep the last 3 fragments and join them with single spaces.
//!
//! Recency bias without runaway growth: the digest stays compact and
//! strategy-relevant instead of echoing pages of generated text. These
//! numbers are product heuristics; keeping them behind this interface means
//! the store and orchestrator never learn about them.

use tradewind_core::message::{Conversation, Role};

use crate::char_prefix;

/// Sentinel digest for a brand-new thread.
pub const NO_HISTORY_SENTINEL: &str = "No previous conversation.";

/// How many trailing messages are considered at all.
const RECENT_MESSAGE_WINDOW: usize = 5;
/// How many fragments survive into the digest.
const DIGEST_FRAGMENT_COUNT: usize = 3;
/// Fallback preview length for assistant messages without a stored summary.
const ASSISTANT_PREVIEW_CHARS: usize = 100;

/// Builds context digests from conversation history.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Produce the digest for a conversation, or the sentinel when there is
    /// no usable history.
    pub fn digest(&self, conversation: Option<&Conversation>) -> String {
        let Some(conversation) = conversation else {
            return NO_HISTORY_SENTINEL.to_string();
        };
        if conversation.messages.is_empty() {
            return NO_HISTORY_SENTINEL.to_string();
        }

        let start = conversation
            .messages
            .len()
            .saturating_sub(RECENT_MESSAGE_WINDOW);
        let mut fragments: Vec<String> = Vec::new();

        for message in &conversation.messages[start..] {
            match message.role {
                Role::User => fragments.push(format!("User: {}", message.content)),
                Role::Assistant => {
                    let full_response = message
                        .metadata
                        .as_ref()
                        .and_then(|m| m.full_response.as_ref());
                    match full_response {
                        Some(full) => {
                            // An assistant turn with a recorded full response
                            // but no summary contributes nothing.
                            if let Some(summary) = full
                                .get("chatsummary")
                                .and_then(|v| v.as_str())
                                .filter(|s| !s.is_empty())
                            {
                                fragments.push(summary.to_string());
                            }
                        }
                        None => fragments.push(format!(
                            "Assistant: {}...",
                            char_prefix(&message.content, ASSISTANT_PREVIEW_CHARS)
                        )),
                    }
                }
            }
        }

        if fragments.is_empty() {
            return NO_HISTORY_SENTINEL.to_string();
        }

        let keep = fragments.len().saturating_sub(DIGEST_FRAGMENT_COUNT);
        fragments[keep..].join(" ")
    }
}
