//! StrategyAgent trait — the abstraction over the stateless LLM agent.
//!
//! The agent is an external collaborator: it receives a single user query plus
//! a short text summary of prior context (its only substitute for memory) and
//! returns one structured answer with usage figures. The orchestrator treats
//! any failure here as fatal for that request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// The structured answer object produced by the agent.
///
/// `answer` and `chatsummary` are the fields the core depends on; any other
/// product-defined fields (WhatsApp digests, chart payloads, …) ride along in
/// `extra` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredAnswer {
    /// The full markdown answer text.
    #[serde(default)]
    pub answer: String,

    /// One-line summary of the exchange, used to rebuild context digests.
    #[serde(default)]
    pub chatsummary: String,

    /// Product-defined fields, passed through verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StructuredAnswer {
    /// The answer as a JSON value, for storage as message metadata.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// A complete reply from the agent collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReply {
    /// The structured answer.
    pub answer: StructuredAnswer,

    /// Total tokens consumed across the call.
    pub tokens: u64,

    /// Estimated cost in USD.
    pub cost: f64,
}

/// The agent collaborator contract.
///
/// Implementations are constructed once at process start and injected into
/// the orchestrator by handle — no ambient global client state.
#[async_trait]
pub trait StrategyAgent: Send + Sync {
    /// A human-readable name for this agent backend (e.g., "azure").
    fn name(&self) -> &str;

    /// Run one stateless agent turn.
    ///
    /// `previous_summary` is the context digest for this conversation, or the
    /// no-history sentinel for a fresh thread. Errors are propagated, never
    /// retried here.
    async fn complete(
        &self,
        query: &str,
        previous_summary: &str,
    ) -> std::result::Result<AgentReply, AgentError>;
}
