//! Error types for the Tradewind domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Tradewind operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Agent collaborator errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- Caller input errors ---
    #[error("Validation error: {message}")]
    Validation { message: String },

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors from the conversation store.
///
/// Reads report a missing conversation as a value (`None` / `false`);
/// only mutations raise `NotFound`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors from the external agent collaborator.
///
/// Any of these is fatal for the request that triggered the call — the
/// orchestrator never retries and never persists a partial turn.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Agent returned no response")]
    EmptyResponse,

    #[error("Malformed agent output: {0}")]
    MalformedOutput(String),
}
