//! Chat and thread-management routes.
//!
//! Endpoints:
//!
//! - `POST   /chat/invoke`           — Run one chat turn, always stored
//! - `POST   /threads/new`           — Create a conversation thread
//! - `GET    /threads/list`          — List threads for the caller
//! - `GET    /threads/{id}`          — Get a full thread
//! - `PUT    /threads/{id}/rename`   — Rename a thread
//! - `DELETE /threads/{id}`          — Delete a thread

use axum::{
    Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use tradewind_chat::ChatReply;
use tradewind_core::error::{Error, StoreError};
use tradewind_core::message::{Conversation, ConversationId, ConversationSummary};

use crate::{Owner, SharedState};

/// Build the authenticated API router. Merged into the main router in `lib`.
pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/chat/invoke", post(chat_invoke_handler))
        .route("/threads/new", post(create_thread_handler))
        .route("/threads/list", get(list_threads_handler))
        .route(
            "/threads/{id}",
            get(get_thread_handler).delete(delete_thread_handler),
        )
        .route("/threads/{id}/rename", put(rename_thread_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ChatInvokeRequest {
    #[serde(default)]
    query: String,
    #[serde(default)]
    conversation_id: Option<String>,
}

#[derive(Serialize)]
struct ChatInvokeResponse {
    output: ChatReply,
    metadata: InvokeMetadata,
}

#[derive(Serialize)]
struct InvokeMetadata {
    run_id: String,
    feedback_tokens: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct CreateThreadRequest {
    #[serde(default)]
    thread_name: Option<String>,
}

#[derive(Serialize)]
struct CreateThreadResponse {
    conversation_id: ConversationId,
    thread_name: String,
}

#[derive(Serialize)]
struct ThreadListResponse {
    conversations: Vec<ConversationSummary>,
}

#[derive(Deserialize)]
struct RenameThreadRequest {
    #[serde(default)]
    new_name: Option<String>,
}

#[derive(Serialize)]
struct RenameThreadResponse {
    success: bool,
    new_name: String,
}

#[derive(Serialize)]
struct DeleteThreadResponse {
    success: bool,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map domain errors onto HTTP statuses.
fn map_error(err: Error) -> ApiError {
    let (status, message) = match &err {
        Error::Store(StoreError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, "Conversation not found".to_string())
        }
        Error::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
        Error::Agent(e) => (
            StatusCode::BAD_GATEWAY,
            format!("Agent request failed: {e}"),
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    };
    (status, Json(ErrorResponse { error: message }))
}

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Conversation not found".into(),
        }),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn chat_invoke_handler(
    State(state): State<SharedState>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(payload): Json<ChatInvokeRequest>,
) -> Result<Json<ChatInvokeResponse>, ApiError> {
    info!(owner = %owner, "chat/invoke request");

    let conversation_id = payload
        .conversation_id
        .as_deref()
        .map(ConversationId::from);

    let reply = state
        .chat
        .process(&owner, &payload.query, conversation_id)
        .await
        .map_err(map_error)?;

    Ok(Json(ChatInvokeResponse {
        output: reply,
        metadata: InvokeMetadata {
            run_id: String::new(),
            feedback_tokens: Vec::new(),
        },
    }))
}

async fn create_thread_handler(
    State(state): State<SharedState>,
    Extension(Owner(owner)): Extension<Owner>,
    Json(payload): Json<CreateThreadRequest>,
) -> Result<Json<CreateThreadResponse>, ApiError> {
    let id = state
        .chat
        .create_conversation(&owner, payload.thread_name)
        .await
        .map_err(map_error)?;

    // Echo the actual stored name — it may have been synthesized.
    let thread_name = state
        .chat
        .get_conversation(&owner, &id)
        .await
        .map_err(map_error)?
        .map(|c| c.thread_name)
        .unwrap_or_default();

    Ok(Json(CreateThreadResponse {
        conversation_id: id,
        thread_name,
    }))
}

async fn list_threads_handler(
    State(state): State<SharedState>,
    Extension(Owner(owner)): Extension<Owner>,
) -> Result<Json<ThreadListResponse>, ApiError> {
    let conversations = state
        .chat
        .list_conversations(&owner)
        .await
        .map_err(map_error)?;
    Ok(Json(ThreadListResponse { conversations }))
}

async fn get_thread_handler(
    State(state): State<SharedState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    let conversation = state
        .chat
        .get_conversation(&owner, &ConversationId::from(&id))
        .await
        .map_err(map_error)?
        .ok_or_else(not_found)?;
    Ok(Json(conversation))
}

async fn rename_thread_handler(
    State(state): State<SharedState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<String>,
    Json(payload): Json<RenameThreadRequest>,
) -> Result<Json<RenameThreadResponse>, ApiError> {
    let new_name = payload.new_name.unwrap_or_default();

    let renamed = state
        .chat
        .rename_conversation(&owner, &ConversationId::from(&id), &new_name)
        .await
        .map_err(map_error)?;

    if !renamed {
        return Err(not_found());
    }

    Ok(Json(RenameThreadResponse {
        success: true,
        new_name,
    }))
}

async fn delete_thread_handler(
    State(state): State<SharedState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<String>,
) -> Result<Json<DeleteThreadResponse>, ApiError> {
    let deleted = state
        .chat
        .delete_conversation(&owner, &ConversationId::from(&id))
        .await
        .map_err(map_error)?;

    if !deleted {
        return Err(not_found());
    }

    Ok(Json(DeleteThreadResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GatewayState, build_router};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;
    use tradewind_chat::ChatService;
    use tradewind_config::AppConfig;
    use tradewind_core::agent::{AgentReply, StrategyAgent, StructuredAnswer};
    use tradewind_core::error::AgentError;
    use tradewind_store::InMemoryStore;

    struct StubAgent {
        fail: bool,
    }

    #[async_trait]
    impl StrategyAgent for StubAgent {
        fn name(&self) -> &str {
            "stub"
        }

        async fn complete(
            &self,
            query: &str,
            _previous_summary: &str,
        ) -> Result<AgentReply, AgentError> {
            if self.fail {
                return Err(AgentError::EmptyResponse);
            }
            Ok(AgentReply {
                answer: StructuredAnswer {
                    answer: format!("Answer to: {query}"),
                    chatsummary: format!("User asked: {query}"),
                    extra: serde_json::Map::new(),
                },
                tokens: 100,
                cost: 0.002,
            })
        }
    }

    fn test_router(fail_agent: bool) -> Router {
        let store = Arc::new(InMemoryStore::new());
        let agent = Arc::new(StubAgent { fail: fail_agent });
        let chat = Arc::new(ChatService::new(store, agent));
        build_router(Arc::new(GatewayState {
            config: AppConfig::default(),
            chat,
        }))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn request(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-uuid", "u1");
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn health_is_open() {
        let response = test_router(false)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn missing_owner_header_is_unauthorized() {
        let response = test_router(false)
            .oneshot(Request::get("/threads/list").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn chat_invoke_creates_thread_and_returns_enriched_answer() {
        let router = test_router(false);

        let response = router
            .oneshot(request(
                "POST",
                "/chat/invoke",
                Some(serde_json::json!({"query": "Create an RSI strategy"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let output = &body["output"];
        assert_eq!(output["answer"], "Answer to: Create an RSI strategy");
        assert_eq!(output["tokens_used"], 100);
        assert!(output["conversation_id"].is_string());
        assert_eq!(body["metadata"]["run_id"], "");
    }

    #[tokio::test]
    async fn agent_failure_maps_to_bad_gateway() {
        let response = test_router(true)
            .oneshot(request(
                "POST",
                "/chat/invoke",
                Some(serde_json::json!({"query": "q"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn thread_lifecycle_over_http() {
        let router = test_router(false);

        // Create
        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/threads/new",
                Some(serde_json::json!({"thread_name": "RSI research"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = json_body(response).await;
        let id = created["conversation_id"].as_str().unwrap().to_string();
        assert_eq!(created["thread_name"], "RSI research");

        // List
        let response = router
            .clone()
            .oneshot(request("GET", "/threads/list", None))
            .await
            .unwrap();
        let listing = json_body(response).await;
        assert_eq!(listing["conversations"].as_array().unwrap().len(), 1);

        // Get
        let response = router
            .clone()
            .oneshot(request("GET", &format!("/threads/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let thread = json_body(response).await;
        assert_eq!(thread["thread_name"], "RSI research");

        // Rename
        let response = router
            .clone()
            .oneshot(request(
                "PUT",
                &format!("/threads/{id}/rename"),
                Some(serde_json::json!({"new_name": "RSI chat"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let renamed = json_body(response).await;
        assert_eq!(renamed["new_name"], "RSI chat");

        // Delete, twice
        let response = router
            .clone()
            .oneshot(request("DELETE", &format!("/threads/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(request("DELETE", &format!("/threads/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rename_without_name_is_bad_request() {
        let router = test_router(false);

        let response = router
            .clone()
            .oneshot(request(
                "POST",
                "/threads/new",
                Some(serde_json::json!({})),
            ))
            .await
            .unwrap();
        let created = json_body(response).await;
        let id = created["conversation_id"].as_str().unwrap().to_string();
        // Synthesized name from the timestamp
        assert!(created["thread_name"].as_str().unwrap().starts_with("Chat - "));

        let response = router
            .oneshot(request(
                "PUT",
                &format!("/threads/{id}/rename"),
                Some(serde_json::json!({})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_missing_thread_is_not_found() {
        let response = test_router(false)
            .oneshot(request("GET", "/threads/nope", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
