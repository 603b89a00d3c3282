//! HTTP API gateway for Tradewind.
//!
//! Exposes the chat endpoint and thread-management routes over REST, plus
//! health and index documents. Every chat/thread route is keyed by the
//! caller's `x-user-uuid` header; requests without it are rejected before any
//! handler runs.
//!
//! Built on Axum for high performance async HTTP.

pub mod routes;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    http::StatusCode,
    middleware::{self, Next},
    response::Json,
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use tradewind_chat::ChatService;
use tradewind_config::AppConfig;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub chat: Arc<ChatService>,
}

pub type SharedState = Arc<GatewayState>;

/// The authenticated owner for this request, extracted from `x-user-uuid`.
#[derive(Debug, Clone)]
pub struct Owner(pub String);

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - Owner-header authentication on chat/thread routes
/// - CORS with an explicit origin policy
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let api = routes::api_router(state.clone()).layer(middleware::from_fn(owner_middleware));

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::exact(
            state
                .config
                .gateway
                .allowed_origin
                .parse()
                .expect("gateway.allowed_origin must be a valid origin"),
        ))
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderName::from_static("x-user-uuid"),
        ])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .route("/", get(root_handler))
        .merge(api)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(
    config: AppConfig,
    chat: Arc<ChatService>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(GatewayState { config, chat });
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Owner authentication ---

async fn owner_middleware(
    mut req: axum::extract::Request,
    next: Next,
) -> Result<axum::response::Response, (StatusCode, Json<routes::ErrorResponse>)> {
    let owner = req
        .headers()
        .get("x-user-uuid")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    match owner {
        Some(owner) => {
            req.extensions_mut().insert(Owner(owner));
            Ok(next.run(req).await)
        }
        None => {
            warn!("Request rejected — missing x-user-uuid header");
            Err((
                StatusCode::UNAUTHORIZED,
                Json(routes::ErrorResponse {
                    error: "x-user-uuid header is required".into(),
                }),
            ))
        }
    }
}

// --- Health & index ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    features: Vec<&'static str>,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        features: vec![
            "Token usage tracking and cost calculation",
            "PineScript code generation",
            "Trading strategy consultation",
            "Conversation summaries",
            "Markdown formatted responses",
        ],
    })
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Tradewind Trading Assistant API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "chat": "/chat/invoke",
            "threads": {
                "new": "/threads/new",
                "list": "/threads/list",
                "get": "/threads/{id}",
                "rename": "/threads/{id}/rename",
                "delete": "/threads/{id}"
            }
        },
        "authentication": "All chat and thread endpoints require the x-user-uuid header"
    }))
}
