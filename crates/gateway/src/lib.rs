//! HTTP gateway for Parley.
//!
//! Serves the server-rendered chat page, the form action behind it, and a
//! small JSON API:
//!
//! - `GET  /health`: liveness check
//! - `GET  /`: chat page
//! - `POST /`: form action (`message`, `chat-history`)
//! - `POST /v1/chat`: stateless action, JSON or form body
//! - `POST /v1/sessions`: start a session
//! - `GET  /v1/sessions/{id}`: read a session
//! - `POST /v1/sessions/{id}/messages`: send a message within a session
//! - `DELETE /v1/sessions/{id}`: end a session
//!
//! Built on Axum.

pub mod action;
pub mod frontend;
pub mod sessions;

#[cfg(test)]
pub(crate) mod test_support;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::{
    Router,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use parley_chat::Completer;
use parley_config::AppConfig;
use parley_core::SnapshotError;

use crate::frontend::Pages;
use crate::sessions::SessionStore;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub completer: Completer,
    pub sessions: SessionStore,
    pub pages: Pages,
}

impl GatewayState {
    /// Fails only if the embedded page templates do not compile.
    pub fn new(config: AppConfig, completer: Completer) -> Result<Self, tera::Error> {
        let sessions = SessionStore::new(config.gateway.max_sessions);
        Ok(Self {
            config,
            completer,
            sessions,
            pages: Pages::new()?,
        })
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS limited to the gateway's own origin
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config);

    let v1 = Router::new()
        .route("/chat", post(action::chat_handler))
        .route("/sessions", post(sessions::create_session_handler))
        .route(
            "/sessions/{id}",
            get(sessions::get_session_handler).delete(sessions::end_session_handler),
        )
        .route("/sessions/{id}/messages", post(sessions::session_message_handler));

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/",
            get(frontend::index_handler).post(action::form_action_handler),
        )
        .route("/static/style.css", get(frontend::css_handler))
        .nest("/v1", v1)
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origin = format!("http://{}:{}", config.gateway.host, config.gateway.port);
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    match HeaderValue::from_str(&origin) {
        Ok(value) => cors.allow_origin(AllowOrigin::exact(value)),
        Err(_) => {
            warn!(origin = %origin, "Gateway origin is not a valid header value; CORS disabled");
            cors
        }
    }
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    if !config.has_api_key() && config.provider != "ollama" {
        warn!("No API key configured; completions will fail until one is set");
    }

    let provider = parley_providers::build_from_config(&config)?;
    let completer = Completer::from_config(provider, &config)?;

    info!(
        provider = %completer.provider_name(),
        model = %completer.model(),
        context_turns = completer.context().len(),
        "Completion backend ready"
    );

    let state = Arc::new(GatewayState::new(config, completer)?);
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

// --- Errors ---

#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    error: String,
}

/// A JSON error reply.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<SnapshotError> for ApiError {
    fn from(e: SnapshotError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
