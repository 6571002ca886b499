//! Server-held chat sessions.
//!
//! - `POST   /v1/sessions`: create
//! - `GET    /v1/sessions/{id}`: read
//! - `POST   /v1/sessions/{id}/messages`: update (one action)
//! - `DELETE /v1/sessions/{id}`: clear and end
//!
//! Concurrent messages to the same session are last-write-wins: the session
//! is copied out for the completion call and written back afterwards.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use parley_chat::ActionResult;
use parley_core::{ChatSession, Conversation, SessionId};

use crate::{ApiError, SharedState};

/// In-memory session table, bounded by `max_sessions`.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, ChatSession>>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Create an empty session, evicting the least recently updated one
    /// when the table is full.
    pub async fn create(&self) -> ChatSession {
        let session = ChatSession::new();
        let mut sessions = self.sessions.write().await;

        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .values()
                .min_by_key(|s| s.updated_at())
                .map(|s| s.id().clone());
            if let Some(id) = oldest {
                debug!(session = %id, "Evicting least recently used session");
                sessions.remove(&id);
            }
        }

        sessions.insert(session.id().clone(), session.clone());
        session
    }

    pub async fn get(&self, id: &SessionId) -> Option<ChatSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Write an updated session back. Sessions ended in the meantime stay ended.
    pub async fn update(&self, session: ChatSession) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session.id()) {
            Some(slot) => {
                *slot = session;
                true
            }
            None => false,
        }
    }

    /// Clear and remove a session. Returns `false` if it did not exist.
    pub async fn end(&self, id: &SessionId) -> bool {
        match self.sessions.write().await.remove(id) {
            Some(mut session) => {
                session.clear();
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub turns: Conversation,
}

impl From<&ChatSession> for SessionView {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id().clone(),
            created_at: session.created_at(),
            updated_at: session.updated_at(),
            turns: session.history().clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionMessageRequest {
    pub message: String,
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn create_session_handler(State(state): State<SharedState>) -> Response {
    let session = state.sessions.create().await;
    info!(session = %session.id(), "Session created");
    (StatusCode::CREATED, Json(SessionView::from(&session))).into_response()
}

pub(crate) async fn get_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state
        .sessions
        .get(&SessionId(id))
        .await
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    Ok(Json(SessionView::from(&session)))
}

pub(crate) async fn session_message_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<SessionMessageRequest>,
) -> Result<Json<ActionResult>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }

    let id = SessionId(id);
    let mut session = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Session not found"))?;

    // The lock is not held across the completion call.
    let result = state.completer.respond_in(&mut session, &req.message).await;

    if !state.sessions.update(session).await {
        debug!(session = %id, "Session ended during completion; result not recorded");
    }

    Ok(Json(result))
}

pub(crate) async fn end_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SessionId(id);
    if state.sessions.end(&id).await {
        info!(session = %id, "Session ended");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Session not found"))
    }
}
