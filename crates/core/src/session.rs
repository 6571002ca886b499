//! Chat session: explicit client-session state.
//!
//! Lifecycle: created on first load, updated on each turn, cleared when the
//! session ends. The session owns its [`Conversation`]; nothing outside it
//! can reorder or edit recorded turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{Conversation, Turn};

/// Unique identifier for a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user's ongoing conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    id: SessionId,

    conversation: Conversation,

    /// When this session was created
    created_at: DateTime<Utc>,

    /// When the last turn was recorded (or the session was cleared)
    updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a new empty session.
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    pub fn with_id(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            conversation: Conversation::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Resume a session from a client-held snapshot.
    pub fn restore(conversation: Conversation) -> Self {
        let mut session = Self::new();
        session.conversation = conversation;
        session
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn history(&self) -> &Conversation {
        &self.conversation
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Append a turn to the session's conversation.
    pub fn record(&mut self, turn: Turn) {
        self.updated_at = Utc::now();
        self.conversation.push(turn);
    }

    /// Drop all recorded turns, keeping the session identity.
    pub fn clear(&mut self) {
        self.updated_at = Utc::now();
        self.conversation = Conversation::new();
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
