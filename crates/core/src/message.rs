//! Turn and Conversation domain types.
//!
//! These are the value objects that flow through the whole system:
//! the client submits a message → it becomes a user [`Turn`] → the reply (or
//! the failure) comes back as another [`Turn`] appended to the [`Conversation`].

use serde::{Deserialize, Serialize};

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// The AI assistant
    Assistant,
    /// The end user
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Assistant => "assistant",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged message in a conversation.
///
/// Turns are immutable once built: the fields are only readable. A failed
/// request is recorded as a new assistant turn with the error flag set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,

    content: String,

    /// Marks a surfaced failure rather than a genuine model reply.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    error: bool,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            error: false,
        }
    }

    /// Create a new user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create an assistant turn that reports a failure to the user.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: message.into(),
            error: true,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_error(&self) -> bool {
        self.error
    }
}

/// An ordered, append-only sequence of turns.
///
/// Serializes as a bare JSON array, which is also the transport snapshot
/// format exchanged with clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn to the end of the conversation.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Serialize to the JSON snapshot clients carry between requests.
    pub fn to_snapshot(&self) -> String {
        // A Vec of plain structs with string keys cannot fail to serialize.
        serde_json::to_string(&self.turns).unwrap_or_else(|_| "[]".into())
    }
}

impl From<Vec<Turn>> for Conversation {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_turn() {
        let turn = Turn::user("Hello!");
        assert_eq!(turn.role(), Role::User);
        assert_eq!(turn.content(), "Hello!");
        assert!(!turn.is_error());
    }

    #[test]
    fn error_turn_is_flagged_assistant() {
        let turn = Turn::error("rate limited");
        assert_eq!(turn.role(), Role::Assistant);
        assert!(turn.is_error());
    }

    #[test]
    fn error_flag_only_serialized_when_set() {
        let ok = serde_json::to_string(&Turn::assistant("hi")).unwrap();
        assert_eq!(ok, r#"{"role":"assistant","content":"hi"}"#);

        let failed = serde_json::to_string(&Turn::error("boom")).unwrap();
        assert_eq!(failed, r#"{"role":"assistant","content":"boom","error":true}"#);
    }

    #[test]
    fn conversation_preserves_order() {
        let mut conv = Conversation::new();
        conv.push(Turn::user("first"));
        conv.push(Turn::assistant("second"));
        conv.push(Turn::user("third"));

        let contents: Vec<&str> = conv.iter().map(Turn::content).collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn snapshot_roundtrip_reproduces_turns() {
        let mut conv = Conversation::new();
        conv.push(Turn::user("Tell me a joke"));
        conv.push(Turn::assistant("Why did the crab never share? Because it was shellfish."));
        conv.push(Turn::user("Another"));
        conv.push(Turn::error("Something went wrong! Please try again."));

        let snapshot = conv.to_snapshot();
        let restored: Conversation = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(restored, conv);
    }

    #[test]
    fn snapshot_is_a_bare_array() {
        let conv = Conversation::from(vec![Turn::user("hi")]);
        assert_eq!(conv.to_snapshot(), r#"[{"role":"user","content":"hi"}]"#);
        assert_eq!(Conversation::new().to_snapshot(), "[]");
    }
}
