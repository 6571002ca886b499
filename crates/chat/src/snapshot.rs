//! Conversation snapshot decoding.
//!
//! Clients carry their conversation between requests as a JSON array of
//! `{role, content, error?}` objects. A missing snapshot, or one that decodes
//! to a falsy JSON value (`null`, `false`, `0`, `""`), means "no history".
//! Anything else must be a well-formed turn array; malformed input is an
//! error for the caller to surface, not an empty conversation.

use parley_core::{Conversation, SnapshotError};
use serde_json::Value;

/// Decode a client snapshot into a conversation.
pub fn parse_snapshot(raw: Option<&str>) -> Result<Conversation, SnapshotError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Conversation::new());
    };

    let value: Value =
        serde_json::from_str(raw).map_err(|e| SnapshotError::Malformed(e.to_string()))?;

    parse_snapshot_value(value)
}

/// Decode a snapshot that arrived already parsed, e.g. inside a JSON body.
///
/// A non-empty string is treated as snapshot text and decoded once more.
pub fn parse_snapshot_value(value: Value) -> Result<Conversation, SnapshotError> {
    if is_falsy(&value) {
        return Ok(Conversation::new());
    }

    if let Value::String(text) = &value {
        let inner: Value =
            serde_json::from_str(text).map_err(|e| SnapshotError::Malformed(e.to_string()))?;
        if matches!(inner, Value::String(_)) {
            return Err(SnapshotError::Malformed("snapshot is nested too deeply".into()));
        }
        return parse_snapshot_value(inner);
    }

    serde_json::from_value(value).map_err(|e| SnapshotError::Malformed(e.to_string()))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
