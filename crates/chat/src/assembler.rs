//! Conversation assembly.
//!
//! Produces the exact ordered message list submitted to the completion
//! service: context prefix, then prior turns, then the new user message.
//! Assembly is pure and deterministic. Nothing is validated, reordered,
//! deduplicated or dropped.

use parley_core::{ContextPrefix, Conversation, Turn};

/// Build `context ++ history ++ [user(message)]`.
pub fn assemble(context: &ContextPrefix, history: &Conversation, message: &str) -> Vec<Turn> {
    let mut messages = Vec::with_capacity(context.len() + history.len() + 1);
    messages.extend_from_slice(context.turns());
    messages.extend_from_slice(history.turns());
    messages.push(Turn::user(message));
    messages
}
