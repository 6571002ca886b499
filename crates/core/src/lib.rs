//! # Parley Core
//!
//! Domain types, traits, and error definitions for the Parley chat service.
//! This crate has **zero framework dependencies**: it defines the model that
//! the provider, chat, gateway and CLI crates implement against.
//!
//! - [`Turn`] / [`Conversation`]: role-tagged messages, append-only
//! - [`ContextPrefix`]: the fixed leading turns sent with every request
//! - [`ChatSession`]: explicit client-session state with a lifecycle
//! - [`Provider`]: the abstraction over completion backends

pub mod context;
pub mod error;
pub mod message;
pub mod provider;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use context::{ContextPrefix, ContextPreset};
pub use error::{ProviderError, SnapshotError};
pub use message::{Conversation, Role, Turn};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use session::{ChatSession, SessionId};
