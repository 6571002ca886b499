//! Error types for the Parley domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type.

use thiserror::Error;

/// Shown to the user when a failed completion carries no message of its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong! Please try again.";

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// `message` is the provider's own explanation; the wait is only known
    /// when the provider sent `Retry-After`.
    #[error("{}", rate_limited_text(.message, .retry_after_secs))]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A failure described only by its message.
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// The text shown to the user for this failure.
    ///
    /// Falls back to [`DEFAULT_ERROR_MESSAGE`] when the error has nothing to say.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            DEFAULT_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

fn rate_limited_text(message: &str, retry_after_secs: &Option<u64>) -> String {
    let message = match message.trim() {
        "" => "Rate limited by provider",
        m => m,
    };
    match retry_after_secs {
        Some(secs) => format!("{message} (retry after {secs}s)"),
        None => message.to_string(),
    }
}

#[derive(Debug, Clone, Error)]
pub enum SnapshotError {
    #[error("Malformed conversation snapshot: {0}")]
    Malformed(String),
}
