//! Completion requests and the action result record.

use std::sync::Arc;

use parley_config::{AppConfig, ConfigError};
use parley_core::provider::{Provider, ProviderRequest};
use parley_core::{ChatSession, ContextPrefix, Conversation, Turn};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assembler::assemble;

/// A completion that failed, carrying the text to show the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CompletionFailure(pub String);

/// The outcome of one submitted message.
///
/// `answer` and `error` are mutually exclusive: on failure `answer` is empty
/// and `error` holds the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    /// The user's message, as submitted
    pub message: String,

    pub answer: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// The history the request was made with
    pub chat_history: Conversation,
}

impl ActionResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The turn to append after the user's message, if any.
    ///
    /// Failures become flagged error turns; an empty answer adds nothing.
    pub fn reply_turn(&self) -> Option<Turn> {
        match &self.error {
            Some(error) => Some(Turn::error(error.as_str())),
            None if !self.answer.is_empty() => Some(Turn::assistant(self.answer.as_str())),
            None => None,
        }
    }

    /// The echoed history followed by the user's message and the reply turn.
    pub fn updated_history(&self) -> Conversation {
        let mut conversation = self.chat_history.clone();
        conversation.push(Turn::user(self.message.as_str()));
        if let Some(turn) = self.reply_turn() {
            conversation.push(turn);
        }
        conversation
    }
}

/// Sends assembled conversations to a provider with a fixed model and context.
pub struct Completer {
    provider: Arc<dyn Provider>,
    model: String,
    context: ContextPrefix,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl Completer {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, context: ContextPrefix) -> Self {
        Self {
            provider,
            model: model.into(),
            context,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Build a completer from configuration.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Result<Self, ConfigError> {
        let context = config.context.prefix()?;
        let mut completer = Self::new(provider, &config.model, context);
        completer.temperature = config.temperature;
        completer.max_tokens = config.max_tokens;
        Ok(completer)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn context(&self) -> &ContextPrefix {
        &self.context
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send an assembled message list and wait for the whole reply.
    ///
    /// The reply is returned verbatim. Every provider failure is converted
    /// here into its user-facing message; nothing is retried.
    pub async fn complete(&self, messages: Vec<Turn>) -> Result<String, CompletionFailure> {
        let mut request = ProviderRequest::new(&self.model, messages);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        match self.provider.complete(request).await {
            Ok(response) => {
                info!(
                    provider = %self.provider.name(),
                    model = %response.model,
                    reply_len = response.message.content().len(),
                    "Completion succeeded"
                );
                Ok(response.message.content().to_string())
            }
            Err(e) => {
                warn!(provider = %self.provider.name(), error = %e, "Completion failed");
                Err(CompletionFailure(e.user_message()))
            }
        }
    }

    /// Run one action: assemble, complete, and shape the result record.
    pub async fn respond(&self, history: &Conversation, message: &str) -> ActionResult {
        let messages = assemble(&self.context, history, message);

        let (answer, error) = match self.complete(messages).await {
            Ok(answer) => (answer, None),
            Err(CompletionFailure(error)) => (String::new(), Some(error)),
        };

        ActionResult {
            message: message.to_string(),
            answer,
            error,
            chat_history: history.clone(),
        }
    }

    /// Run one action against a session and record its turns.
    pub async fn respond_in(&self, session: &mut ChatSession, message: &str) -> ActionResult {
        let result = self.respond(session.history(), message).await;

        session.record(Turn::user(message));
        if let Some(turn) = result.reply_turn() {
            session.record(turn);
        }

        result
    }
}
