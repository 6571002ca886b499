//! Shared fixtures for gateway tests.

use std::sync::{Arc, Mutex};

use parley_chat::Completer;
use parley_config::AppConfig;
use parley_core::error::ProviderError;
use parley_core::provider::{Provider, ProviderRequest, ProviderResponse};
use parley_core::{ContextPreset, Turn};

use crate::{GatewayState, SharedState};

/// A provider with one canned outcome that records the requests it sees.
pub struct MockProvider {
    outcome: Result<String, ProviderError>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: ProviderError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(error),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);
        match &self.outcome {
            Ok(text) => Ok(ProviderResponse {
                message: Turn::assistant(text.as_str()),
                usage: None,
                model,
            }),
            Err(e) => Err(e.clone()),
        }
    }
}

/// Gateway state around `provider` with the helpful-assistant context.
pub fn test_state(provider: Arc<MockProvider>) -> SharedState {
    let config = AppConfig::default();
    let completer = Completer::new(
        provider,
        config.model.clone(),
        ContextPreset::HelpfulAssistant.prefix(),
    );
    Arc::new(GatewayState::new(config, completer).unwrap())
}
