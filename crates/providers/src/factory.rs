//! Provider factory: builds the configured completion provider.

use std::sync::Arc;
use std::time::Duration;

use parley_core::error::ProviderError;
use parley_core::provider::Provider;

use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider described by the configuration.
///
/// Every supported backend speaks the OpenAI chat-completions shape, so the
/// provider name only selects the default base URL.
pub fn build_from_config(
    config: &parley_config::AppConfig,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let base_url = match &config.api_url {
        Some(url) => url.clone(),
        None => default_base_url(&config.provider).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "provider '{}' has no default URL; set api_url",
                config.provider
            ))
        })?,
    };

    let api_key = match (&config.api_key, config.provider.as_str()) {
        (Some(key), _) => key.clone(),
        (None, "ollama") => "ollama".into(),
        (None, _) => String::new(),
    };

    tracing::debug!(provider = %config.provider, base_url = %base_url, "Building provider");

    let provider = OpenAiCompatProvider::new(
        &config.provider,
        base_url,
        api_key,
        Duration::from_secs(config.request_timeout_secs),
    )?;

    Ok(Arc::new(provider))
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "together" => "https://api.together.xyz/v1",
        "groq" => "https://api.groq.com/openai/v1",
        _ => return None,
    };
    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_config::AppConfig;

    #[test]
    fn default_config_builds_openai() {
        let provider = build_from_config(&AppConfig::default()).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn unknown_provider_needs_url() {
        let config = AppConfig {
            provider: "acme".into(),
            ..AppConfig::default()
        };
        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn explicit_url_enables_custom_provider() {
        let config = AppConfig {
            provider: "acme".into(),
            api_url: Some("http://localhost:9999/v1".into()),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "acme");
    }

    #[test]
    fn well_known_urls() {
        assert!(default_base_url("openrouter").unwrap().contains("openrouter.ai"));
        assert!(default_base_url("ollama").unwrap().contains("11434"));
        assert!(default_base_url("nope").is_none());
    }
}
