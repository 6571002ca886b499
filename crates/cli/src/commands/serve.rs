//! `parley serve`: Start the HTTP gateway.

use parley_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("💬 Parley");
    println!("   Open:      http://{}:{}/", config.gateway.host, config.gateway.port);
    println!("   Provider:  {} ({})", config.provider, config.model);
    println!("   Context:   {}", context_label(&config));

    parley_gateway::start(config).await?;

    Ok(())
}

/// Short description of the configured context prefix.
pub(crate) fn context_label(config: &AppConfig) -> String {
    if config.context.messages.is_empty() {
        config.context.preset.clone()
    } else {
        format!("custom ({} messages)", config.context.messages.len())
    }
}
