//! `parley config`: Configuration management commands.

use std::path::Path;

use parley_config::AppConfig;

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", render_redacted(&config)?);
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_path();
    if write_default(&config_path)? {
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Add your API key (or set PARLEY_API_KEY / OPENAI_API_KEY)");
        println!("   2. Run: parley serve");
    } else {
        println!("⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete it and re-run `parley config init`.");
    }
    Ok(())
}

/// TOML for `config`, with the API key masked.
fn render_redacted(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some("[REDACTED]".into());
    }
    toml::to_string_pretty(&shown)
}

/// Write the default config to `path` unless a file is already there.
fn write_default(path: &Path) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_valid() {
        let path = AppConfig::config_path();
        assert!(path.to_str().unwrap().contains("config.toml"));
    }

    #[test]
    fn show_masks_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let text = render_redacted(&config).unwrap();
        assert!(!text.contains("sk-secret"));
        assert!(text.contains("[REDACTED]"));
        assert!(text.contains("gpt-3.5-turbo"));
    }

    #[test]
    fn init_writes_loadable_default_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(write_default(&path).unwrap());
        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.model, "gpt-3.5-turbo");
        assert_eq!(loaded.context.preset, "pun-generator");

        std::fs::write(&path, "model = \"custom\"\n").unwrap();
        assert!(!write_default(&path).unwrap());
        assert_eq!(AppConfig::load_from(&path).unwrap().model, "custom");
    }
}
