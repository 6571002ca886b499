//! `parley doctor`: Check the configuration and the completion service.

use parley_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Parley Doctor");
    println!("===============\n");

    let mut report = String::new();
    let config_path = AppConfig::config_path();
    if config_path.exists() {
        report.push_str(&format!("  ✅ Config file found at {}\n", config_path.display()));
    } else {
        report.push_str("  ⚠️  No config file; using defaults (run `parley config init`)\n");
    }

    let issues = match AppConfig::load() {
        Ok(config) => {
            report.push_str("  ✅ Config valid\n");
            check_service(&config, &mut report).await
        }
        Err(e) => {
            report.push_str(&format!("  ❌ Config invalid: {e}\n"));
            1
        }
    };

    print!("{report}");
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }
    Ok(())
}

/// Append one line per check to `out` and return the number of issues.
async fn check_service(config: &AppConfig, out: &mut String) -> usize {
    let mut issues = 0;

    if config.has_api_key() {
        out.push_str("  ✅ API key configured\n");
    } else if config.provider == "ollama" {
        out.push_str("  ✅ No API key needed for ollama\n");
    } else {
        out.push_str("  ⚠️  No API key: set api_key, PARLEY_API_KEY or OPENAI_API_KEY\n");
        issues += 1;
    }

    let provider = match parley_providers::build_from_config(config) {
        Ok(provider) => provider,
        Err(e) => {
            out.push_str(&format!("  ❌ Provider '{}' unusable: {e}\n", config.provider));
            return issues + 1;
        }
    };

    match provider.health_check().await {
        Ok(true) => out.push_str(&format!("  ✅ {} reachable\n", provider.name())),
        Ok(false) => {
            out.push_str(&format!(
                "  ❌ {} answered with an error (check the API key and URL)\n",
                provider.name()
            ));
            return issues + 1;
        }
        Err(e) => {
            out.push_str(&format!("  ❌ {} unreachable: {e}\n", provider.name()));
            return issues + 1;
        }
    }

    match provider.list_models().await {
        Ok(models) if models.iter().any(|m| *m == config.model) => {
            out.push_str(&format!("  ✅ Model '{}' available\n", config.model));
        }
        Ok(models) if models.is_empty() => {
            out.push_str(&format!(
                "  ⚠️  Service did not list models; '{}' not confirmed\n",
                config.model
            ));
        }
        Ok(models) => {
            out.push_str(&format!(
                "  ⚠️  Model '{}' not listed ({} others available)\n",
                config.model,
                models.len()
            ));
            issues += 1;
        }
        Err(e) => {
            out.push_str(&format!("  ⚠️  Could not list models: {e}\n"));
            issues += 1;
        }
    }

    issues
}
