//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(
            File::with_name(&format!(
                "config/{}",
                std::env::var("RELATION_ENV").unwrap_or_else(|_| "development".to_string())
            ))
            .required(false),
        )
        .add_source(File::with_name("config/local").required(false))
        // 3. Environment variables (highest priority), e.g. RELATION_SERVER__PORT
        .add_source(
            Environment::with_prefix("RELATION")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: AppConfig = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;
    apply_secret_env(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

/// Fill unset secrets from their well-known environment variables.
fn apply_secret_env(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let slots: [(&mut String, &str); 3] = [
        (&mut config.openai.api_key, "OPENAI_API_KEY"),
        (&mut config.pinecone.api_key, "PINECONE_API_KEY"),
        (&mut config.sheets.token, "GOOGLE_SHEETS_TOKEN"),
    ];
    for (slot, var) in slots {
        if slot.trim().is_empty() {
            if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
                *slot = value;
            }
        }
    }
    if config.pinecone.host.trim().is_empty() {
        if let Some(host) = lookup("PINECONE_HOST") {
            config.pinecone.host = host;
        }
    }
    if config.sheets.spreadsheet_id.trim().is_empty() {
        if let Some(id) = lookup("GOOGLE_SHEETS_SPREADSHEET_ID") {
            config.sheets.spreadsheet_id = id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_parse() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.sheets.sheet_name, "Profiles");
        assert_eq!(config.auth.cookie_name, "relation_session");
        assert_eq!(config.effects.queue_capacity, 256);
        assert!(config.clusters.seed.is_none());
    }

    #[test]
    fn test_secret_env_fills_only_empty_slots() {
        let mut config = AppConfig::default();
        config.sheets.token = "from-file".into();
        apply_secret_env(&mut config, |name| match name {
            "OPENAI_API_KEY" => Some("sk-env".into()),
            "GOOGLE_SHEETS_TOKEN" => Some("from-env".into()),
            "PINECONE_HOST" => Some("idx.pinecone.io".into()),
            _ => None,
        });
        assert_eq!(config.openai.api_key, "sk-env");
        assert_eq!(config.sheets.token, "from-file");
        assert!(config.pinecone.api_key.is_empty());
        assert_eq!(config.pinecone.host, "idx.pinecone.io");
    }
}
