//! Production configuration validation
//!
//! Risky settings are reported, never fatal.

use super::config::AppConfig;
use tracing::warn;

/// Warn about settings that are unsafe in production
pub fn validate_production_config(config: &AppConfig) {
    let is_production = std::env::var("RELATION_ENV")
        .map(|v| v.to_lowercase() == "production")
        .unwrap_or(false);

    if !is_production {
        return;
    }

    for warning in production_warnings(config) {
        warn!("CONFIG WARNING: {}", warning);
    }
}

fn production_warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.server.host == "0.0.0.0" {
        warnings.push(
            "Server is binding to all interfaces (0.0.0.0). \
             Consider binding to 127.0.0.1 behind a reverse proxy."
                .to_string(),
        );
    }

    if config.openai.api_key.trim().is_empty() {
        warnings.push(
            "OPENAI_API_KEY is not set. Embedding sync, vector search and cluster \
             summaries are disabled."
                .to_string(),
        );
    }

    if config.pinecone.host.trim().is_empty() {
        warnings.push(
            "No Pinecone host configured. Similarity queries scan stored \
             embeddings in process."
                .to_string(),
        );
    } else if config.pinecone.api_key.trim().is_empty() {
        warnings.push("Pinecone host is set but PINECONE_API_KEY is missing.".to_string());
    }

    if !config.sheets.spreadsheet_id.trim().is_empty() && config.sheets.token.trim().is_empty() {
        warnings.push(
            "Spreadsheet id is set but GOOGLE_SHEETS_TOKEN is missing. \
             Profile mirroring is disabled."
                .to_string(),
        );
    }

    if config.clusters.seed.is_some() {
        warnings.push("clusters.seed is fixed; k-means reseeding is deterministic.".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_for_risky_settings() {
        let mut config = AppConfig::default();
        config.server.host = "0.0.0.0".into();
        config.sheets.spreadsheet_id = "sheet".into();
        let warnings = production_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("0.0.0.0")));
        assert!(warnings.iter().any(|w| w.contains("OPENAI_API_KEY")));
        assert!(warnings.iter().any(|w| w.contains("GOOGLE_SHEETS_TOKEN")));
    }

    #[test]
    fn test_quiet_when_fully_configured() {
        let mut config = AppConfig::default();
        config.openai.api_key = "sk".into();
        config.pinecone.host = "idx".into();
        config.pinecone.api_key = "pc".into();
        assert!(production_warnings(&config).is_empty());
    }
}
