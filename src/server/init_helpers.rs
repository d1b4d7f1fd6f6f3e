//! Helper functions for server initialization
//!
//! Each external integration is optional: a missing key or a client that
//! fails to build disables the feature with a warning instead of aborting.

use super::config::AppConfig;
use relation_core::{GoogleSheetsSink, SheetSink};
use relation_llm::{
    ClusterSummarizer, OpenAiEmbeddings, OpenAiEmbeddingsConfig, OpenAiSummarizer,
    OpenAiSummarizerConfig, SharedEmbeddingProvider,
};
use relation_search::{PineconeConfig, PineconeIndex, VectorIndex};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Initialize the embedding provider (OpenAI-compatible)
pub fn init_embedding_provider(config: &AppConfig) -> Option<SharedEmbeddingProvider> {
    let cfg = &config.openai;
    if cfg.api_key.trim().is_empty() {
        info!("Embeddings disabled (no OpenAI API key)");
        return None;
    }
    let embeddings_config = OpenAiEmbeddingsConfig::new(cfg.api_key.clone())
        .with_base_url(cfg.base_url.clone())
        .with_model(cfg.embedding_model.clone(), cfg.embedding_dimensions)
        .with_timeout(Duration::from_secs(cfg.timeout_secs));
    match OpenAiEmbeddings::new(embeddings_config) {
        Ok(provider) => {
            info!(model = %cfg.embedding_model, "Embedding provider initialized");
            Some(Arc::new(provider))
        }
        Err(e) => {
            warn!("Failed to initialize embedding provider: {}", e);
            None
        }
    }
}

/// Initialize the Pinecone index, if configured
pub fn init_vector_index(config: &AppConfig) -> Option<Arc<dyn VectorIndex>> {
    let host = config.pinecone.normalized_host()?;
    let pinecone = PineconeConfig {
        host,
        api_key: config.pinecone.api_key.clone(),
        namespace: config.pinecone.namespace.clone(),
        timeout: Duration::from_secs(config.pinecone.timeout_secs),
    };
    match PineconeIndex::new(pinecone) {
        Ok(index) => {
            info!("Pinecone vector index initialized");
            Some(Arc::new(index))
        }
        Err(e) => {
            warn!("Pinecone disabled: {}", e);
            None
        }
    }
}

/// Initialize the spreadsheet mirror, if configured
pub fn init_sheet_sink(config: &AppConfig) -> Option<Arc<dyn SheetSink>> {
    let sheets = &config.sheets;
    if sheets.spreadsheet_id.trim().is_empty() {
        return None;
    }
    match GoogleSheetsSink::new(
        sheets.spreadsheet_id.clone(),
        sheets.sheet_name.clone(),
        sheets.token.clone(),
    ) {
        Ok(sink) => {
            info!(sheet = %sheets.sheet_name, "Spreadsheet mirror enabled");
            Some(Arc::new(sink))
        }
        Err(e) => {
            warn!("Spreadsheet mirror disabled: {}", e);
            None
        }
    }
}

/// Initialize the cluster keyword summarizer, if enabled
pub fn init_summarizer(config: &AppConfig) -> Option<Arc<dyn ClusterSummarizer>> {
    let cfg = &config.openai;
    if !cfg.summarize_clusters || cfg.api_key.trim().is_empty() {
        return None;
    }
    let summarizer_config = OpenAiSummarizerConfig::new(cfg.api_key.clone())
        .with_base_url(cfg.base_url.clone())
        .with_model(cfg.summary_model.clone());
    match OpenAiSummarizer::new(summarizer_config) {
        Ok(summarizer) => Some(Arc::new(summarizer)),
        Err(e) => {
            warn!("Cluster summaries disabled: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everything_optional_by_default() {
        let config = AppConfig::default();
        assert!(init_embedding_provider(&config).is_none());
        assert!(init_vector_index(&config).is_none());
        assert!(init_sheet_sink(&config).is_none());
        assert!(init_summarizer(&config).is_none());
    }

    #[test]
    fn test_sheet_sink_needs_token() {
        let mut config = AppConfig::default();
        config.sheets.spreadsheet_id = "sheet-1".into();
        assert!(init_sheet_sink(&config).is_none());
        config.sheets.token = "ya29.token".into();
        assert!(init_sheet_sink(&config).is_some());
    }
}
