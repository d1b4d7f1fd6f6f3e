//! Embedding providers for profile facets
//!
//! - `EmbeddingProvider` trait for abstraction
//! - `OpenAiEmbeddings` talking to any OpenAI-compatible `/embeddings` endpoint
//!
//! # Example
//!
//! ```ignore
//! use relation_llm::{EmbeddingProvider, OpenAiEmbeddings, OpenAiEmbeddingsConfig};
//!
//! let provider = OpenAiEmbeddings::new(OpenAiEmbeddingsConfig::from_env()?)?;
//! let vectors = provider.embed_batch(&["I build compilers".to_string()]).await?;
//! ```

use crate::error::{Error, Result};
use crate::util::{mask_api_key, sanitize_api_error};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// OpenAI API base URL
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";

/// Output size of [`DEFAULT_EMBEDDING_MODEL`]
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 3072;

/// Trait for embedding providers
///
/// Embedding providers convert text into dense vector representations
/// suitable for semantic similarity search.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidResponse("empty embedding result".to_string()))
    }

    /// Generate embeddings for multiple texts, one vector per input in order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimension
    fn dimensions(&self) -> usize;

    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the model name
    fn model(&self) -> &str;
}

/// Wrapper for thread-safe embedding provider access
pub type SharedEmbeddingProvider = Arc<dyn EmbeddingProvider>;

/// OpenAI embeddings configuration
#[derive(Clone)]
pub struct OpenAiEmbeddingsConfig {
    /// API key
    pub api_key: String,
    /// Base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Expected output size
    pub dimensions: usize,
    /// Request timeout
    pub timeout: Duration,
}

// SECURITY: Custom Debug implementation to mask API key
impl fmt::Debug for OpenAiEmbeddingsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiEmbeddingsConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiEmbeddingsConfig {
    /// Create a new configuration with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_API_BASE.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            timeout: Duration::from_secs(60),
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::NotConfigured("OPENAI_API_KEY not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    /// Set the model and its output size
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// OpenAI-compatible embeddings client. No retries.
pub struct OpenAiEmbeddings {
    client: Client,
    config: OpenAiEmbeddingsConfig,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

impl OpenAiEmbeddings {
    /// Create a new client
    pub fn new(config: OpenAiEmbeddingsConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::NotConfigured("missing OpenAI API key".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
    }
}

fn into_ordered(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>> {
    data.sort_by_key(|d| d.index);
    if data.len() != expected {
        return Err(Error::InvalidResponse(format!(
            "got {} embeddings for {} inputs",
            data.len(),
            expected
        )));
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.config.model))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(sanitize_api_error(&e.to_string())))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Api(sanitize_api_error(&error_text)));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        let embeddings = into_ordered(parsed.data, texts.len())?;
        debug!("Generated {} embeddings", embeddings.len());
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoLength;

    #[async_trait]
    impl EmbeddingProvider for EchoLength {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }
    }

    #[tokio::test]
    async fn test_default_embed_uses_batch() {
        let v = EchoLength.embed("abcd").await.unwrap();
        assert_eq!(v, vec![4.0, 1.0]);
    }

    #[test]
    fn test_response_is_reordered_by_index() {
        let data = vec![
            EmbeddingData {
                embedding: vec![2.0],
                index: 1,
            },
            EmbeddingData {
                embedding: vec![1.0],
                index: 0,
            },
        ];
        assert_eq!(into_ordered(data, 2).unwrap(), vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_count_mismatch_is_error() {
        let data = vec![EmbeddingData {
            embedding: vec![1.0],
            index: 0,
        }];
        assert!(matches!(
            into_ordered(data, 2),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_config_builder_and_debug() {
        let config = OpenAiEmbeddingsConfig::new("sk-proj-1234567890abcdefghij")
            .with_model("text-embedding-3-small", 1536)
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.model, "text-embedding-3-small");
        assert_eq!(config.dimensions, 1536);
        assert!(!format!("{:?}", config).contains("1234567890abcdef"));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(OpenAiEmbeddings::new(OpenAiEmbeddingsConfig::new("  ")).is_err());
    }
}
