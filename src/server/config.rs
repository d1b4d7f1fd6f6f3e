//! Server configuration types
//!
//! Contains all configuration structures for the Relation server.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub openai: OpenAiAppConfig,
    #[serde(default)]
    pub pinecone: PineconeAppConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub clusters: ClustersConfig,
    #[serde(default)]
    pub effects: EffectsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Directory holding the database file.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join("relation")))
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    /// Full path of the SQLite database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(&self.database.file)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// SQLite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// File name inside the data directory
    #[serde(default = "default_db_file")]
    pub file: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            file: default_db_file(),
        }
    }
}

fn default_db_file() -> String {
    "relation.db".to_string()
}

/// Embedding and chat-completion settings
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiAppConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,
    #[serde(default = "default_summary_model")]
    pub summary_model: String,
    /// Ask the chat model for cluster keywords
    #[serde(default = "default_true")]
    pub summarize_clusters: bool,
    #[serde(default = "default_openai_timeout")]
    pub timeout_secs: u64,
}

// SECURITY: Custom Debug implementation to mask API key
impl std::fmt::Debug for OpenAiAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAppConfig")
            .field("api_key", &mask(&self.api_key))
            .field("base_url", &self.base_url)
            .field("embedding_model", &self.embedding_model)
            .field("embedding_dimensions", &self.embedding_dimensions)
            .field("summary_model", &self.summary_model)
            .field("summarize_clusters", &self.summarize_clusters)
            .finish()
    }
}

impl Default for OpenAiAppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            summary_model: default_summary_model(),
            summarize_clusters: true,
            timeout_secs: default_openai_timeout(),
        }
    }
}

fn default_openai_base() -> String {
    relation_llm::OPENAI_API_BASE.to_string()
}

fn default_embedding_model() -> String {
    relation_llm::DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_embedding_dimensions() -> usize {
    relation_llm::DEFAULT_EMBEDDING_DIMENSIONS
}

fn default_summary_model() -> String {
    relation_llm::DEFAULT_SUMMARY_MODEL.to_string()
}

fn default_openai_timeout() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

/// Remote vector index. An empty host keeps vectors in process memory.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct PineconeAppConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default = "default_pinecone_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for PineconeAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeAppConfig")
            .field("host", &self.host)
            .field("api_key", &mask(&self.api_key))
            .field("namespace", &self.namespace)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_pinecone_timeout() -> u64 {
    10
}

impl PineconeAppConfig {
    /// Host with a scheme; bare hosts get `https://`.
    pub fn normalized_host(&self) -> Option<String> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return None;
        }
        if host.starts_with("http://") || host.starts_with("https://") {
            Some(host.to_string())
        } else {
            Some(format!("https://{host}"))
        }
    }
}

/// Spreadsheet mirror. Disabled while `spreadsheet_id` or `token` is empty.
#[derive(Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default)]
    pub token: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_name: default_sheet_name(),
            token: String::new(),
        }
    }
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("sheet_name", &self.sheet_name)
            .field("token", &mask(&self.token))
            .finish()
    }
}

fn default_sheet_name() -> String {
    relation_core::DEFAULT_SHEET_NAME.to_string()
}

/// Intro clustering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClustersConfig {
    /// Fixed k-means reseed seed; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Side-effect queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectsConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_queue_capacity() -> usize {
    relation_core::DEFAULT_QUEUE_CAPACITY
}

/// Session cookie settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
        }
    }
}

fn default_cookie_name() -> String {
    crate::middleware::auth::DEFAULT_SESSION_COOKIE.to_string()
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "***"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinecone_host_normalization() {
        let mut cfg = PineconeAppConfig::default();
        assert_eq!(cfg.normalized_host(), None);
        cfg.host = "profiles-abc.svc.pinecone.io/".into();
        assert_eq!(
            cfg.normalized_host().as_deref(),
            Some("https://profiles-abc.svc.pinecone.io")
        );
        cfg.host = "http://localhost:5081".into();
        assert_eq!(cfg.normalized_host().as_deref(), Some("http://localhost:5081"));
    }

    #[test]
    fn test_secrets_are_masked() {
        let cfg = OpenAiAppConfig {
            api_key: "sk-secret".into(),
            ..Default::default()
        };
        assert!(!format!("{cfg:?}").contains("sk-secret"));
    }
}
