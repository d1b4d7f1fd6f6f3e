//! Cluster keyword summarizer over chat completions.
//!
//! Reads up to ten member intros of a cluster and asks the model for two to
//! four short theme keywords, answered as `{"keywords": [...]}`.

use crate::embeddings::OPENAI_API_BASE;
use crate::error::{Error, Result};
use crate::util::{mask_api_key, sanitize_api_error};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default summarization model
pub const DEFAULT_SUMMARY_MODEL: &str = "gpt-4o-mini";

/// Members sampled per cluster
pub const SAMPLE_SIZE: usize = 10;

/// Keywords kept from a model answer
pub const MAX_KEYWORDS: usize = 4;

const SYSTEM_PROMPT: &str = "You are an analyst who reads several self-introductions and \
summarizes their common themes. Always answer with a JSON object of the form \
{\"keywords\":[\"keyword1\",\"keyword2\",...]} and nothing else. Give 2 to 4 keywords of one \
or two words each and leave out greetings and meaningless words.";

/// One member of a cluster as seen by the summarizer.
#[derive(Debug, Clone)]
pub struct ClusterSample {
    /// Member display name
    pub name: Option<String>,
    /// Member intro snippet
    pub snippet: String,
}

/// Turns a cluster's intros into theme keywords.
#[async_trait]
pub trait ClusterSummarizer: Send + Sync {
    /// Keywords for a cluster, or `None` when the model gave nothing usable.
    async fn summarize(&self, members: &[ClusterSample]) -> Result<Option<Vec<String>>>;
}

/// Chat-completion summarizer configuration
#[derive(Clone)]
pub struct OpenAiSummarizerConfig {
    /// API key
    pub api_key: String,
    /// Base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
}

// SECURITY: Custom Debug implementation to mask API key
impl fmt::Debug for OpenAiSummarizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSummarizerConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenAiSummarizerConfig {
    /// Create a new configuration with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_API_BASE.to_string(),
            model: DEFAULT_SUMMARY_MODEL.to_string(),
            temperature: 0.2,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Summarizer backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiSummarizer {
    client: Client,
    config: OpenAiSummarizerConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct KeywordAnswer {
    keywords: Vec<serde_json::Value>,
}

impl OpenAiSummarizer {
    /// Create a new summarizer
    pub fn new(config: OpenAiSummarizerConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::NotConfigured("missing OpenAI API key".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { client, config })
    }
}

/// Numbered sample of up to [`SAMPLE_SIZE`] members: `1. (Name) snippet`.
pub fn build_prompt(members: &[ClusterSample]) -> String {
    let sample = members
        .iter()
        .take(SAMPLE_SIZE)
        .enumerate()
        .map(|(i, m)| match m.name.as_deref() {
            Some(name) => format!("{}. ({}) {}", i + 1, name, m.snippet.trim()),
            None => format!("{}. {}", i + 1, m.snippet.trim()),
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Summarize the shared interests and themes of the following self-introductions \
         as meaningful keywords.\n\n{sample}"
    )
}

/// Extract keywords from a model answer.
///
/// Strips code fences, expects `{"keywords": [...]}`, keeps trimmed
/// non-empty strings, at most [`MAX_KEYWORDS`]. Anything else yields `None`.
pub fn parse_keywords(raw: &str) -> Option<Vec<String>> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let answer: KeywordAnswer = serde_json::from_str(cleaned.trim()).ok()?;
    Some(
        answer
            .keywords
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(MAX_KEYWORDS)
            .map(str::to_string)
            .collect(),
    )
}

#[async_trait]
impl ClusterSummarizer for OpenAiSummarizer {
    #[instrument(skip(self, members), fields(members = members.len(), model = %self.config.model))]
    async fn summarize(&self, members: &[ClusterSample]) -> Result<Option<Vec<String>>> {
        if members.is_empty() {
            return Ok(None);
        }

        let request = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(members),
                },
            ],
        };

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(sanitize_api_error(&e.to_string())))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Api(sanitize_api_error(&error_text)));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        let Some(raw) = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
        else {
            return Ok(None);
        };

        let keywords = parse_keywords(&raw);
        debug!(?keywords, "Cluster summary");
        Ok(keywords)
    }
}
