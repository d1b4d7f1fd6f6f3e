//! Relation LLM - Embedding and Summarization Clients
//!
//! This crate provides model access for the directory:
//! - Embeddings: `EmbeddingProvider` trait and an OpenAI-compatible client
//! - Summarizer: `ClusterSummarizer` trait and a chat-completion client
//!   that names intro clusters
//!
//! Both clients make a single request per call; callers decide what a
//! failure means.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod embeddings;
pub mod error;
pub mod summarizer;
mod util;

pub use embeddings::{
    EmbeddingProvider, OpenAiEmbeddings, OpenAiEmbeddingsConfig, SharedEmbeddingProvider,
    DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL, OPENAI_API_BASE,
};
pub use error::{Error, Result};
pub use summarizer::{
    parse_keywords, ClusterSample, ClusterSummarizer, OpenAiSummarizer, OpenAiSummarizerConfig,
    DEFAULT_SUMMARY_MODEL,
};
