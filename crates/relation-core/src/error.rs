//! Error types for Relation services.

/// Errors surfaced by service operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller input was rejected
    #[error("invalid input: {0}")]
    Validation(String),

    /// Requested entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Store failure
    #[error("store error: {0}")]
    Store(relation_store::Error),

    /// Similarity / clustering / vector index failure
    #[error("search error: {0}")]
    Search(#[from] relation_search::Error),

    /// Embedding or summarizer failure
    #[error("model error: {0}")]
    Llm(#[from] relation_llm::Error),

    /// Spreadsheet mirror failure
    #[error("sheets error: {0}")]
    Sheets(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Optional collaborator is not configured
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// General internal error
    #[error("{0}")]
    Internal(String),
}

impl From<relation_store::Error> for Error {
    fn from(e: relation_store::Error) -> Self {
        match e {
            relation_store::Error::Validation(msg) => Self::Validation(msg),
            other => Self::Store(other),
        }
    }
}

impl From<relation_quiz::Error> for Error {
    fn from(e: relation_quiz::Error) -> Self {
        Self::Validation(e.to_string())
    }
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, Error>;
