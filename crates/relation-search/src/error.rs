//! Error types for relation-search

use thiserror::Error;

/// Error type for similarity, clustering and index operations
#[derive(Error, Debug)]
pub enum Error {
    /// Nothing to cluster
    #[error("Cannot cluster an empty vector set")]
    EmptyInput,

    /// Vectors in one call do not share a length
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: usize,
        /// Actual dimensions
        actual: usize,
    },

    /// Invalid clustering parameter
    #[error("Invalid cluster count: {0}")]
    InvalidK(usize),

    /// Vector index request failed
    #[error("Index error: {0}")]
    Index(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for search operations
pub type Result<T> = std::result::Result<T, Error>;
