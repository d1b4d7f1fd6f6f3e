//! Relation Store - SQLite persistence
//!
//! One SQLite database holds the member directory and the quiz mirror:
//!
//! ```text
//! ┌────────────────────────── RelationStore ──────────────────────────┐
//! │  profiles ◄── likes            quiz_sessions ◄── quiz_answers     │
//! │     ▲                                                             │
//! │  profile_embeddings            quiz_analytics                     │
//! │     │                                                             │
//! │  intro_cluster_cache (single row, keyed by newest embedding time) │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Embeddings are stored as JSON text; interpreting them is left to the
//! search layer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod store;
pub mod types;

pub use error::{Error, Result};
pub use store::RelationStore;
pub use types::{
    AnalyticsEvent, AnalyticsFilter, ClusterCacheEntry, EmbeddingRow, NewAnalyticsEvent,
    NewProfile, Profile, ProfilePatch, QuizAnswerRecord, QuizSessionRecord, QuizSessionResult,
    QuizSessionStatus, MAX_ANALYTICS_ROWS,
};
