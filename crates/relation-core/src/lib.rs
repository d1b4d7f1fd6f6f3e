//! Relation Core - Directory, Recommendation and Quiz Services
//!
//! This crate wires storage, embeddings and the vector index into the
//! operations the server exposes:
//! - Directory: profile CRUD with spreadsheet mirroring
//! - Likes: who liked whom
//! - Recommend: per-facet "AI picks"
//! - Search: substring and semantic search
//! - Clusters: cached intro clusters with optional model keywords
//! - Sync: facet embedding sync and intro backfill
//! - Quiz: swipe quiz runs, persistence and analytics
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Directory · Likes · Recommender · Search · IntroClusters     │
//! │  FacetSync · QuizRuns                                         │
//! └───────────────────────────────────────────────────────────────┘
//!          │ sync writes                 │ best-effort writes
//!          ▼                             ▼
//! ┌──────────────────────┐     ┌─────────────────────────────────┐
//! │  RelationStore       │     │  SideEffectQueue (one worker)   │
//! │  (SQLite)            │◄────│  sheets · facet sync · quiz log │
//! └──────────────────────┘     └─────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clusters;
pub mod directory;
pub mod effects;
pub mod error;
pub mod likes;
pub mod quiz;
pub mod recommend;
pub mod search;
pub mod sheets;
pub mod sync;

#[cfg(test)]
mod testing;

pub use clusters::{ClusterResponse, IntroClusters};
pub use directory::{Directory, SessionUser};
pub use effects::{SideEffectQueue, DEFAULT_QUEUE_CAPACITY};
pub use error::{Error, Result};
pub use likes::{LikeState, Likes};
pub use quiz::{
    AnalyticsOutcome, AnswerInput, Participant, Progress, QuizRuns, RunView,
    ANONYMOUS_PARTICIPANT,
};
pub use recommend::{AiPicks, Recommender, DEFAULT_PICK_LIMIT};
pub use search::{matched_fields, Search, SearchResults, TextMatch, DEFAULT_SEARCH_LIMIT};
pub use sheets::{GoogleSheetsSink, SheetRow, SheetSink, DEFAULT_SHEET_NAME};
pub use sync::{
    facet_texts, BackfillReport, FacetSync, SyncReport, BACKFILL_BATCH_SIZE,
    DEFAULT_BACKFILL_LIMIT,
};
