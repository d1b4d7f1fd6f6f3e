//! Relation Quiz - founder swipe-card personality quiz
//!
//! Classifies a participant along four bipolar dimensions from a deck of
//! yes/no prompts.
//!
//! # Architecture
//!
//! ```text
//! QuestionDeck (static)
//!        │
//!   SwipeSession ──► answer log (append / undo)
//!        │
//!   aggregate() ──► DimensionScores ──► classify() ──► Archetype
//!        │
//!   build_answer_vector() ──► Vec<f64> (persistence / analysis)
//! ```
//!
//! Everything in this crate is synchronous and side-effect free. Session
//! state is a plain value: operations take it by value and hand back the
//! next state, so scoring can be tested without any runtime.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod archetype;
pub mod deck;
pub mod error;
pub mod scoring;
pub mod session;
pub mod vector;

pub use archetype::{classify, profile_code, Archetype, ArchetypeId};
pub use deck::{Dimension, DimensionMeta, Pole, Polarity, Question, QuestionDeck};
pub use error::{Error, Result};
pub use scoring::{
    aggregate, score_dimensions, summarize, time_confidence, DimensionScore, DimensionScores,
    ProfileSummary,
};
pub use session::{AnswerLogEntry, AnswerValue, SwipeSession};
pub use vector::build_answer_vector;
