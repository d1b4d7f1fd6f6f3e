//! Error types for the swipe quiz.

/// Errors raised while advancing a quiz session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Question id is not part of the deck
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    /// Answer was given for a card that is not on top of the deck
    #[error("question {got} answered out of turn (expected {expected})")]
    OutOfTurn {
        /// Question currently on top of the deck
        expected: String,
        /// Question the answer was given for
        got: String,
    },

    /// Every question has already been answered
    #[error("deck is complete")]
    DeckComplete,
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, Error>;
