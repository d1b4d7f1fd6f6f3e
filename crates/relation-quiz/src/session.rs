//! Swipe session state: the ordered answer log.
//!
//! The deck position is derived from the log (`answers.len()`), so there is
//! no second counter to drift. Operations consume the session and return
//! the next one.

use crate::deck::{Question, QuestionDeck};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerValue {
    /// Swipe right
    Yes,
    /// Swipe left
    No,
}

impl AnswerValue {
    /// `+1.0` for yes, `-1.0` for no.
    pub fn sign(self) -> f64 {
        match self {
            Self::Yes => 1.0,
            Self::No => -1.0,
        }
    }

    /// Whether this is a "yes".
    pub fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// One recorded answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerLogEntry {
    /// Question that was answered
    pub question_id: String,
    /// The answer
    pub answer: AnswerValue,
    /// Time from card shown to swipe, in milliseconds
    pub duration_ms: f64,
    /// When the answer was recorded
    pub recorded_at: DateTime<Utc>,
}

/// Answer log for one pass through the deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwipeSession {
    answers: Vec<AnswerLogEntry>,
}

impl SwipeSession {
    /// Empty session positioned at the first card.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers in the order they were given.
    pub fn answers(&self) -> &[AnswerLogEntry] {
        &self.answers
    }

    /// Index of the card on top of the deck.
    pub fn position(&self) -> usize {
        self.answers.len()
    }

    /// Question waiting for an answer, `None` once the deck is exhausted.
    pub fn current_question<'d>(&self, deck: &'d QuestionDeck) -> Option<&'d Question> {
        deck.get(self.position())
    }

    /// Whether every question in the deck has been answered.
    pub fn is_complete(&self, deck: &QuestionDeck) -> bool {
        self.position() >= deck.len()
    }

    /// Record an answer for the card on top of the deck.
    ///
    /// The answer must be for the current question. On failure the
    /// untouched session comes back alongside the error.
    pub fn record(
        mut self,
        deck: &QuestionDeck,
        question_id: &str,
        answer: AnswerValue,
        duration_ms: f64,
        recorded_at: DateTime<Utc>,
    ) -> std::result::Result<Self, (Self, Error)> {
        if deck.find(question_id).is_none() {
            return Err((self, Error::UnknownQuestion(question_id.to_string())));
        }
        let expected = match self.current_question(deck) {
            Some(q) => q.id.clone(),
            None => return Err((self, Error::DeckComplete)),
        };
        if expected != question_id {
            return Err((
                self,
                Error::OutOfTurn {
                    expected,
                    got: question_id.to_string(),
                },
            ));
        }
        self.answers.push(AnswerLogEntry {
            question_id: question_id.to_string(),
            answer,
            duration_ms,
            recorded_at,
        });
        Ok(self)
    }

    /// Convenience wrapper around [`SwipeSession::record`] for callers that
    /// do not need the session back on failure.
    pub fn try_record(
        self,
        deck: &QuestionDeck,
        question_id: &str,
        answer: AnswerValue,
        duration_ms: f64,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self> {
        self.record(deck, question_id, answer, duration_ms, recorded_at)
            .map_err(|(_, e)| e)
    }

    /// Drop the most recent answer, moving back one card. No-op when empty.
    pub fn undo(mut self) -> Self {
        self.answers.pop();
        self
    }

    /// Clear every answer.
    pub fn reset(self) -> Self {
        Self::new()
    }
}
