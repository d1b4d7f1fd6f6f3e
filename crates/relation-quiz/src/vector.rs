//! Answer vector: one slot per deck question, for persistence.
//!
//! Confidence here is relative to the participant's own mean latency,
//! unlike [`crate::scoring::time_confidence`] which uses a fixed curve.

use crate::deck::QuestionDeck;
use crate::session::AnswerLogEntry;

/// Latencies below this are treated as this value.
const MIN_LATENCY_MS: f64 = 120.0;
const MIN_CONFIDENCE: f64 = 0.25;
const MAX_CONFIDENCE: f64 = 2.5;

fn floored_latency(ms: f64) -> f64 {
    if ms.is_finite() {
        ms.max(MIN_LATENCY_MS)
    } else {
        MIN_LATENCY_MS
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Build a deck-aligned vector of `sign(answer) * confidence`.
///
/// Unanswered positions stay `0.0`; answers for unknown questions are
/// skipped. Values are rounded to four decimals.
pub fn build_answer_vector(deck: &QuestionDeck, log: &[AnswerLogEntry]) -> Vec<f64> {
    let mut vector = vec![0.0; deck.len()];
    if log.is_empty() {
        return vector;
    }

    let latencies: Vec<f64> = log.iter().map(|e| floored_latency(e.duration_ms)).collect();
    let mean = latencies.iter().sum::<f64>() / latencies.len() as f64;

    for (entry, latency) in log.iter().zip(&latencies) {
        let Some(slot) = deck.position(&entry.question_id) else {
            continue;
        };
        let confidence = (mean / latency).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);
        vector[slot] = round4(entry.answer.sign() * confidence);
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AnswerValue;
    use chrono::Utc;

    fn entry(id: &str, answer: AnswerValue, ms: f64) -> AnswerLogEntry {
        AnswerLogEntry {
            question_id: id.into(),
            answer,
            duration_ms: ms,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_log_is_all_zero() {
        let deck = QuestionDeck::founder();
        let v = build_answer_vector(&deck, &[]);
        assert_eq!(v.len(), 20);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_identical_latencies_give_unit_confidence() {
        let deck = QuestionDeck::founder();
        let log = vec![
            entry("q1", AnswerValue::Yes, 900.0),
            entry("q2", AnswerValue::No, 900.0),
            entry("q3", AnswerValue::Yes, 900.0),
        ];
        let v = build_answer_vector(&deck, &log);
        assert_eq!(&v[..3], &[1.0, -1.0, 1.0]);
        assert!(v[3..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_relative_confidence_and_floor() {
        let deck = QuestionDeck::founder();
        // 10 ms floors to 120; mean = (120 + 1080) / 2 = 600
        let log = vec![
            entry("q1", AnswerValue::Yes, 10.0),
            entry("q2", AnswerValue::Yes, 1080.0),
        ];
        let v = build_answer_vector(&deck, &log);
        assert_eq!(v[0], 2.5); // 600 / 120 = 5, clamped
        assert_eq!(v[1], 0.5556); // 600 / 1080
    }

    #[test]
    fn test_slow_answer_is_clamped_low() {
        let deck = QuestionDeck::founder();
        let log = vec![
            entry("q1", AnswerValue::No, 120.0),
            entry("q2", AnswerValue::No, 120.0),
            entry("q3", AnswerValue::No, 120.0),
            entry("q4", AnswerValue::No, 100_000.0),
        ];
        let v = build_answer_vector(&deck, &log);
        assert_eq!(v[3], -0.25);
    }

    #[test]
    fn test_unknown_ids_are_skipped() {
        let deck = QuestionDeck::founder();
        let log = vec![entry("ghost", AnswerValue::Yes, 500.0)];
        assert!(build_answer_vector(&deck, &log).iter().all(|&x| x == 0.0));
    }
}
