//! Score aggregation: weighted average per dimension with a latency-based
//! confidence multiplier.

use crate::archetype::{classify, profile_code, Archetype};
use crate::deck::{Dimension, QuestionDeck};
use crate::session::AnswerLogEntry;
use serde::Serialize;

/// Latency at which confidence reaches the floor.
const LATENCY_HORIZON_MS: f64 = 4000.0;
/// Lowest confidence any answer can get.
const MIN_TIME_CONFIDENCE: f64 = 0.35;
/// Total weight at which a dimension's confidence saturates.
const FULL_CONFIDENCE_WEIGHT: f64 = 4.0;

/// Confidence multiplier from response latency.
///
/// `clamp(1 - latency/4000, 0.35, 1)`. Non-finite or non-positive latencies
/// count as instantaneous.
pub fn time_confidence(duration_ms: f64) -> f64 {
    if !duration_ms.is_finite() || duration_ms <= 0.0 {
        return 1.0;
    }
    (1.0 - duration_ms / LATENCY_HORIZON_MS).clamp(MIN_TIME_CONFIDENCE, 1.0)
}

/// Raw per-dimension scores in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DimensionScores {
    /// Vision score
    pub vision: f64,
    /// Drive score
    pub drive: f64,
    /// Team score
    pub team: f64,
    /// Execution score
    pub execution: f64,
}

impl DimensionScores {
    /// Score for one dimension.
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Vision => self.vision,
            Dimension::Drive => self.drive,
            Dimension::Team => self.team,
            Dimension::Execution => self.execution,
        }
    }

    fn set(&mut self, dimension: Dimension, value: f64) {
        match dimension {
            Dimension::Vision => self.vision = value,
            Dimension::Drive => self.drive = value,
            Dimension::Team => self.team = value,
            Dimension::Execution => self.execution = value,
        }
    }
}

/// Weighted sums before normalisation.
#[derive(Debug, Default)]
struct Totals {
    weighted: [f64; 4],
    weight: [f64; 4],
}

fn accumulate(deck: &QuestionDeck, log: &[AnswerLogEntry]) -> Totals {
    let mut totals = Totals::default();
    for entry in log {
        let Some(question) = deck.find(&entry.question_id) else {
            continue;
        };
        let slot = question.dimension.index();
        let polarity_match = entry.answer.sign() * question.polarity.sign();
        totals.weighted[slot] +=
            polarity_match * question.weight * time_confidence(entry.duration_ms);
        totals.weight[slot] += question.weight;
    }
    totals
}

fn normalise(weighted: f64, weight: f64) -> f64 {
    if weight == 0.0 {
        return 0.0;
    }
    (weighted / weight).clamp(-1.0, 1.0)
}

/// Aggregate an answer log into one score per dimension.
///
/// Answers for questions outside the deck are ignored. A dimension with no
/// answers scores 0.
pub fn aggregate(deck: &QuestionDeck, log: &[AnswerLogEntry]) -> DimensionScores {
    let totals = accumulate(deck, log);
    let mut scores = DimensionScores::default();
    for dim in Dimension::ALL {
        let i = dim.index();
        scores.set(dim, normalise(totals.weighted[i], totals.weight[i]));
    }
    scores
}

/// A dimension score decorated with the pole it points at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionScore {
    /// Dimension
    pub dimension: Dimension,
    /// Axis caption
    pub axis: &'static str,
    /// Score in [-1, 1]
    pub score: f64,
    /// How much evidence backs the score, in [0, 1]
    pub confidence: f64,
    /// Letter of the indicated pole
    pub letter: &'static str,
    /// Label of the indicated pole
    pub label: &'static str,
    /// Blurb of the indicated pole
    pub blurb: &'static str,
}

/// Per-dimension scores in [`Dimension::ALL`] order.
pub fn score_dimensions(deck: &QuestionDeck, log: &[AnswerLogEntry]) -> Vec<DimensionScore> {
    let totals = accumulate(deck, log);
    Dimension::ALL
        .iter()
        .map(|&dimension| {
            let i = dimension.index();
            let score = normalise(totals.weighted[i], totals.weight[i]);
            let meta = dimension.meta();
            let pole = meta.pole_for(score);
            DimensionScore {
                dimension,
                axis: meta.axis,
                score,
                confidence: (totals.weight[i] / FULL_CONFIDENCE_WEIGHT).clamp(0.0, 1.0),
                letter: pole.letter,
                label: pole.label,
                blurb: pole.blurb,
            }
        })
        .collect()
}

/// Full result of a session: code, axes and archetype.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    /// Four-letter profile code
    pub code: String,
    /// Decorated per-dimension scores
    pub axes: Vec<DimensionScore>,
    /// Selected archetype
    pub archetype: &'static Archetype,
}

impl ProfileSummary {
    /// Raw scores keyed by dimension.
    pub fn scores(&self) -> DimensionScores {
        let mut scores = DimensionScores::default();
        for axis in &self.axes {
            scores.set(axis.dimension, axis.score);
        }
        scores
    }
}

/// Score, code and classify an answer log.
pub fn summarize(deck: &QuestionDeck, log: &[AnswerLogEntry]) -> ProfileSummary {
    let axes = score_dimensions(deck, log);
    let mut scores = DimensionScores::default();
    for axis in &axes {
        scores.set(axis.dimension, axis.score);
    }
    ProfileSummary {
        code: profile_code(&scores),
        archetype: classify(&scores).archetype(),
        axes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{Polarity, Question};
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

    /// Answer every question of `dimension` so that it pushes towards the
    /// positive pole.
    fn aligned_log(deck: &QuestionDeck, dimension: Dimension, ms: f64) -> Vec<AnswerLogEntry> {
        deck.questions()
            .iter()
            .filter(|q| q.dimension == dimension)
            .map(|q| {
                let answer = match q.polarity {
                    Polarity::Positive => AnswerValue::Yes,
                    Polarity::Negative => AnswerValue::No,
                };
                entry(&q.id, answer, ms)
            })
            .collect()
    }

    #[test]
    fn test_time_confidence_curve() {
        assert_eq!(time_confidence(0.0), 1.0);
        assert_eq!(time_confidence(f64::NAN), 1.0);
        assert!((time_confidence(1000.0) - 0.75).abs() < 1e-12);
        assert_eq!(time_confidence(3900.0), 0.35);
        assert_eq!(time_confidence(60_000.0), 0.35);
    }

    #[test]
    fn test_empty_log_scores_zero() {
        let deck = QuestionDeck::founder();
        let scores = aggregate(&deck, &[]);
        assert_eq!(scores, DimensionScores::default());

        let axes = score_dimensions(&deck, &[]);
        assert!(axes.iter().all(|a| a.score == 0.0 && a.confidence == 0.0));
    }

    #[test]
    fn test_unanswered_dimension_stays_zero() {
        let deck = QuestionDeck::founder();
        let log = aligned_log(&deck, Dimension::Vision, 500.0);
        let scores = aggregate(&deck, &log);
        assert!(scores.vision > 0.0);
        assert_eq!(scores.drive, 0.0);
        assert_eq!(scores.team, 0.0);
        assert_eq!(scores.execution, 0.0);
    }

    #[test]
    fn test_aligned_vision_hits_curve_maximum() {
        let deck = QuestionDeck::founder();

        let log = aligned_log(&deck, Dimension::Vision, 1000.0);
        let vision = aggregate(&deck, &log).vision;
        assert!((vision - time_confidence(1000.0)).abs() < 1e-9);

        let instant = aligned_log(&deck, Dimension::Vision, 0.0);
        assert!((aggregate(&deck, &instant).vision - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_opposed_answers_are_negative() {
        let deck = QuestionDeck::founder();
        let log: Vec<_> = aligned_log(&deck, Dimension::Team, 0.0)
            .into_iter()
            .map(|mut e| {
                e.answer = match e.answer {
                    AnswerValue::Yes => AnswerValue::No,
                    AnswerValue::No => AnswerValue::Yes,
                };
                e
            })
            .collect();
        assert!((aggregate(&deck, &log).team + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_scores_stay_in_range_for_any_log() {
        let deck = QuestionDeck::founder();
        let latencies = [-5.0, 0.0, 1.0, 120.0, 999.0, 4000.0, 1e9, f64::INFINITY];
        for (i, &ms) in latencies.iter().enumerate() {
            let log: Vec<_> = deck
                .questions()
                .iter()
                .enumerate()
                .map(|(j, q)| {
                    let answer = if (i + j) % 3 == 0 {
                        AnswerValue::No
                    } else {
                        AnswerValue::Yes
                    };
                    entry(&q.id, answer, ms)
                })
                .collect();
            let scores = aggregate(&deck, &log);
            for dim in Dimension::ALL {
                let s = scores.get(dim);
                assert!((-1.0..=1.0).contains(&s), "{dim} = {s}");
            }
        }
    }

    #[test]
    fn test_weighting_and_unknown_ids() {
        let deck = QuestionDeck::new(
            "test",
            vec![
                Question {
                    id: "a".into(),
                    prompt: "a".into(),
                    dimension: Dimension::Drive,
                    polarity: Polarity::Positive,
                    weight: 3.0,
                    tags: vec![],
                },
                Question {
                    id: "b".into(),
                    prompt: "b".into(),
                    dimension: Dimension::Drive,
                    polarity: Polarity::Positive,
                    weight: 1.0,
                    tags: vec![],
                },
            ],
        );
        let log = vec![
            entry("a", AnswerValue::Yes, 0.0),
            entry("b", AnswerValue::No, 0.0),
            entry("ghost", AnswerValue::Yes, 0.0),
        ];
        // (3 - 1) / 4
        assert!((aggregate(&deck, &log).drive - 0.5).abs() < 1e-12);
        let axes = score_dimensions(&deck, &log);
        assert_eq!(axes[Dimension::Drive.index()].confidence, 1.0);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let deck = QuestionDeck::founder();
        let log: Vec<_> = deck
            .questions()
            .iter()
            .map(|q| entry(&q.id, AnswerValue::Yes, 1500.0))
            .collect();
        assert_eq!(aggregate(&deck, &log), aggregate(&deck, &log));
    }

    #[test]
    fn test_summary_code_and_letters() {
        let deck = QuestionDeck::founder();
        let summary = summarize(&deck, &[]);
        // All zero: every letter is the positive pole.
        assert_eq!(summary.code, "VSCA");
        assert_eq!(summary.archetype.id, "systems-conductor");
        assert_eq!(summary.scores(), DimensionScores::default());
    }
}
