//! The question deck and the four personality dimensions.
//!
//! The deck is static configuration: defined once, never mutated. Each
//! question is tagged with one [`Dimension`], a [`Polarity`] saying which
//! answer supports the dimension's positive pole, and a weight.

use serde::{Deserialize, Serialize};

/// Version tag of the built-in deck, persisted with every session.
pub const FOUNDER_DECK_VERSION: &str = "founder-deck-v1";

/// One of the four bipolar personality axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Moonshot vs. Grounded
    Vision,
    /// Sprint vs. Compose
    Drive,
    /// Collective vs. Solo
    Team,
    /// Adaptive vs. Systematic
    Execution,
}

impl Dimension {
    /// All dimensions in profile-code order.
    pub const ALL: [Dimension; 4] = [
        Dimension::Vision,
        Dimension::Drive,
        Dimension::Team,
        Dimension::Execution,
    ];

    /// Position of this dimension in [`Dimension::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Vision => 0,
            Self::Drive => 1,
            Self::Team => 2,
            Self::Execution => 3,
        }
    }

    /// Static pole metadata for this dimension.
    pub fn meta(self) -> &'static DimensionMeta {
        &DIMENSION_META[self.index()]
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vision => write!(f, "vision"),
            Self::Drive => write!(f, "drive"),
            Self::Team => write!(f, "team"),
            Self::Execution => write!(f, "execution"),
        }
    }
}

/// Which answer direction supports a dimension's positive pole.
///
/// Serialized as `1` / `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Polarity {
    /// "Yes" pushes towards the positive pole
    Positive,
    /// "Yes" pushes towards the negative pole
    Negative,
}

impl Polarity {
    /// `+1.0` or `-1.0`.
    pub fn sign(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

impl From<Polarity> for i8 {
    fn from(p: Polarity) -> Self {
        match p {
            Polarity::Positive => 1,
            Polarity::Negative => -1,
        }
    }
}

impl TryFrom<i8> for Polarity {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Positive),
            -1 => Ok(Self::Negative),
            other => Err(format!("polarity must be 1 or -1, got {other}")),
        }
    }
}

/// One end of a dimension axis.
#[derive(Debug, Clone, Serialize)]
pub struct Pole {
    /// Single letter used in the profile code
    pub letter: &'static str,
    /// Short label
    pub label: &'static str,
    /// One-line description
    pub blurb: &'static str,
}

/// Axis caption plus both poles of a dimension.
#[derive(Debug, Clone, Serialize)]
pub struct DimensionMeta {
    /// Dimension this metadata describes
    pub dimension: Dimension,
    /// Human-readable axis caption
    pub axis: &'static str,
    /// Pole selected by scores >= 0
    pub positive: Pole,
    /// Pole selected by scores < 0
    pub negative: Pole,
}

impl DimensionMeta {
    /// Pole indicated by the sign of `score`. Zero resolves to the positive pole.
    pub fn pole_for(&self, score: f64) -> &Pole {
        if score >= 0.0 {
            &self.positive
        } else {
            &self.negative
        }
    }
}

static DIMENSION_META: [DimensionMeta; 4] = [
    DimensionMeta {
        dimension: Dimension::Vision,
        axis: "Moonshot vs. Grounded",
        positive: Pole {
            letter: "V",
            label: "Moonshot",
            blurb: "Enjoys uncertainty in exchange for a chance at a huge wave.",
        },
        negative: Pole {
            letter: "G",
            label: "Grounded",
            blurb: "Prioritises precise market timing and execution.",
        },
    },
    DimensionMeta {
        dimension: Dimension::Drive,
        axis: "Sprint vs. Compose",
        positive: Pole {
            letter: "S",
            label: "Sprinter",
            blurb: "Learns through speed; fine-tuning can wait.",
        },
        negative: Pole {
            letter: "C",
            label: "Composer",
            blurb: "Values the stamina that comes from rhythm and routine.",
        },
    },
    DimensionMeta {
        dimension: Dimension::Team,
        axis: "Collective vs. Solo",
        positive: Pole {
            letter: "C",
            label: "Collective",
            blurb: "Lifts the team's energy and collaborates widely.",
        },
        negative: Pole {
            letter: "I",
            label: "Independent",
            blurb: "Delivers through deep focus in a small elite team.",
        },
    },
    DimensionMeta {
        dimension: Dimension::Execution,
        axis: "Adaptive vs. Systematic",
        positive: Pole {
            letter: "A",
            label: "Adaptive",
            blurb: "Can pivot strategy the moment conditions shift.",
        },
        negative: Pole {
            letter: "M",
            label: "Methodical",
            blurb: "Builds repeatable structure around metrics and fairness.",
        },
    },
];

/// A single yes/no prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier (e.g. `"q1"`)
    pub id: String,
    /// Prompt shown on the card
    pub prompt: String,
    /// Dimension this question measures
    pub dimension: Dimension,
    /// Direction of the positive pole
    pub polarity: Polarity,
    /// Importance of the question (> 0)
    pub weight: f64,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Ordered, immutable set of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDeck {
    /// Deck version persisted with sessions
    pub version: String,
    questions: Vec<Question>,
}

impl QuestionDeck {
    /// Build a deck from explicit questions.
    pub fn new(version: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            version: version.into(),
            questions,
        }
    }

    /// The built-in twenty-question founder deck.
    pub fn founder() -> Self {
        let questions = FOUNDER_QUESTIONS
            .iter()
            .map(|&(id, prompt, dimension, polarity, weight, tag)| Question {
                id: id.to_string(),
                prompt: prompt.to_string(),
                dimension,
                polarity,
                weight,
                tags: vec![tag.to_string()],
            })
            .collect();
        Self::new(FOUNDER_DECK_VERSION, questions)
    }

    /// Questions in deck order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the deck has no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at a deck position.
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Look up a question by id.
    pub fn find(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Deck position of a question id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }
}

impl Default for QuestionDeck {
    fn default() -> Self {
        Self::founder()
    }
}

use Dimension::{Drive, Execution, Team, Vision};
use Polarity::{Negative, Positive};

#[rustfmt::skip]
const FOUNDER_QUESTIONS: [(&str, &str, Dimension, Polarity, f64, &str); 20] = [
    ("q1", "I design the product assuming a global market within three years.", Vision, Positive, 1.2, "moonshot"),
    ("q2", "I have delayed a launch until market response looked certain.", Vision, Negative, 1.0, "validation"),
    ("q3", "When fundraising, I show unit economics before the growth story.", Vision, Negative, 0.9, "finance"),
    ("q4", "My roadmap always contains an experiment that could flip the world.", Vision, Positive, 1.1, "product"),
    ("q5", "There was a period when survival mattered more than scale.", Vision, Negative, 0.8, "resilience"),
    ("q6", "When I think of a new feature, I first decide when it ships.", Drive, Positive, 1.1, "cadence"),
    ("q7", "I have often lowered the quality bar to keep the team fast.", Drive, Positive, 1.0, "tradeoff"),
    ("q8", "A day without my calendar or task tools makes me anxious.", Drive, Negative, 1.0, "ritual"),
    ("q9", "I would rather reduce the risk of rework than run fast.", Drive, Negative, 0.9, "risk"),
    ("q10", "I have shown a first prototype within a week.", Drive, Positive, 1.2, "prototype"),
    ("q11", "Time for team culture and care is blocked in my calendar every week.", Team, Positive, 1.0, "culture"),
    ("q12", "In the end I make the important decisions alone.", Team, Negative, 1.0, "ownership"),
    ("q13", "Sharing everything slows us down, so I filter information.", Team, Negative, 0.9, "communication"),
    ("q14", "I regularly get insights from outside mentors or communities.", Team, Positive, 0.9, "community"),
    ("q15", "I have measured or recorded the team's emotional temperature.", Team, Positive, 1.1, "health"),
    ("q16", "Without data I want to postpone the decision.", Execution, Negative, 1.1, "data"),
    ("q17", "I change the sprint plan right away to match customer feedback.", Execution, Positive, 1.0, "agility"),
    ("q18", "I often feel the problem lies in the process rather than people.", Execution, Negative, 1.0, "process"),
    ("q19", "When an unexpected opportunity appears, I bend the plan to catch it.", Execution, Positive, 1.0, "opportunity"),
    ("q20", "I reserve time every week to review and break down long-term KPIs.", Execution, Negative, 1.1, "kpi"),
];
