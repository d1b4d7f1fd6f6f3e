//! Archetype classification.
//!
//! Five fixed archetypes, chosen by an ordered rule list over the four
//! dimension scores. The first matching rule wins; rules overlap and the
//! order is part of the contract.

use crate::deck::Dimension;
use crate::scoring::DimensionScores;
use serde::{Deserialize, Serialize};

/// Identifier of one of the five archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchetypeId {
    /// Bold vision, fast cadence
    MoonshotSprinter,
    /// Routine and process; also the fallback
    SystemsConductor,
    /// Network and team oriented
    CollectiveWeaver,
    /// Small, focused team
    SoloStudio,
    /// Re-plans as conditions shift
    AdaptivePilot,
}

impl ArchetypeId {
    /// All archetypes in table order.
    pub const ALL: [ArchetypeId; 5] = [
        ArchetypeId::MoonshotSprinter,
        ArchetypeId::SystemsConductor,
        ArchetypeId::CollectiveWeaver,
        ArchetypeId::SoloStudio,
        ArchetypeId::AdaptivePilot,
    ];

    /// Static description of this archetype.
    pub fn archetype(self) -> &'static Archetype {
        let idx = match self {
            Self::MoonshotSprinter => 0,
            Self::SystemsConductor => 1,
            Self::CollectiveWeaver => 2,
            Self::SoloStudio => 3,
            Self::AdaptivePilot => 4,
        };
        &ARCHETYPES[idx]
    }

    /// Stable string id (`"moonshot-sprinter"`, ...).
    pub fn as_str(self) -> &'static str {
        self.archetype().id
    }
}

impl std::fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArchetypeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown archetype: {s}"))
    }
}

/// Display copy for an archetype.
#[derive(Debug, Clone, Serialize)]
pub struct Archetype {
    /// Stable id
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// One-line tagline
    pub tagline: &'static str,
    /// Paragraph description
    pub description: &'static str,
    /// Focus keywords
    pub focus: &'static [&'static str],
}

static ARCHETYPES: [Archetype; 5] = [
    Archetype {
        id: "moonshot-sprinter",
        name: "Moonshot Sprinter",
        tagline: "Sticks with it on experiment speed and vision.",
        description: "Throws new ideas out quickly and dives the team in once there is a signal. \
                      Draws energy from uncertainty and sees the opportunity before the problem.",
        focus: &["experiment speed", "bold goals", "strong leadership"],
    },
    Archetype {
        id: "systems-conductor",
        name: "Systems Conductor",
        tagline: "A strategist who steadies the team with routine and process.",
        description: "Reduces risk with data and metrics and designs the work so everyone moves \
                      to the same rhythm. Holds on through structured execution when the market shakes.",
        focus: &["process design", "precise execution", "data driven"],
    },
    Archetype {
        id: "collective-weaver",
        name: "Collective Weaver",
        tagline: "A connector who solves problems by weaving people and networks.",
        description: "Finds answers in team culture, community and collaboration. Builds leverage \
                      through people instead of running alone and manages information flow carefully.",
        focus: &["community", "team care", "information sharing"],
    },
    Archetype {
        id: "solo-studio",
        name: "Solo Studio",
        tagline: "A craftsperson who digs deep with a small team.",
        description: "Goes deep with a core crew and cuts unnecessary noise. Prefers sustained \
                      focus and polish over fast pivots.",
        focus: &["elite team", "focus", "detail"],
    },
    Archetype {
        id: "adaptive-pilot",
        name: "Adaptive Pilot",
        tagline: "A pilot who reshapes strategy mid-flight as conditions change.",
        description: "Bends the plan to catch an opportunity and reshuffles sprints around \
                      customer signals. Stays balanced by feel.",
        focus: &["market sense", "strategic pivots", "flexibility"],
    },
];

/// Pick the archetype for a set of scores. First matching rule wins.
pub fn classify(scores: &DimensionScores) -> ArchetypeId {
    if scores.vision > 0.4 && scores.drive > 0.3 {
        ArchetypeId::MoonshotSprinter
    } else if scores.execution < -0.25 && scores.drive < -0.2 {
        ArchetypeId::SystemsConductor
    } else if scores.team > 0.35 {
        ArchetypeId::CollectiveWeaver
    } else if scores.team < -0.3 && scores.vision < 0.0 {
        ArchetypeId::SoloStudio
    } else if scores.execution > 0.35 {
        ArchetypeId::AdaptivePilot
    } else {
        ArchetypeId::SystemsConductor
    }
}

/// Four-letter profile code, one pole letter per dimension.
///
/// A score of exactly zero takes the positive-pole letter.
pub fn profile_code(scores: &DimensionScores) -> String {
    Dimension::ALL
        .iter()
        .map(|&dim| dim.meta().pole_for(scores.get(dim)).letter)
        .collect()
}
