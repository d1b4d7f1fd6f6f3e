//! Row types for the Relation store.
//!
//! The store keeps two families of data: the member **directory**
//! (profiles, likes, facet embeddings, the intro-cluster cache) and the
//! best-effort **quiz mirror** (sessions, answers, analytics events).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A member profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique profile ID (UUID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Company
    pub company: Option<String>,
    /// Role at the company
    pub role: Option<String>,
    /// Free-text self-introduction
    pub intro: Option<String>,
    /// What the member works on
    pub work: Option<String>,
    /// Hobbies
    pub hobby: Option<String>,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Id assigned by the external auth provider
    pub external_id: Option<String>,
    /// Ids of profiles that liked this one
    #[serde(default)]
    pub liked_by: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new profile. Only `name` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProfile {
    /// Display name
    pub name: String,
    /// Company
    #[serde(default)]
    pub company: Option<String>,
    /// Role
    #[serde(default)]
    pub role: Option<String>,
    /// Intro
    #[serde(default)]
    pub intro: Option<String>,
    /// Work
    #[serde(default)]
    pub work: Option<String>,
    /// Hobby
    #[serde(default)]
    pub hobby: Option<String>,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Avatar URL
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// External auth id
    #[serde(default)]
    pub external_id: Option<String>,
}

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Company
    #[serde(default)]
    pub company: Option<String>,
    /// Role
    #[serde(default)]
    pub role: Option<String>,
    /// Intro
    #[serde(default)]
    pub intro: Option<String>,
    /// Work
    #[serde(default)]
    pub work: Option<String>,
    /// Hobby
    #[serde(default)]
    pub hobby: Option<String>,
    /// Tags
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Avatar URL
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// External auth id
    #[serde(default)]
    pub external_id: Option<String>,
}

impl ProfilePatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.company.is_none()
            && self.role.is_none()
            && self.intro.is_none()
            && self.work.is_none()
            && self.hobby.is_none()
            && self.tags.is_none()
            && self.avatar_url.is_none()
            && self.external_id.is_none()
    }
}

/// Stored facet embeddings for one profile, as persisted JSON text.
///
/// A `None` column means the facet has no text and therefore no vector.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRow {
    /// Owning profile
    pub profile_id: String,
    /// Intro facet vector (JSON array)
    pub intro: Option<String>,
    /// Work facet vector (JSON array)
    pub work: Option<String>,
    /// Hobby facet vector (JSON array)
    pub hobby: Option<String>,
    /// When the row was last written
    pub updated_at: DateTime<Utc>,
}

/// The single cached intro-clustering payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterCacheEntry {
    /// Serialized cluster list
    pub clusters: serde_json::Value,
    /// Serialized cluster meta
    pub meta: serde_json::Value,
    /// Newest embedding timestamp the payload was computed from
    pub source_updated_at: Option<DateTime<Utc>>,
    /// When the cache row was written
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of a mirrored quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizSessionStatus {
    /// Answers still coming in
    InProgress,
    /// Every card answered
    Completed,
}

impl std::fmt::Display for QuizSessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for QuizSessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}

/// Mirrored quiz session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSessionRecord {
    /// Record id (UUID)
    pub id: String,
    /// Deck version answered
    pub deck_version: String,
    /// Number of cards in the deck
    pub question_count: u32,
    /// Participant display name
    pub participant_name: String,
    /// Participant's external auth id
    pub external_id: Option<String>,
    /// Lifecycle state
    pub status: QuizSessionStatus,
    /// Four-letter profile code, once completed
    pub profile_code: Option<String>,
    /// Archetype id, once completed
    pub archetype_id: Option<String>,
    /// Dimension name to score, rounded to three decimals
    pub dimension_scores: Option<BTreeMap<String, f64>>,
    /// Per-question answer vector
    pub answer_vector: Option<Vec<f64>>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
    /// Completion time
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fields written when a session is finalized.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSessionResult {
    /// Four-letter profile code
    pub profile_code: String,
    /// Archetype id
    pub archetype_id: String,
    /// Dimension name to rounded score
    pub dimension_scores: BTreeMap<String, f64>,
    /// Per-question answer vector
    pub answer_vector: Vec<f64>,
}

/// One mirrored swipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAnswerRecord {
    /// Owning session record
    pub session_id: String,
    /// Question answered
    pub question_id: String,
    /// `true` for yes
    pub answer_value: bool,
    /// Response time, rounded to whole milliseconds
    pub duration_ms: i64,
    /// Dimension the question measures
    pub dimension: String,
    /// Question polarity (+1 / -1)
    pub polarity: i64,
    /// Question weight
    pub weight: f64,
    /// When the swipe happened
    pub recorded_at: DateTime<Utc>,
}

/// A free-form analytics event to record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAnalyticsEvent {
    /// Event type (e.g. `"swipe"`, `"undo"`)
    pub event_type: String,
    /// Client session id
    pub session_id: String,
    /// Signed-in user, if any
    pub user_id: Option<String>,
    /// Question involved
    pub question_id: Option<String>,
    /// Answer given
    pub answer: Option<String>,
    /// Response time in milliseconds
    pub response_ms: Option<i64>,
    /// Swipe direction
    pub swipe_direction: Option<String>,
    /// Card drop position, x
    pub drop_position_x: Option<f64>,
    /// Card drop position, y
    pub drop_position_y: Option<f64>,
    /// Client timestamp; defaults to now
    pub timestamp: Option<DateTime<Utc>>,
    /// Arbitrary extra data
    pub metadata: serde_json::Value,
}

/// A stored analytics event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    /// Row id
    pub id: i64,
    /// Event type
    pub event_type: String,
    /// Client session id
    pub session_id: String,
    /// Signed-in user
    pub user_id: Option<String>,
    /// Question involved
    pub question_id: Option<String>,
    /// Answer given
    pub answer: Option<String>,
    /// Response time in milliseconds
    pub response_ms: Option<i64>,
    /// Swipe direction
    pub swipe_direction: Option<String>,
    /// Drop position, x
    pub drop_position_x: Option<f64>,
    /// Drop position, y
    pub drop_position_y: Option<f64>,
    /// Event time
    pub timestamp: DateTime<Utc>,
    /// Extra data
    pub metadata: serde_json::Value,
    /// Insert time
    pub created_at: DateTime<Utc>,
}

/// Filter for listing analytics events. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsFilter {
    /// Restrict to one client session
    pub session_id: Option<String>,
    /// Restrict to one event type
    pub event_type: Option<String>,
    /// Restrict to one user
    pub user_id: Option<String>,
    /// Maximum rows (capped at [`MAX_ANALYTICS_ROWS`])
    pub limit: Option<usize>,
}

/// Upper bound on rows returned by an analytics listing.
pub const MAX_ANALYTICS_ROWS: usize = 1000;
