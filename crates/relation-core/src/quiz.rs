//! Quiz runs: in-memory swipe sessions with best-effort persistence.
//!
//! ```text
//! create ──► answer* ──► (deck complete) ──► finalize
//!              │  ▲
//!              ▼  │
//!           undo / reset
//! ```
//!
//! The persisted record is created on the first answer, every answer is
//! mirrored, and completion writes code, archetype, rounded scores and the
//! answer vector. All writes go through the [`SideEffectQueue`]; the run
//! itself never waits on or fails because of them.

use crate::effects::SideEffectQueue;
use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use relation_quiz::{
    build_answer_vector, summarize, AnswerLogEntry, AnswerValue, ProfileSummary, Question,
    QuestionDeck, SwipeSession,
};
use relation_store::{
    AnalyticsEvent, AnalyticsFilter, NewAnalyticsEvent, QuizAnswerRecord, QuizSessionRecord,
    QuizSessionResult, QuizSessionStatus, RelationStore,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Name stored when a participant gave none
pub const ANONYMOUS_PARTICIPANT: &str = "Anonymous founder";

/// Who is taking the quiz.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// External auth id
    #[serde(default)]
    pub external_id: Option<String>,
}

impl Participant {
    /// Name, else external id, else [`ANONYMOUS_PARTICIPANT`].
    fn display_name(&self) -> String {
        [self.name.as_deref(), self.external_id.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS_PARTICIPANT)
            .to_string()
    }
}

/// A swipe submitted by a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerInput {
    /// Question answered
    pub question_id: String,
    /// Yes or no
    pub answer: AnswerValue,
    /// Response time in milliseconds
    #[serde(default)]
    pub duration_ms: f64,
}

/// Answered vs. total cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Cards answered
    pub answered: usize,
    /// Cards in the deck
    pub total: usize,
}

/// Snapshot of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunView {
    /// Run id
    pub id: Uuid,
    /// Participant
    pub participant: Participant,
    /// Answers so far
    pub answers: Vec<AnswerLogEntry>,
    /// Card on top of the deck
    pub current_question: Option<Question>,
    /// Progress through the deck
    pub progress: Progress,
    /// Whether every card is answered
    pub complete: bool,
    /// Live scores, code and archetype
    pub summary: ProfileSummary,
    /// Persisted session this pass writes to, once the first answer is in
    pub record_id: Option<Uuid>,
    /// Started at
    pub created_at: DateTime<Utc>,
}

/// Outcome of recording an analytics event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsOutcome {
    /// Whether the event was stored
    pub success: bool,
    /// Stored event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<AnalyticsEvent>,
    /// Why it was not stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct Run {
    participant: Participant,
    session: SwipeSession,
    /// Id of the persisted session for the current pass
    record_id: Uuid,
    record_created: bool,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
}

impl Run {
    fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}

/// Runs idle longer than this are dropped from memory
pub const DEFAULT_RUN_IDLE_TTL: Duration = Duration::hours(6);

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Registry of quiz runs.
pub struct QuizRuns {
    deck: Arc<QuestionDeck>,
    store: RelationStore,
    effects: SideEffectQueue,
    runs: DashMap<Uuid, Run>,
    idle_ttl: Duration,
}

impl QuizRuns {
    /// Create a registry for `deck`.
    pub fn new(deck: Arc<QuestionDeck>, store: RelationStore, effects: SideEffectQueue) -> Self {
        Self {
            deck,
            store,
            effects,
            runs: DashMap::new(),
            idle_ttl: DEFAULT_RUN_IDLE_TTL,
        }
    }

    /// Override how long an untouched run is kept.
    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    /// The deck being played.
    pub fn deck(&self) -> &QuestionDeck {
        &self.deck
    }

    /// Number of live runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether there are no live runs.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Start a run. Idle runs are swept first.
    pub fn create(&self, participant: Participant) -> RunView {
        self.evict_idle(Utc::now());
        let id = Uuid::new_v4();
        let now = Utc::now();
        let run = Run {
            participant,
            session: SwipeSession::new(),
            record_id: id,
            record_created: false,
            created_at: now,
            last_active: now,
        };
        let view = self.view(id, &run);
        self.runs.insert(id, run);
        info!(run_id = %id, "Quiz run started");
        view
    }

    /// Drop a run from memory. Persisted records are kept.
    pub fn remove(&self, id: Uuid) -> Result<()> {
        self.runs.remove(&id).map(|_| ()).ok_or_else(|| not_found(id))
    }

    /// Drop runs untouched since `now - idle_ttl`. Returns how many went.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.idle_ttl;
        let before = self.runs.len();
        self.runs.retain(|_, run| run.last_active > cutoff);
        let evicted = before.saturating_sub(self.runs.len());
        if evicted > 0 {
            debug!(evicted, "Evicted idle quiz runs");
        }
        evicted
    }

    /// Current state of a run.
    pub fn get(&self, id: Uuid) -> Result<RunView> {
        let run = self.runs.get(&id).ok_or_else(|| not_found(id))?;
        Ok(self.view(id, &run))
    }

    /// Record a swipe for the card on top of the deck.
    #[instrument(skip(self, input), fields(question_id = %input.question_id))]
    pub fn answer(&self, id: Uuid, input: AnswerInput) -> Result<RunView> {
        let mut run = self.runs.get_mut(&id).ok_or_else(|| not_found(id))?;
        run.touch();
        let now = Utc::now();
        let session = std::mem::take(&mut run.session);
        match session.record(
            &self.deck,
            &input.question_id,
            input.answer,
            input.duration_ms,
            now,
        ) {
            Ok(next) => run.session = next,
            Err((back, e)) => {
                run.session = back;
                return Err(e.into());
            }
        }

        if !run.record_created {
            self.persist_session_record(&run);
            run.record_created = true;
        }
        if let Some(question) = self.deck.find(&input.question_id) {
            self.persist_answer(run.record_id, question, &input, now);
        }
        if run.session.is_complete(&self.deck) {
            self.persist_completion(&run);
        }
        Ok(self.view(id, &run))
    }

    /// Take back the last swipe. No-op on an empty run.
    pub fn undo(&self, id: Uuid) -> Result<RunView> {
        let mut run = self.runs.get_mut(&id).ok_or_else(|| not_found(id))?;
        run.touch();
        run.session = std::mem::take(&mut run.session).undo();
        debug!(run_id = %id, position = run.session.position(), "Undo");
        Ok(self.view(id, &run))
    }

    /// Clear every swipe. The next answer starts a new persisted session.
    pub fn reset(&self, id: Uuid) -> Result<RunView> {
        let mut run = self.runs.get_mut(&id).ok_or_else(|| not_found(id))?;
        run.touch();
        run.session = std::mem::take(&mut run.session).reset();
        if run.record_created {
            run.record_id = Uuid::new_v4();
            run.record_created = false;
        }
        Ok(self.view(id, &run))
    }

    /// Change participant details, syncing the record if one exists.
    pub fn update_participant(&self, id: Uuid, participant: Participant) -> Result<RunView> {
        let mut run = self.runs.get_mut(&id).ok_or_else(|| not_found(id))?;
        run.touch();
        run.participant = participant;
        if run.record_created {
            let record_id = run.record_id;
            let store = self.store.clone();
            let name = run.participant.display_name();
            let external_id = run.participant.external_id.clone();
            self.effects.submit("quiz.update_participant", async move {
                store
                    .update_quiz_participant(&record_id.to_string(), &name, external_id.as_deref())
                    .await?;
                Ok(())
            });
        }
        Ok(self.view(id, &run))
    }

    /// Store an analytics event. Failures come back as `success: false`.
    pub async fn record_event(&self, event: NewAnalyticsEvent) -> AnalyticsOutcome {
        match self.store.insert_analytics_event(&event).await {
            Ok(stored) => AnalyticsOutcome {
                success: true,
                event: Some(stored),
                error: None,
            },
            Err(e) => {
                warn!(error = %e, event_type = %event.event_type, "Analytics event dropped");
                AnalyticsOutcome {
                    success: false,
                    event: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Stored analytics events, newest first.
    pub async fn list_events(&self, filter: &AnalyticsFilter) -> Result<Vec<AnalyticsEvent>> {
        Ok(self.store.list_analytics_events(filter).await?)
    }

    fn view(&self, id: Uuid, run: &Run) -> RunView {
        let answers = run.session.answers().to_vec();
        RunView {
            id,
            participant: run.participant.clone(),
            current_question: run.session.current_question(&self.deck).cloned(),
            progress: Progress {
                answered: run.session.position(),
                total: self.deck.len(),
            },
            complete: run.session.is_complete(&self.deck),
            summary: summarize(&self.deck, &answers),
            record_id: run.record_created.then_some(run.record_id),
            answers,
            created_at: run.created_at,
        }
    }

    // ── Persistence ─────────────────────────────────────────────

    fn persist_session_record(&self, run: &Run) {
        let now = Utc::now();
        let record = QuizSessionRecord {
            id: run.record_id.to_string(),
            deck_version: self.deck.version.clone(),
            question_count: u32::try_from(self.deck.len()).unwrap_or(u32::MAX),
            participant_name: run.participant.display_name(),
            external_id: run.participant.external_id.clone(),
            status: QuizSessionStatus::InProgress,
            profile_code: None,
            archetype_id: None,
            dimension_scores: None,
            answer_vector: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        let store = self.store.clone();
        self.effects.submit("quiz.create_session", async move {
            store.create_quiz_session(&record).await?;
            Ok(())
        });
    }

    fn persist_answer(&self, id: Uuid, question: &Question, input: &AnswerInput, at: DateTime<Utc>) {
        let record = QuizAnswerRecord {
            session_id: id.to_string(),
            question_id: input.question_id.clone(),
            answer_value: input.answer.is_yes(),
            duration_ms: input.duration_ms.round() as i64,
            dimension: question.dimension.to_string(),
            polarity: i64::from(i8::from(question.polarity)),
            weight: question.weight,
            recorded_at: at,
        };
        let store = self.store.clone();
        self.effects.submit("quiz.record_answer", async move {
            store.record_quiz_answer(&record).await?;
            Ok(())
        });
    }

    fn persist_completion(&self, run: &Run) {
        let id = run.record_id;
        let answers = run.session.answers();
        let summary = summarize(&self.deck, answers);
        let dimension_scores: BTreeMap<String, f64> = summary
            .axes
            .iter()
            .map(|axis| (axis.dimension.to_string(), round3(axis.score)))
            .collect();
        let result = QuizSessionResult {
            profile_code: summary.code.clone(),
            archetype_id: summary.archetype.id.to_string(),
            dimension_scores,
            answer_vector: build_answer_vector(&self.deck, answers),
        };
        info!(run_id = %id, code = %result.profile_code, archetype = %result.archetype_id, "Quiz run completed");
        let store = self.store.clone();
        self.effects.submit("quiz.finalize_session", async move {
            if !store.finalize_quiz_session(&id.to_string(), &result).await? {
                return Err(Error::NotFound(format!("quiz session {id}")));
            }
            Ok(())
        });
    }
}

fn not_found(id: Uuid) -> Error {
    Error::NotFound(format!("quiz run {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn runs() -> (QuizRuns, SideEffectQueue, RelationStore) {
        let store = RelationStore::in_memory().await.unwrap();
        let (effects, _worker) = SideEffectQueue::spawn(64);
        let runs = QuizRuns::new(
            Arc::new(QuestionDeck::founder()),
            store.clone(),
            effects.clone(),
        );
        (runs, effects, store)
    }

    fn swipe(question_id: &str, answer: AnswerValue) -> AnswerInput {
        AnswerInput {
            question_id: question_id.to_string(),
            answer,
            duration_ms: 900.4,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (runs, _effects, _store) = runs().await;
        let view = runs.create(Participant::default());
        assert_eq!(view.progress, Progress { answered: 0, total: 20 });
        assert_eq!(view.current_question.unwrap().id, "q1");
        assert!(!view.complete);
        assert_eq!(runs.get(view.id).unwrap().id, view.id);
        assert!(matches!(runs.get(Uuid::new_v4()), Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_answer_undo_reset() {
        let (runs, _effects, _store) = runs().await;
        let id = runs.create(Participant::default()).id;

        runs.answer(id, swipe("q1", AnswerValue::Yes)).unwrap();
        let view = runs.answer(id, swipe("q2", AnswerValue::No)).unwrap();
        assert_eq!(view.progress.answered, 2);

        let err = runs.answer(id, swipe("q9", AnswerValue::Yes)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(runs.get(id).unwrap().progress.answered, 2);

        let view = runs.undo(id).unwrap();
        assert_eq!(view.progress.answered, 1);
        assert_eq!(view.current_question.unwrap().id, "q2");

        let view = runs.reset(id).unwrap();
        assert_eq!(view.progress.answered, 0);
        assert_eq!(runs.undo(id).unwrap().progress.answered, 0);
    }

    #[tokio::test]
    async fn test_persists_lazily_and_finalizes() {
        let (runs, effects, store) = runs().await;
        let id = runs
            .create(Participant {
                name: Some("  ".into()),
                external_id: None,
            })
            .id;

        effects.flush().await;
        assert!(store.get_quiz_session(&id.to_string()).await.unwrap().is_none());

        let deck = QuestionDeck::founder();
        for q in deck.questions() {
            runs.answer(id, swipe(&q.id, AnswerValue::Yes)).unwrap();
        }
        effects.flush().await;

        let record = store.get_quiz_session(&id.to_string()).await.unwrap().unwrap();
        assert_eq!(record.participant_name, ANONYMOUS_PARTICIPANT);
        assert_eq!(record.status, QuizSessionStatus::Completed);
        assert_eq!(record.question_count, 20);
        assert_eq!(record.profile_code.as_deref().map(str::len), Some(4));
        assert_eq!(record.answer_vector.as_ref().map(Vec::len), Some(20));
        let scores = record.dimension_scores.unwrap();
        assert_eq!(scores.len(), 4);
        assert!(scores
            .values()
            .all(|v| (v * 1000.0 - (v * 1000.0).round()).abs() < 1e-9));

        let answers = store.quiz_answers(&id.to_string()).await.unwrap();
        assert_eq!(answers.len(), 20);
        assert_eq!(answers[0].duration_ms, 900);
        assert!(answers[0].answer_value);
    }

    #[tokio::test]
    async fn test_participant_sync() {
        let (runs, effects, store) = runs().await;
        let id = runs.create(Participant::default()).id;
        runs.update_participant(
            id,
            Participant {
                name: Some("Mina".into()),
                external_id: None,
            },
        )
        .unwrap();
        runs.answer(id, swipe("q1", AnswerValue::No)).unwrap();
        runs.update_participant(
            id,
            Participant {
                name: Some("Mina K".into()),
                external_id: Some("kakao-9".into()),
            },
        )
        .unwrap();
        effects.flush().await;

        let record = store.get_quiz_session(&id.to_string()).await.unwrap().unwrap();
        assert_eq!(record.participant_name, "Mina K");
        assert_eq!(record.external_id.as_deref(), Some("kakao-9"));
        assert_eq!(record.status, QuizSessionStatus::InProgress);
    }

    #[tokio::test]
    async fn test_analytics_best_effort() {
        let (runs, _effects, _store) = runs().await;
        let ok = runs
            .record_event(NewAnalyticsEvent {
                event_type: "swipe".into(),
                session_id: "s1".into(),
                ..Default::default()
            })
            .await;
        assert!(ok.success);

        let bad = runs.record_event(NewAnalyticsEvent::default()).await;
        assert!(!bad.success);
        assert!(bad.error.is_some());

        let events = runs
            .list_events(&AnalyticsFilter {
                session_id: Some("s1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_after_completion_starts_new_record() {
        let (runs, effects, store) = runs().await;
        let id = runs.create(Participant::default()).id;
        let deck = QuestionDeck::founder();
        for question in deck.questions() {
            runs.answer(id, swipe(&question.id, AnswerValue::Yes)).unwrap();
        }
        let reset = runs.reset(id).unwrap();
        assert_eq!(reset.record_id, None);
        for question in deck.questions().iter().take(3) {
            runs.answer(id, swipe(&question.id, AnswerValue::No)).unwrap();
        }
        let view = runs.get(id).unwrap();
        let second = view.record_id.unwrap();
        assert_ne!(second, id);
        effects.flush().await;

        let first = store.get_quiz_session(&id.to_string()).await.unwrap().unwrap();
        assert_eq!(first.status, QuizSessionStatus::Completed);
        assert_eq!(store.quiz_answers(&id.to_string()).await.unwrap().len(), 20);

        let record = store
            .get_quiz_session(&second.to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, QuizSessionStatus::InProgress);
        assert_eq!(store.quiz_answers(&second.to_string()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_reset_before_any_answer_keeps_record_id() {
        let (runs, _effects, _store) = runs().await;
        let id = runs.create(Participant::default()).id;
        runs.reset(id).unwrap();
        let view = runs.answer(id, swipe("q1", AnswerValue::Yes)).unwrap();
        assert_eq!(view.record_id, Some(id));
    }

    #[tokio::test]
    async fn test_idle_runs_are_evicted() {
        let (runs, _effects, _store) = runs().await;
        let runs = runs.with_idle_ttl(Duration::minutes(30));
        let id = runs.create(Participant::default()).id;
        assert_eq!(runs.evict_idle(Utc::now()), 0);
        assert_eq!(runs.len(), 1);

        assert_eq!(runs.evict_idle(Utc::now() + Duration::minutes(31)), 1);
        assert!(runs.is_empty());
        assert!(matches!(runs.get(id), Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_run() {
        let (runs, _effects, _store) = runs().await;
        let id = runs.create(Participant::default()).id;
        runs.remove(id).unwrap();
        assert!(matches!(runs.get(id), Err(Error::NotFound(_))));
        assert!(matches!(runs.remove(id), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_display_name_falls_back_to_external_id() {
        let named = Participant {
            name: Some(" Mina ".into()),
            external_id: Some("kakao-9".into()),
        };
        assert_eq!(named.display_name(), "Mina");

        let external = Participant {
            name: Some("  ".into()),
            external_id: Some("kakao-9".into()),
        };
        assert_eq!(external.display_name(), "kakao-9");

        assert_eq!(Participant::default().display_name(), ANONYMOUS_PARTICIPANT);
    }
}
