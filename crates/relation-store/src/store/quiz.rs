use super::{parse_opt_ts, parse_ts, ts, RelationStore};
use crate::error::{Error, Result};
use crate::types::{QuizAnswerRecord, QuizSessionRecord, QuizSessionResult, QuizSessionStatus};
use chrono::Utc;
use sqlx::Row;

impl RelationStore {
    // ── Quiz sessions ───────────────────────────────────────────

    /// Insert a session record. No-op if the id already exists.
    pub async fn create_quiz_session(&self, record: &QuizSessionRecord) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO quiz_sessions
             (id, deck_version, question_count, participant_name, external_id, status,
              profile_code, archetype_id, dimension_scores, answer_vector,
              created_at, updated_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .bind(&record.id)
        .bind(&record.deck_version)
        .bind(record.question_count)
        .bind(&record.participant_name)
        .bind(&record.external_id)
        .bind(record.status.to_string())
        .bind(&record.profile_code)
        .bind(&record.archetype_id)
        .bind(
            record
                .dimension_scores
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
        )
        .bind(
            record
                .answer_vector
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
        )
        .bind(ts(&record.created_at))
        .bind(ts(&record.updated_at))
        .bind(record.completed_at.as_ref().map(ts))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get a session record by ID.
    pub async fn get_quiz_session(&self, id: &str) -> Result<Option<QuizSessionRecord>> {
        let row = sqlx::query(
            "SELECT id, deck_version, question_count, participant_name, external_id, status,
                    profile_code, archetype_id, dimension_scores, answer_vector,
                    created_at, updated_at, completed_at
             FROM quiz_sessions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_quiz_session).transpose()
    }

    /// Mark a session completed with its result. Returns whether the row existed.
    pub async fn finalize_quiz_session(&self, id: &str, result: &QuizSessionResult) -> Result<bool> {
        let now = ts(&Utc::now());
        let done = sqlx::query(
            "UPDATE quiz_sessions SET
                status           = ?2,
                profile_code     = ?3,
                archetype_id     = ?4,
                dimension_scores = ?5,
                answer_vector    = ?6,
                completed_at     = ?7,
                updated_at       = ?7
             WHERE id = ?1",
        )
        .bind(id)
        .bind(QuizSessionStatus::Completed.to_string())
        .bind(&result.profile_code)
        .bind(&result.archetype_id)
        .bind(serde_json::to_string(&result.dimension_scores)?)
        .bind(serde_json::to_string(&result.answer_vector)?)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(done.rows_affected() > 0)
    }

    /// Update participant details. Returns whether the row existed.
    pub async fn update_quiz_participant(
        &self,
        id: &str,
        participant_name: &str,
        external_id: Option<&str>,
    ) -> Result<bool> {
        let done = sqlx::query(
            "UPDATE quiz_sessions SET participant_name = ?2, external_id = ?3, updated_at = ?4
             WHERE id = ?1",
        )
        .bind(id)
        .bind(participant_name)
        .bind(external_id)
        .bind(ts(&Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(done.rows_affected() > 0)
    }

    // ── Quiz answers ────────────────────────────────────────────

    /// Append one mirrored swipe.
    pub async fn record_quiz_answer(&self, answer: &QuizAnswerRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO quiz_answers
             (session_id, question_id, answer_value, duration_ms, dimension, polarity, weight,
              recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&answer.session_id)
        .bind(&answer.question_id)
        .bind(answer.answer_value)
        .bind(answer.duration_ms)
        .bind(&answer.dimension)
        .bind(answer.polarity)
        .bind(answer.weight)
        .bind(ts(&answer.recorded_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Mirrored swipes for a session in insertion order.
    pub async fn quiz_answers(&self, session_id: &str) -> Result<Vec<QuizAnswerRecord>> {
        let rows = sqlx::query(
            "SELECT session_id, question_id, answer_value, duration_ms, dimension, polarity,
                    weight, recorded_at
             FROM quiz_answers WHERE session_id = ?1 ORDER BY id",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let recorded_str: String = row.try_get("recorded_at")?;
                Ok(QuizAnswerRecord {
                    session_id: row.try_get("session_id")?,
                    question_id: row.try_get("question_id")?,
                    answer_value: row.try_get("answer_value")?,
                    duration_ms: row.try_get("duration_ms")?,
                    dimension: row.try_get("dimension")?,
                    polarity: row.try_get("polarity")?,
                    weight: row.try_get("weight")?,
                    recorded_at: parse_ts(&recorded_str),
                })
            })
            .collect()
    }

    pub(crate) fn row_to_quiz_session(
        row: &sqlx::sqlite::SqliteRow,
    ) -> Result<QuizSessionRecord> {
        let status_str: String = row.try_get("status")?;
        let scores: Option<String> = row.try_get("dimension_scores")?;
        let vector: Option<String> = row.try_get("answer_vector")?;
        let created_str: String = row.try_get("created_at")?;
        let updated_str: String = row.try_get("updated_at")?;
        Ok(QuizSessionRecord {
            id: row.try_get("id")?,
            deck_version: row.try_get("deck_version")?,
            question_count: row.try_get::<i64, _>("question_count")? as u32,
            participant_name: row.try_get("participant_name")?,
            external_id: row.try_get("external_id")?,
            status: status_str.parse().map_err(Error::Internal)?,
            profile_code: row.try_get("profile_code")?,
            archetype_id: row.try_get("archetype_id")?,
            dimension_scores: scores.as_deref().map(serde_json::from_str).transpose()?,
            answer_vector: vector.as_deref().map(serde_json::from_str).transpose()?,
            created_at: parse_ts(&created_str),
            updated_at: parse_ts(&updated_str),
            completed_at: parse_opt_ts(row.try_get("completed_at")?),
        })
    }
}
