use super::{parse_ts, ts, RelationStore};
use crate::error::{Error, Result};
use crate::types::{AnalyticsEvent, AnalyticsFilter, NewAnalyticsEvent, MAX_ANALYTICS_ROWS};
use chrono::Utc;
use sqlx::Row;

impl RelationStore {
    // ── Analytics ───────────────────────────────────────────────

    /// Store an analytics event and return it with its row id.
    pub async fn insert_analytics_event(&self, event: &NewAnalyticsEvent) -> Result<AnalyticsEvent> {
        if event.event_type.trim().is_empty() || event.session_id.trim().is_empty() {
            return Err(Error::Validation(
                "event type and session id are required".to_string(),
            ));
        }

        let now = Utc::now();
        let timestamp = event.timestamp.unwrap_or(now);
        let metadata = if event.metadata.is_null() {
            serde_json::json!({})
        } else {
            event.metadata.clone()
        };

        let result = sqlx::query(
            "INSERT INTO quiz_analytics
             (event_type, session_id, user_id, question_id, answer, response_ms,
              swipe_direction, drop_position_x, drop_position_y, timestamp, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(&event.event_type)
        .bind(&event.session_id)
        .bind(&event.user_id)
        .bind(&event.question_id)
        .bind(&event.answer)
        .bind(event.response_ms)
        .bind(&event.swipe_direction)
        .bind(event.drop_position_x)
        .bind(event.drop_position_y)
        .bind(ts(&timestamp))
        .bind(serde_json::to_string(&metadata)?)
        .bind(ts(&now))
        .execute(&self.pool)
        .await?;

        Ok(AnalyticsEvent {
            id: result.last_insert_rowid(),
            event_type: event.event_type.clone(),
            session_id: event.session_id.clone(),
            user_id: event.user_id.clone(),
            question_id: event.question_id.clone(),
            answer: event.answer.clone(),
            response_ms: event.response_ms,
            swipe_direction: event.swipe_direction.clone(),
            drop_position_x: event.drop_position_x,
            drop_position_y: event.drop_position_y,
            timestamp,
            metadata,
            created_at: now,
        })
    }

    /// Events matching the filter, newest first.
    pub async fn list_analytics_events(
        &self,
        filter: &AnalyticsFilter,
    ) -> Result<Vec<AnalyticsEvent>> {
        let limit = filter
            .limit
            .unwrap_or(MAX_ANALYTICS_ROWS)
            .min(MAX_ANALYTICS_ROWS);
        let rows = sqlx::query(
            "SELECT id, event_type, session_id, user_id, question_id, answer, response_ms,
                    swipe_direction, drop_position_x, drop_position_y, timestamp, metadata,
                    created_at
             FROM quiz_analytics
             WHERE (?1 IS NULL OR session_id = ?1)
               AND (?2 IS NULL OR event_type = ?2)
               AND (?3 IS NULL OR user_id = ?3)
             ORDER BY created_at DESC, id DESC
             LIMIT ?4",
        )
        .bind(&filter.session_id)
        .bind(&filter.event_type)
        .bind(&filter.user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_analytics).collect()
    }

    fn row_to_analytics(row: &sqlx::sqlite::SqliteRow) -> Result<AnalyticsEvent> {
        let metadata: String = row.try_get("metadata")?;
        let timestamp: String = row.try_get("timestamp")?;
        let created_str: String = row.try_get("created_at")?;
        Ok(AnalyticsEvent {
            id: row.try_get("id")?,
            event_type: row.try_get("event_type")?,
            session_id: row.try_get("session_id")?,
            user_id: row.try_get("user_id")?,
            question_id: row.try_get("question_id")?,
            answer: row.try_get("answer")?,
            response_ms: row.try_get("response_ms")?,
            swipe_direction: row.try_get("swipe_direction")?,
            drop_position_x: row.try_get("drop_position_x")?,
            drop_position_y: row.try_get("drop_position_y")?,
            timestamp: parse_ts(&timestamp),
            metadata: serde_json::from_str(&metadata).unwrap_or_else(|_| serde_json::json!({})),
            created_at: parse_ts(&created_str),
        })
    }
}
