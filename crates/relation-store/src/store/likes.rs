use super::{ts, RelationStore};
use crate::error::{Error, Result};
use chrono::Utc;

impl RelationStore {
    // ── Likes ───────────────────────────────────────────────────

    /// Ids of profiles `liker_id` has liked.
    pub async fn liked_by(&self, liker_id: &str) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar(
            "SELECT likee_id FROM likes WHERE liker_id = ?1 ORDER BY created_at",
        )
        .bind(liker_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// Ids of profiles that liked `likee_id`.
    pub async fn likers_of(&self, likee_id: &str) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar(
            "SELECT liker_id FROM likes WHERE likee_id = ?1 ORDER BY created_at",
        )
        .bind(likee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// Record a like. Idempotent.
    pub async fn add_like(&self, liker_id: &str, likee_id: &str) -> Result<()> {
        validate_pair(liker_id, likee_id)?;
        sqlx::query(
            "INSERT OR IGNORE INTO likes (liker_id, likee_id, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(liker_id)
        .bind(likee_id)
        .bind(ts(&Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Remove a like. Returns whether one existed.
    pub async fn remove_like(&self, liker_id: &str, likee_id: &str) -> Result<bool> {
        validate_pair(liker_id, likee_id)?;
        let result = sqlx::query("DELETE FROM likes WHERE liker_id = ?1 AND likee_id = ?2")
            .bind(liker_id)
            .bind(likee_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn validate_pair(liker_id: &str, likee_id: &str) -> Result<()> {
    if liker_id.trim().is_empty() || likee_id.trim().is_empty() {
        return Err(Error::Validation(
            "liker_id and likee_id are required".to_string(),
        ));
    }
    Ok(())
}
