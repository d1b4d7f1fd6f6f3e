use super::{parse_ts, ts, RelationStore};
use crate::error::Result;
use crate::types::EmbeddingRow;
use chrono::{DateTime, Utc};
use sqlx::Row;

impl RelationStore {
    // ── Facet embeddings ────────────────────────────────────────

    /// Stored embeddings for one profile.
    pub async fn get_embeddings(&self, profile_id: &str) -> Result<Option<EmbeddingRow>> {
        let row = sqlx::query(
            "SELECT profile_id, embedding, work_embedding, hobby_embedding, updated_at
             FROM profile_embeddings WHERE profile_id = ?1",
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_embeddings).transpose()
    }

    /// Every embeddings row.
    pub async fn list_embeddings(&self) -> Result<Vec<EmbeddingRow>> {
        let rows = sqlx::query(
            "SELECT profile_id, embedding, work_embedding, hobby_embedding, updated_at
             FROM profile_embeddings ORDER BY profile_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_embeddings).collect()
    }

    /// Replace all three facet columns for a profile.
    pub async fn upsert_embeddings(&self, row: &EmbeddingRow) -> Result<()> {
        sqlx::query(
            "INSERT INTO profile_embeddings
             (profile_id, embedding, work_embedding, hobby_embedding, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(profile_id) DO UPDATE SET
                embedding       = excluded.embedding,
                work_embedding  = excluded.work_embedding,
                hobby_embedding = excluded.hobby_embedding,
                updated_at      = excluded.updated_at",
        )
        .bind(&row.profile_id)
        .bind(&row.intro)
        .bind(&row.work)
        .bind(&row.hobby)
        .bind(ts(&row.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Set only the intro column, keeping the other facets.
    pub async fn upsert_intro_embedding(
        &self,
        profile_id: &str,
        embedding: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO profile_embeddings (profile_id, embedding, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(profile_id) DO UPDATE SET
                embedding  = excluded.embedding,
                updated_at = excluded.updated_at",
        )
        .bind(profile_id)
        .bind(embedding)
        .bind(ts(&updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Newest `updated_at` across all embeddings rows.
    pub async fn latest_embedding_update(&self) -> Result<Option<DateTime<Utc>>> {
        let latest: Option<String> =
            sqlx::query_scalar("SELECT MAX(updated_at) FROM profile_embeddings")
                .fetch_one(&self.pool)
                .await?;
        Ok(latest.as_deref().map(parse_ts))
    }

    pub(crate) fn row_to_embeddings(row: &sqlx::sqlite::SqliteRow) -> Result<EmbeddingRow> {
        let updated_str: String = row.try_get("updated_at")?;
        Ok(EmbeddingRow {
            profile_id: row.try_get("profile_id")?,
            intro: row.try_get("embedding")?,
            work: row.try_get("work_embedding")?,
            hobby: row.try_get("hobby_embedding")?,
            updated_at: parse_ts(&updated_str),
        })
    }
}
