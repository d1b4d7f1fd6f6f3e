use super::{parse_opt_ts, parse_ts, ts, RelationStore};
use crate::error::Result;
use crate::types::ClusterCacheEntry;
use sqlx::Row;

const CACHE_ROW_ID: &str = "default";

impl RelationStore {
    // ── Intro cluster cache ─────────────────────────────────────

    /// The cached clustering payload, if any.
    pub async fn get_cluster_cache(&self) -> Result<Option<ClusterCacheEntry>> {
        let row = sqlx::query(
            "SELECT clusters, meta, source_updated_at, updated_at
             FROM intro_cluster_cache WHERE id = ?1",
        )
        .bind(CACHE_ROW_ID)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let clusters: String = row.try_get("clusters")?;
        let meta: String = row.try_get("meta")?;
        let updated_str: String = row.try_get("updated_at")?;
        Ok(Some(ClusterCacheEntry {
            clusters: serde_json::from_str(&clusters)?,
            meta: serde_json::from_str(&meta)?,
            source_updated_at: parse_opt_ts(row.try_get("source_updated_at")?),
            updated_at: parse_ts(&updated_str),
        }))
    }

    /// Replace the cached payload.
    pub async fn put_cluster_cache(&self, entry: &ClusterCacheEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO intro_cluster_cache (id, clusters, meta, source_updated_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                clusters          = excluded.clusters,
                meta              = excluded.meta,
                source_updated_at = excluded.source_updated_at,
                updated_at        = excluded.updated_at",
        )
        .bind(CACHE_ROW_ID)
        .bind(serde_json::to_string(&entry.clusters)?)
        .bind(serde_json::to_string(&entry.meta)?)
        .bind(entry.source_updated_at.as_ref().map(ts))
        .bind(ts(&entry.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
