//! Facet embedding sync and intro backfill.
//!
//! A profile has up to three facet vectors:
//!
//! | Facet | Text embedded |
//! |-------|---------------|
//! | intro | trimmed intro, work and hobby joined by a space |
//! | work  | trimmed work |
//! | hobby | trimmed hobby |
//!
//! A facet without text has no vector: its column is NULL and its index
//! record is deleted. The store row is authoritative; index calls are
//! independent and their failures are reported, never rolled back.

use crate::error::{Error, Result};
use chrono::Utc;
use relation_llm::SharedEmbeddingProvider;
use relation_search::{encode_embedding, Facet, VectorIndex, VectorRecord};
use relation_store::{EmbeddingRow, Profile, RelationStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Profiles embedded per backfill request
pub const BACKFILL_BATCH_SIZE: usize = 10;

/// Default number of profiles a backfill run takes on
pub const DEFAULT_BACKFILL_LIMIT: usize = 100;

/// Outcome of syncing one profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    /// Profile synced
    pub profile_id: String,
    /// Facets that now have a vector
    pub upserted: Vec<Facet>,
    /// Facets whose vector was removed
    pub deleted: Vec<Facet>,
    /// Index failures, one message per failed call
    pub index_errors: Vec<String>,
}

/// Outcome of an intro backfill run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackfillReport {
    /// Profiles embedded in this run
    pub processed: usize,
    /// Targets still without an intro embedding
    pub remaining: usize,
    /// Profiles with a non-blank intro
    pub total: usize,
    /// Error that stopped the run, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn trim_or_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Text for each facet of a profile, `None` where the facet is empty.
pub fn facet_texts(profile: &Profile) -> [(Facet, Option<String>); 3] {
    let intro = trim_or_none(profile.intro.as_deref());
    let work = trim_or_none(profile.work.as_deref());
    let hobby = trim_or_none(profile.hobby.as_deref());
    let combined = [intro, work, hobby]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    [
        (Facet::Intro, (!combined.is_empty()).then_some(combined)),
        (Facet::Work, work.map(str::to_string)),
        (Facet::Hobby, hobby.map(str::to_string)),
    ]
}

/// Keeps stored facet embeddings and the vector index in step with profiles.
pub struct FacetSync {
    store: RelationStore,
    embedder: SharedEmbeddingProvider,
    index: Option<Arc<dyn VectorIndex>>,
}

impl FacetSync {
    /// Create a syncer. Without an index only the store is written.
    pub fn new(
        store: RelationStore,
        embedder: SharedEmbeddingProvider,
        index: Option<Arc<dyn VectorIndex>>,
    ) -> Self {
        Self {
            store,
            embedder,
            index,
        }
    }

    /// Re-embed every facet of one profile.
    #[instrument(skip(self))]
    pub async fn sync_profile(&self, profile_id: &str) -> Result<SyncReport> {
        let profile = self
            .store
            .get_profile(profile_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("profile {profile_id}")))?;

        let texts = facet_texts(&profile);
        let tasks: Vec<(Facet, String)> = texts
            .iter()
            .filter_map(|(facet, text)| text.clone().map(|t| (*facet, t)))
            .collect();

        let inputs: Vec<String> = tasks.iter().map(|(_, t)| t.clone()).collect();
        let vectors = if inputs.is_empty() {
            Vec::new()
        } else {
            self.embedder.embed_batch(&inputs).await?
        };
        if vectors.len() != tasks.len() {
            return Err(Error::Internal(format!(
                "expected {} embeddings, got {}",
                tasks.len(),
                vectors.len()
            )));
        }

        let mut row = EmbeddingRow {
            profile_id: profile.id.clone(),
            intro: None,
            work: None,
            hobby: None,
            updated_at: Utc::now(),
        };
        let mut records = Vec::with_capacity(tasks.len());
        let mut upserted = Vec::with_capacity(tasks.len());
        for ((facet, _), values) in tasks.iter().zip(vectors) {
            let encoded = Some(encode_embedding(&values));
            match facet {
                Facet::Intro => row.intro = encoded,
                Facet::Work => row.work = encoded,
                Facet::Hobby => row.hobby = encoded,
            }
            records.push(VectorRecord::for_facet(&profile.id, *facet, values));
            upserted.push(*facet);
        }
        let deleted: Vec<Facet> = Facet::ALL
            .into_iter()
            .filter(|f| !upserted.contains(f))
            .collect();

        self.store.upsert_embeddings(&row).await?;

        let mut index_errors = Vec::new();
        if let Some(index) = &self.index {
            if let Err(e) = index.upsert(records).await {
                warn!(profile_id = %profile.id, error = %e, "Index upsert failed");
                index_errors.push(format!("upsert: {e}"));
            }
            let ids: Vec<String> = deleted.iter().map(|f| f.vector_id(&profile.id)).collect();
            if let Err(e) = index.delete(ids).await {
                warn!(profile_id = %profile.id, error = %e, "Index delete failed");
                index_errors.push(format!("delete: {e}"));
            }
        }

        info!(
            profile_id = %profile.id,
            upserted = upserted.len(),
            deleted = deleted.len(),
            "Facet sync complete"
        );
        Ok(SyncReport {
            profile_id: profile.id,
            upserted,
            deleted,
            index_errors,
        })
    }

    /// Embed intros for profiles that lack one, in batches of
    /// [`BACKFILL_BATCH_SIZE`]. The first failing batch stops the run.
    #[instrument(skip(self))]
    pub async fn backfill_intro(&self, limit: usize, force: bool) -> Result<BackfillReport> {
        let with_intro = self.store.profiles_for_intro_backfill(true).await?;
        let total = with_intro.len();
        let targets = if force {
            with_intro
        } else {
            self.store.profiles_for_intro_backfill(false).await?
        };
        let pending = targets.len();
        let selected: Vec<Profile> = targets.into_iter().take(limit).collect();
        let mut report = BackfillReport {
            processed: 0,
            remaining: pending,
            total,
            error: None,
        };

        for batch in selected.chunks(BACKFILL_BATCH_SIZE) {
            if let Err(e) = self.backfill_batch(batch).await {
                warn!(error = %e, processed = report.processed, "Backfill batch failed, stopping");
                report.error = Some(e.to_string());
                break;
            }
            report.processed += batch.len();
            report.remaining = pending.saturating_sub(report.processed);
        }

        info!(
            processed = report.processed,
            remaining = report.remaining,
            total = report.total,
            "Intro backfill finished"
        );
        Ok(report)
    }

    async fn backfill_batch(&self, batch: &[Profile]) -> Result<()> {
        let texts: Vec<String> = batch
            .iter()
            .filter_map(|p| trim_or_none(p.intro.as_deref()).map(str::to_string))
            .collect();
        if texts.len() != batch.len() {
            return Err(Error::Internal("backfill target without intro".to_string()));
        }

        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != batch.len() {
            return Err(Error::Internal(format!(
                "expected {} embeddings, got {}",
                batch.len(),
                vectors.len()
            )));
        }

        let now = Utc::now();
        let mut records = Vec::with_capacity(batch.len());
        for (profile, values) in batch.iter().zip(vectors) {
            self.store
                .upsert_intro_embedding(&profile.id, &encode_embedding(&values), now)
                .await?;
            records.push(VectorRecord::for_facet(&profile.id, Facet::Intro, values));
        }
        if let Some(index) = &self.index {
            index.upsert(records).await?;
        }
        Ok(())
    }
}
