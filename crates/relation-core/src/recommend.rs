//! "AI picks": profiles similar to a given profile, per facet.

use crate::error::{Error, Result};
use relation_search::{
    merge_facets, parse_embedding, rank, Facet, FacetMatches, MergedMatch, ScoredMatch,
    VectorIndex,
};
use relation_store::{EmbeddingRow, RelationStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub use relation_search::ranking::DEFAULT_PICK_LIMIT;

/// Recommendations for one profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AiPicks {
    /// Similar by intro
    pub intro: Vec<ScoredMatch>,
    /// Similar by work
    pub work: Vec<ScoredMatch>,
    /// Similar by hobby
    pub hobby: Vec<ScoredMatch>,
    /// All facets merged, best similarity per profile
    pub combined: Vec<MergedMatch>,
}

/// Raw stored text of one facet column.
pub(crate) fn facet_column(row: &EmbeddingRow, facet: Facet) -> Option<&str> {
    match facet {
        Facet::Intro => row.intro.as_deref(),
        Facet::Work => row.work.as_deref(),
        Facet::Hobby => row.hobby.as_deref(),
    }
}

/// Parsed vectors of one facet across all rows; malformed entries are skipped.
pub(crate) fn facet_vectors(rows: &[EmbeddingRow], facet: Facet) -> Vec<(String, Vec<f32>)> {
    rows.iter()
        .filter_map(|row| {
            parse_embedding(facet_column(row, facet)).map(|v| (row.profile_id.clone(), v))
        })
        .collect()
}

/// Recommendation service.
pub struct Recommender {
    store: RelationStore,
    index: Option<Arc<dyn VectorIndex>>,
}

impl Recommender {
    /// Recommender over stored embeddings. With an index, intro picks are
    /// served by the index.
    pub fn new(store: RelationStore, index: Option<Arc<dyn VectorIndex>>) -> Self {
        Self { store, index }
    }

    /// Up to `limit` picks per facet for `profile_id`.
    ///
    /// A profile without an embeddings row gets empty lists.
    #[instrument(skip(self))]
    pub async fn ai_picks(&self, profile_id: &str, limit: Option<usize>) -> Result<AiPicks> {
        if profile_id.trim().is_empty() {
            return Err(Error::Validation("missing profile_id".to_string()));
        }
        let limit = limit.unwrap_or(DEFAULT_PICK_LIMIT);
        let Some(me) = self.store.get_embeddings(profile_id).await? else {
            debug!(profile_id, "No embeddings for profile");
            return Ok(AiPicks::default());
        };

        let rows = self.store.list_embeddings().await?;
        let mut matches = FacetMatches::default();
        for facet in Facet::ALL {
            let Some(query) = parse_embedding(facet_column(&me, facet)) else {
                continue;
            };
            let picks = match (&self.index, facet) {
                (Some(index), Facet::Intro) => {
                    match self.query_index(index.as_ref(), &query, profile_id, limit).await {
                        Ok(picks) => picks,
                        Err(e) => {
                            warn!(profile_id, facet = %facet, error = %e, "Index picks failed");
                            Vec::new()
                        }
                    }
                }
                _ => {
                    let candidates = facet_vectors(&rows, facet);
                    rank(
                        &query,
                        candidates.iter().map(|(id, v)| (id.as_str(), v.as_slice())),
                        Some(profile_id),
                        limit,
                    )
                }
            };
            *matches.get_mut(facet) = picks;
        }

        let mut combined = merge_facets(&matches);
        combined.truncate(limit);
        Ok(AiPicks {
            intro: matches.intro,
            work: matches.work,
            hobby: matches.hobby,
            combined,
        })
    }

    async fn query_index(
        &self,
        index: &dyn VectorIndex,
        query: &[f32],
        exclude: &str,
        limit: usize,
    ) -> Result<Vec<ScoredMatch>> {
        let hits = index.query(query, limit + 1, Some(Facet::Intro)).await?;
        Ok(hits
            .iter()
            .filter(|hit| hit.profile_id() != exclude)
            .take(limit)
            .map(|hit| ScoredMatch::new(hit.profile_id(), hit.score))
            .collect())
    }
}
