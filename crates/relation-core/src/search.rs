//! Directory search: substring matches plus optional semantic matches.

use crate::error::{Error, Result};
use crate::recommend::facet_vectors;
use relation_llm::SharedEmbeddingProvider;
use relation_search::{rank, Facet, ScoredMatch, VectorIndex};
use relation_store::{Profile, RelationStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Default result count
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// A profile matched by text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextMatch {
    /// Matched profile
    #[serde(flatten)]
    pub profile: Profile,
    /// Fields containing the query
    pub matched_fields: Vec<&'static str>,
}

/// Search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    /// Substring matches, newest first
    #[serde(rename = "textMatches")]
    pub text_matches: Vec<TextMatch>,
    /// Semantic matches on intro embeddings
    #[serde(rename = "vectorMatches")]
    pub vector_matches: Vec<ScoredMatch>,
}

/// Fields of `profile` containing `needle` (already lower-cased).
pub fn matched_fields(profile: &Profile, needle: &str) -> Vec<&'static str> {
    let hit = |value: Option<&str>| value.is_some_and(|v| v.to_lowercase().contains(needle));
    let mut fields = Vec::new();
    if hit(Some(profile.name.as_str())) {
        fields.push("name");
    }
    for (field, value) in [
        ("company", &profile.company),
        ("role", &profile.role),
        ("intro", &profile.intro),
        ("work", &profile.work),
        ("hobby", &profile.hobby),
    ] {
        if hit(value.as_deref()) {
            fields.push(field);
        }
    }
    if profile.tags.iter().any(|t| hit(Some(t.as_str()))) {
        fields.push("tags");
    }
    fields
}

/// Search service.
pub struct Search {
    store: RelationStore,
    embedder: Option<SharedEmbeddingProvider>,
    index: Option<Arc<dyn VectorIndex>>,
}

impl Search {
    /// Create the service. Vector search needs an embedder.
    pub fn new(
        store: RelationStore,
        embedder: Option<SharedEmbeddingProvider>,
        index: Option<Arc<dyn VectorIndex>>,
    ) -> Self {
        Self {
            store,
            embedder,
            index,
        }
    }

    /// Search profiles for `query`.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        limit: Option<usize>,
        use_vector: bool,
    ) -> Result<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Validation("q required".to_string()));
        }
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let needle = query.to_lowercase();

        let text_matches = self
            .store
            .list_profiles()
            .await?
            .into_iter()
            .filter_map(|profile| {
                let fields = matched_fields(&profile, &needle);
                (!fields.is_empty()).then_some(TextMatch {
                    profile,
                    matched_fields: fields,
                })
            })
            .take(limit)
            .collect();

        let vector_matches = if use_vector {
            self.vector_matches(query, limit).await.unwrap_or_else(|e| {
                warn!(error = %e, "Vector search failed");
                Vec::new()
            })
        } else {
            Vec::new()
        };

        Ok(SearchResults {
            text_matches,
            vector_matches,
        })
    }

    async fn vector_matches(&self, query: &str, limit: usize) -> Result<Vec<ScoredMatch>> {
        let embedder = self
            .embedder
            .as_ref()
            .ok_or_else(|| Error::NotConfigured("embedding provider".to_string()))?;
        let vectors = embedder.embed_batch(&[query.to_string()]).await?;
        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| Error::Internal("empty embedding response".to_string()))?;

        if let Some(index) = &self.index {
            let hits = index.query(&vector, limit, Some(Facet::Intro)).await?;
            return Ok(hits
                .iter()
                .map(|hit| ScoredMatch::new(hit.profile_id(), hit.score))
                .collect());
        }

        let rows = self.store.list_embeddings().await?;
        let candidates = facet_vectors(&rows, Facet::Intro);
        Ok(rank(
            &vector,
            candidates.iter().map(|(id, v)| (id.as_str(), v.as_slice())),
            None,
            limit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::FacetSync;
    use crate::testing::{profile_with, FakeEmbedder};

    async fn seeded() -> RelationStore {
        let store = RelationStore::in_memory().await.unwrap();
        let mut mina = profile_with("Mina", Some("Building robot arms"), None, Some("Climbing"));
        mina.tags = vec!["Robotics".into()];
        store.create_profile(&mina).await.unwrap();
        store
            .create_profile(&profile_with("Jun", Some("Fintech for SMEs"), Some("payments"), None))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_text_search_reports_fields() {
        let search = Search::new(seeded().await, None, None);
        let results = search.search("ROBOT", None, false).await.unwrap();
        assert_eq!(results.text_matches.len(), 1);
        assert_eq!(results.text_matches[0].profile.name, "Mina");
        assert_eq!(results.text_matches[0].matched_fields, vec!["intro", "tags"]);
        assert!(results.vector_matches.is_empty());
    }

    #[tokio::test]
    async fn test_limit_and_blank_query() {
        let search = Search::new(seeded().await, None, None);
        let all = search.search("n", Some(1), false).await.unwrap();
        assert_eq!(all.text_matches.len(), 1);
        assert!(matches!(
            search.search("  ", None, false).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_vector_search_brute_force() {
        let store = seeded().await;
        let embedder: SharedEmbeddingProvider = Arc::new(FakeEmbedder::new());
        let sync = FacetSync::new(store.clone(), embedder.clone(), None);
        sync.backfill_intro(10, false).await.unwrap();

        let search = Search::new(store, Some(embedder), None);
        let results = search.search("payments fintech", Some(5), true).await.unwrap();
        assert_eq!(results.vector_matches.len(), 2);
    }

    #[tokio::test]
    async fn test_vector_failure_yields_empty_matches() {
        let search = Search::new(
            seeded().await,
            Some(Arc::new(FakeEmbedder::failing_after(0))),
            None,
        );
        let results = search.search("Jun", None, true).await.unwrap();
        assert_eq!(results.text_matches.len(), 1);
        assert!(results.vector_matches.is_empty());
    }
}
