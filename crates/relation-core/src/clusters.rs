//! Intro clusters with a single-row cache.
//!
//! The cache is keyed by nothing but freshness: a stored payload is served
//! while no embedding is newer than the one it was computed from. The
//! requested `k` does not take part in the cache decision.

use crate::error::Result;
use chrono::Utc;
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use relation_llm::{ClusterSample, ClusterSummarizer};
use relation_search::{build_intro_clusters, parse_embedding, ClusterInput, ClusterMeta, IntroCluster};
use relation_store::{ClusterCacheEntry, RelationStore};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Clusters plus whether they came from the cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterResponse {
    /// Clusters, largest first
    pub clusters: Vec<IntroCluster>,
    /// Counts
    pub meta: ClusterMeta,
    /// Served from the cache
    pub cached: bool,
}

/// Intro clustering service.
pub struct IntroClusters {
    store: RelationStore,
    summarizer: Option<Arc<dyn ClusterSummarizer>>,
    seed: Option<u64>,
}

impl IntroClusters {
    /// Create the service. Without a seed, reseeding uses OS entropy.
    pub fn new(store: RelationStore, seed: Option<u64>) -> Self {
        Self {
            store,
            summarizer: None,
            seed,
        }
    }

    /// Refine keywords with a model.
    #[must_use]
    pub fn with_summarizer(mut self, summarizer: Arc<dyn ClusterSummarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Clusters, from the cache when fresh unless `force`.
    #[instrument(skip(self))]
    pub async fn get(&self, k: Option<usize>, force: bool) -> Result<ClusterResponse> {
        let latest = self.store.latest_embedding_update().await?;

        if !force {
            if let Some(response) = self.fresh_cache(latest).await? {
                debug!("Serving cached intro clusters");
                return Ok(response);
            }
        }

        let (clusters, meta) = self.compute(k.filter(|&k| k > 0)).await?;

        let entry = ClusterCacheEntry {
            clusters: serde_json::to_value(&clusters)?,
            meta: serde_json::to_value(meta)?,
            source_updated_at: latest,
            updated_at: Utc::now(),
        };
        if let Err(e) = self.store.put_cluster_cache(&entry).await {
            warn!(error = %e, "Failed to write cluster cache");
        }

        Ok(ClusterResponse {
            clusters,
            meta,
            cached: false,
        })
    }

    async fn fresh_cache(
        &self,
        latest: Option<chrono::DateTime<Utc>>,
    ) -> Result<Option<ClusterResponse>> {
        let Some(entry) = self.store.get_cluster_cache().await? else {
            return Ok(None);
        };
        let fresh = match (latest, entry.source_updated_at) {
            (None, _) => true,
            (Some(latest), Some(source)) => source >= latest,
            (Some(_), None) => false,
        };
        if !fresh {
            return Ok(None);
        }
        let decoded = serde_json::from_value::<Vec<IntroCluster>>(entry.clusters)
            .and_then(|clusters| {
                serde_json::from_value::<ClusterMeta>(entry.meta).map(|meta| (clusters, meta))
            });
        match decoded {
            Ok((clusters, meta)) => Ok(Some(ClusterResponse {
                clusters,
                meta,
                cached: true,
            })),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cluster cache");
                Ok(None)
            }
        }
    }

    async fn compute(&self, k: Option<usize>) -> Result<(Vec<IntroCluster>, ClusterMeta)> {
        let profiles: HashMap<String, _> = self
            .store
            .list_profiles()
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let inputs: Vec<ClusterInput> = self
            .store
            .list_embeddings()
            .await?
            .into_iter()
            .filter_map(|row| {
                let profile = profiles.get(&row.profile_id)?;
                let intro = profile.intro.as_deref().filter(|s| !s.trim().is_empty())?;
                let embedding = parse_embedding(row.intro.as_deref())?;
                Some(ClusterInput {
                    profile_id: profile.id.clone(),
                    name: Some(profile.name.clone()),
                    company: profile.company.clone(),
                    role: profile.role.clone(),
                    intro: intro.to_string(),
                    embedding,
                })
            })
            .collect();

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (mut clusters, meta) = build_intro_clusters(&inputs, k, &mut rng)?;

        if let Some(summarizer) = &self.summarizer {
            summarize_all(summarizer.as_ref(), &mut clusters).await;
        }
        info!(total_profiles = meta.total_profiles, k = meta.k, "Recomputed intro clusters");
        Ok((clusters, meta))
    }
}

async fn summarize_all(summarizer: &dyn ClusterSummarizer, clusters: &mut [IntroCluster]) {
    let samples: Vec<Vec<ClusterSample>> = clusters
        .iter()
        .map(|c| {
            c.members
                .iter()
                .map(|m| ClusterSample {
                    name: m.name.clone(),
                    snippet: m.intro_snippet.clone(),
                })
                .collect()
        })
        .collect();
    let results = join_all(samples.iter().map(|s| summarizer.summarize(s))).await;

    for (cluster, result) in clusters.iter_mut().zip(results) {
        match result {
            Ok(Some(keywords)) if !keywords.is_empty() => cluster.keywords = keywords,
            Ok(_) => {}
            Err(e) => warn!(cluster = cluster.cluster_id, error = %e, "Cluster summary failed"),
        }
    }
}
