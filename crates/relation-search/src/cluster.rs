//! Intro clusters: k-means output decorated for display.

use crate::error::Result;
use crate::keywords::{extract_top_keywords, intro_snippet, DEFAULT_KEYWORD_LIMIT};
use crate::kmeans::{choose_k, KMeans};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// A profile with a usable intro embedding.
#[derive(Debug, Clone)]
pub struct ClusterInput {
    /// Profile id
    pub profile_id: String,
    /// Display name
    pub name: Option<String>,
    /// Company
    pub company: Option<String>,
    /// Role
    pub role: Option<String>,
    /// Raw intro text (non-empty after trimming)
    pub intro: String,
    /// Intro embedding
    pub embedding: Vec<f32>,
}

/// A cluster member as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMember {
    /// Profile id
    pub profile_id: String,
    /// Display name
    pub name: Option<String>,
    /// Company
    pub company: Option<String>,
    /// Role
    pub role: Option<String>,
    /// Intro cut for display
    #[serde(rename = "introSnippet")]
    pub intro_snippet: String,
}

/// One group of similar intros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroCluster {
    /// k-means cluster index
    #[serde(rename = "clusterId")]
    pub cluster_id: usize,
    /// `Cluster {cluster_id + 1}`
    pub label: String,
    /// Member count
    pub size: usize,
    /// Top keywords of the members' intros
    pub keywords: Vec<String>,
    /// Members in input order
    pub members: Vec<ClusterMember>,
}

/// Summary counts returned with clusters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMeta {
    /// Profiles that took part in clustering
    #[serde(rename = "totalProfiles")]
    pub total_profiles: usize,
    /// Non-empty clusters returned
    pub k: usize,
}

/// Most common non-zero embedding length. Ties go to the length seen first.
pub fn dominant_dimension(inputs: &[ClusterInput]) -> Option<usize> {
    let mut counts: HashMap<usize, (usize, usize)> = HashMap::new();
    for (pos, input) in inputs.iter().enumerate() {
        let len = input.embedding.len();
        if len > 0 {
            counts.entry(len).or_insert((0, pos)).0 += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(len, _)| len)
}

/// Cluster profiles by intro embedding and decorate each group.
///
/// Only embeddings of the [`dominant_dimension`] take part; the rest are
/// skipped as unusable. Clusters come back largest first; equal sizes keep
/// the order in which their first member appears in `inputs`. Empty
/// clusters are dropped.
pub fn build_intro_clusters<R: Rng>(
    inputs: &[ClusterInput],
    requested_k: Option<usize>,
    rng: &mut R,
) -> Result<(Vec<IntroCluster>, ClusterMeta)> {
    let Some(dimensions) = dominant_dimension(inputs) else {
        return Ok((Vec::new(), ClusterMeta::default()));
    };
    let total = inputs.len();
    let inputs: Vec<&ClusterInput> = inputs
        .iter()
        .filter(|i| i.embedding.len() == dimensions)
        .collect();
    if inputs.len() < total {
        warn!(
            skipped = total - inputs.len(),
            dimensions, "Skipping intro embeddings of a different length"
        );
    }
    let vectors: Vec<Vec<f32>> = inputs.iter().map(|i| i.embedding.clone()).collect();
    let k = choose_k(vectors.len(), requested_k);
    let result = KMeans::new(k).fit(&vectors, rng)?;

    // cluster index -> member input indices, in first-appearance order
    let mut seen: Vec<usize> = Vec::new();
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); result.centroids.len()];
    for (i, &c) in result.assignments.iter().enumerate() {
        if groups[c].is_empty() {
            seen.push(c);
        }
        groups[c].push(i);
    }

    let mut clusters: Vec<IntroCluster> = seen
        .into_iter()
        .map(|c| {
            let members = &groups[c];
            let combined = members
                .iter()
                .map(|&i| inputs[i].intro.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            IntroCluster {
                cluster_id: c,
                label: format!("Cluster {}", c + 1),
                size: members.len(),
                keywords: extract_top_keywords(&combined, DEFAULT_KEYWORD_LIMIT),
                members: members
                    .iter()
                    .map(|&i| {
                        let input = &inputs[i];
                        ClusterMember {
                            profile_id: input.profile_id.clone(),
                            name: input.name.clone(),
                            company: input.company.clone(),
                            role: input.role.clone(),
                            intro_snippet: intro_snippet(&input.intro),
                        }
                    })
                    .collect(),
            }
        })
        .collect();

    clusters.sort_by(|a, b| b.size.cmp(&a.size));

    let meta = ClusterMeta {
        total_profiles: inputs.len(),
        k: clusters.len(),
    };
    info!(
        total_profiles = meta.total_profiles,
        k = meta.k,
        "Built intro clusters"
    );
    Ok((clusters, meta))
}
