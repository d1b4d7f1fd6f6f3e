//! Vector index abstraction for profile facet vectors.
//!
//! Records are keyed `{profile_id}:{facet}` and carry the profile id and
//! facet as metadata so queries can be filtered to one facet.
//!
//! # Example
//!
//! ```ignore
//! use relation_search::{Facet, MemoryIndex, VectorIndex, VectorRecord};
//!
//! let index = MemoryIndex::new();
//! index.upsert(vec![VectorRecord::for_facet("p1", Facet::Intro, embedding)]).await?;
//! let matches = index.query(&query, 5, Some(Facet::Intro)).await?;
//! ```

use crate::error::Result;
use crate::ranking::Facet;
use crate::similarity::cosine_similarity;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, instrument};

/// Metadata stored alongside each vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorMetadata {
    /// Owning profile
    pub profile_id: String,
    /// Facet the vector encodes
    pub vector_type: Facet,
}

/// A vector to upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Record id (`{profile_id}:{facet}`)
    pub id: String,
    /// Embedding values
    pub values: Vec<f32>,
    /// Metadata
    pub metadata: VectorMetadata,
}

impl VectorRecord {
    /// Record for one facet of a profile.
    pub fn for_facet(profile_id: &str, facet: Facet, values: Vec<f32>) -> Self {
        Self {
            id: facet.vector_id(profile_id),
            values,
            metadata: VectorMetadata {
                profile_id: profile_id.to_string(),
                vector_type: facet,
            },
        }
    }
}

/// A query hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMatch {
    /// Record id
    pub id: String,
    /// Similarity score (higher is closer)
    pub score: f32,
    /// Record metadata, when the index returns it
    pub metadata: Option<VectorMetadata>,
}

impl IndexMatch {
    /// Profile id from metadata, falling back to the id prefix.
    pub fn profile_id(&self) -> &str {
        match &self.metadata {
            Some(m) => &m.profile_id,
            None => self.id.split(':').next().unwrap_or(&self.id),
        }
    }
}

/// Remote or local store of facet vectors.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace records.
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()>;

    /// Top `top_k` records by cosine similarity, optionally limited to one facet.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        facet: Option<Facet>,
    ) -> Result<Vec<IndexMatch>>;

    /// Delete records by id. Unknown ids are ignored.
    async fn delete(&self, ids: Vec<String>) -> Result<()>;

    /// Implementation name for logs.
    fn name(&self) -> &str;
}

/// In-process index backed by a map. Used when no remote index is
/// configured and in tests.
#[derive(Default)]
pub struct MemoryIndex {
    records: RwLock<HashMap<String, VectorRecord>>,
}

impl MemoryIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a record id is present.
    pub fn contains(&self, id: &str) -> bool {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        let mut map = self.records.write().unwrap_or_else(|e| e.into_inner());
        for record in records {
            map.insert(record.id.clone(), record);
        }
        Ok(())
    }

    #[instrument(skip(self, vector), fields(top_k = top_k))]
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        facet: Option<Facet>,
    ) -> Result<Vec<IndexMatch>> {
        let map = self.records.read().unwrap_or_else(|e| e.into_inner());
        let mut matches: Vec<IndexMatch> = map
            .values()
            .filter(|r| facet.map_or(true, |f| r.metadata.vector_type == f))
            .filter_map(|r| {
                let score = cosine_similarity(vector, &r.values)?;
                Some(IndexMatch {
                    id: r.id.clone(),
                    score,
                    metadata: Some(r.metadata.clone()),
                })
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        matches.truncate(top_k);
        debug!("Found {} matches", matches.len());
        Ok(matches)
    }

    async fn delete(&self, ids: Vec<String>) -> Result<()> {
        let mut map = self.records.write().unwrap_or_else(|e| e.into_inner());
        for id in ids {
            map.remove(&id);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
