//! Relation Search - Profile Similarity and Intro Clustering
//!
//! This crate provides the recommendation layer of the directory:
//! - `similarity`: cosine similarity with explicit "undefined" results
//! - `ranking`: per-facet ranking and cross-facet merge
//! - `kmeans` / `cluster`: cosine k-means over intro embeddings, decorated
//!   with keywords and snippets
//! - `index`: `VectorIndex` trait with in-memory and Pinecone implementations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Stored embeddings (JSON text) ──► parse_embedding()        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//! ┌─────────────────────────┐     ┌─────────────────────────────┐
//! │  rank() per facet       │     │  build_intro_clusters()     │
//! │  merge_facets()         │     │  KMeans + keywords          │
//! └─────────────────────────┘     └─────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use relation_search::{rank, Facet};
//!
//! let picks = rank(&my_intro, candidates, Some(my_id), 4);
//! for m in picks {
//!     println!("{}: distance={:.3}", m.profile_id, m.distance);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cluster;
pub mod embedding;
pub mod error;
pub mod index;
pub mod keywords;
pub mod kmeans;
pub mod pinecone;
pub mod ranking;
pub mod similarity;

pub use cluster::{
    build_intro_clusters, dominant_dimension, ClusterInput, ClusterMember, ClusterMeta,
    IntroCluster,
};
pub use embedding::{encode_embedding, parse_embedding};
pub use error::{Error, Result};
pub use index::{IndexMatch, MemoryIndex, VectorIndex, VectorMetadata, VectorRecord};
pub use keywords::{extract_top_keywords, intro_snippet};
pub use kmeans::{choose_k, KMeans, KMeansResult};
pub use pinecone::{PineconeConfig, PineconeIndex};
pub use ranking::{merge_facets, rank, Facet, FacetMatches, MergedMatch, ScoredMatch};
pub use similarity::cosine_similarity;
