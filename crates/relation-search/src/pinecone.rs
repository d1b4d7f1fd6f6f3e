//! Pinecone-compatible HTTP vector index.
//!
//! Talks to an index host's data plane: `/vectors/upsert`, `/query` and
//! `/vectors/delete`, authenticated with the `Api-Key` header. No retries.

use crate::error::{Error, Result};
use crate::index::{IndexMatch, VectorIndex, VectorMetadata, VectorRecord};
use crate::ranking::Facet;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Connection settings for a Pinecone index.
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    /// Index host, e.g. `https://profiles-abc123.svc.us-east-1.pinecone.io`
    pub host: String,
    /// API key
    pub api_key: String,
    /// Namespace; empty for the default namespace
    pub namespace: String,
    /// Request timeout
    pub timeout: Duration,
}

/// HTTP client for one Pinecone index.
#[derive(Clone)]
pub struct PineconeIndex {
    client: Client,
    host: String,
    namespace: String,
}

impl PineconeIndex {
    /// Build a client. Fails on an empty key or a non-http(s) host.
    pub fn new(config: PineconeConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Index("missing Pinecone API key".to_string()));
        }
        if !(config.host.starts_with("http://") || config.host.starts_with("https://")) {
            return Err(Error::Index("Pinecone host must be an http(s) URL".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(config.api_key.trim())
                .map_err(|e| Error::Index(format!("invalid Pinecone API key: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            namespace: config.namespace,
        })
    }

    fn namespace(&self) -> Option<&str> {
        (!self.namespace.is_empty()).then_some(self.namespace.as_str())
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.host, path);
        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        Err(Error::Index(format!(
            "Pinecone {} failed ({}): {}",
            path, status, text
        )))
    }
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<VectorMetadata>,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

fn facet_filter(facet: Option<Facet>) -> Option<serde_json::Value> {
    facet.map(|f| serde_json::json!({ "vector_type": { "$eq": f.as_str() } }))
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let body = UpsertRequest {
            vectors: &records,
            namespace: self.namespace(),
        };
        self.post("/vectors/upsert", &body).await?;
        debug!("Upserted {} vectors", records.len());
        Ok(())
    }

    #[instrument(skip(self, vector), fields(top_k = top_k))]
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        facet: Option<Facet>,
    ) -> Result<Vec<IndexMatch>> {
        let body = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            filter: facet_filter(facet),
            namespace: self.namespace(),
        };
        let resp: QueryResponse = self.post("/query", &body).await?.json().await?;
        Ok(resp
            .matches
            .into_iter()
            .map(|m| IndexMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete(&self, ids: Vec<String>) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let body = DeleteRequest {
            ids: &ids,
            namespace: self.namespace(),
        };
        self.post("/vectors/delete", &body).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}
