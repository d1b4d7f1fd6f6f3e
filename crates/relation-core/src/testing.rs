//! Fakes shared by service tests.

use async_trait::async_trait;
use relation_llm::{ClusterSample, ClusterSummarizer, EmbeddingProvider};
use relation_store::NewProfile;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Deterministic embedder: letter counts folded into eight buckets.
pub struct FakeEmbedder {
    fail_after: Option<usize>,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self {
            fail_after: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Succeeds for the first `n` calls, then fails.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            calls: AtomicUsize::new(0),
        }
    }
}

pub fn fake_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; 8];
    for c in text.to_lowercase().chars().filter(|c| c.is_alphanumeric()) {
        v[(c as u32 % 8) as usize] += 1.0;
    }
    v
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> relation_llm::Result<Vec<Vec<f32>>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|n| call >= n) {
            return Err(relation_llm::Error::Api("quota exceeded".to_string()));
        }
        Ok(texts.iter().map(|t| fake_vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        8
    }

    fn name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-8"
    }
}

/// Summarizer that always answers with fixed keywords, or always fails.
pub struct FixedSummarizer(pub Option<Vec<String>>);

#[async_trait]
impl ClusterSummarizer for FixedSummarizer {
    async fn summarize(
        &self,
        _members: &[ClusterSample],
    ) -> relation_llm::Result<Option<Vec<String>>> {
        match &self.0 {
            Some(k) => Ok(Some(k.clone())),
            None => Err(relation_llm::Error::Network("unreachable".to_string())),
        }
    }
}

pub fn profile_with(
    name: &str,
    intro: Option<&str>,
    work: Option<&str>,
    hobby: Option<&str>,
) -> NewProfile {
    NewProfile {
        name: name.to_string(),
        intro: intro.map(str::to_string),
        work: work.map(str::to_string),
        hobby: hobby.map(str::to_string),
        ..Default::default()
    }
}
