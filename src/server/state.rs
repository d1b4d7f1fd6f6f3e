//! Shared application state handed to every handler.

use relation_core::{
    Directory, FacetSync, IntroClusters, Likes, QuizRuns, Recommender, Search, SheetSink,
    SideEffectQueue,
};
use relation_llm::{ClusterSummarizer, SharedEmbeddingProvider};
use relation_quiz::QuestionDeck;
use relation_search::VectorIndex;
use relation_store::RelationStore;
use std::sync::Arc;

/// Optional external services.
#[derive(Default, Clone)]
pub struct Integrations {
    pub embedder: Option<SharedEmbeddingProvider>,
    pub index: Option<Arc<dyn VectorIndex>>,
    pub sheets: Option<Arc<dyn SheetSink>>,
    pub summarizer: Option<Arc<dyn ClusterSummarizer>>,
}

/// Every service the HTTP API and CLI commands use.
pub struct AppState {
    pub store: RelationStore,
    pub effects: SideEffectQueue,
    pub directory: Directory,
    pub likes: Likes,
    pub recommender: Recommender,
    pub search: Search,
    pub clusters: IntroClusters,
    /// `None` without an embedding provider
    pub sync: Option<Arc<FacetSync>>,
    pub quiz: QuizRuns,
    pub cookie_name: String,
}

impl AppState {
    /// Wire services over one store and one side-effect queue.
    pub fn new(
        store: RelationStore,
        effects: SideEffectQueue,
        integrations: Integrations,
        cluster_seed: Option<u64>,
        cookie_name: impl Into<String>,
    ) -> Self {
        let Integrations {
            embedder,
            index,
            sheets,
            summarizer,
        } = integrations;

        let sync = embedder
            .clone()
            .map(|e| Arc::new(FacetSync::new(store.clone(), e, index.clone())));

        let mut directory = Directory::new(store.clone(), effects.clone());
        if let Some(sink) = sheets {
            directory = directory.with_sheets(sink);
        }
        if let Some(sync) = &sync {
            directory = directory.with_facet_sync(Arc::clone(sync));
        }

        let mut clusters = IntroClusters::new(store.clone(), cluster_seed);
        if let Some(summarizer) = summarizer {
            clusters = clusters.with_summarizer(summarizer);
        }

        Self {
            likes: Likes::new(store.clone()),
            recommender: Recommender::new(store.clone(), index.clone()),
            search: Search::new(store.clone(), embedder, index),
            quiz: QuizRuns::new(
                Arc::new(QuestionDeck::founder()),
                store.clone(),
                effects.clone(),
            ),
            directory,
            clusters,
            sync,
            store,
            effects,
            cookie_name: cookie_name.into(),
        }
    }
}
