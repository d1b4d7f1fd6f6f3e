//! Web API module for Relation
//!
//! Provides REST API endpoints for:
//! - Founder quiz runs and swipe analytics
//! - Profile directory, likes and the signed-in member
//! - Search, AI picks and intro clusters
//! - Facet embedding sync and backfill

pub mod clusters;
pub mod embeddings;
pub mod health;
pub mod likes;
pub mod me;
pub mod picks;
pub mod profiles;
pub mod quiz;
pub mod search;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::server::AppState;

pub use clusters::clusters_routes;
pub use embeddings::embeddings_routes;
pub use health::health_routes;
pub use likes::likes_routes;
pub use me::me_routes;
pub use picks::picks_routes;
pub use profiles::profiles_routes;
pub use quiz::quiz_routes;
pub use search::search_routes;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Service error rendered as an `ApiResponse`.
#[derive(Debug)]
pub struct ApiError(pub relation_core::Error);

impl From<relation_core::Error> for ApiError {
    fn from(e: relation_core::Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    /// Shorthand for a 400.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(relation_core::Error::Validation(message.into()))
    }

    fn status(&self) -> StatusCode {
        use relation_core::Error;
        match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "Request failed: {}", self.0);
        }
        let body = ApiResponse::<()>::error(self.0.to_string());
        (status, Json(body)).into_response()
    }
}

/// Handler result carrying the standard envelope.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Create the API router with all endpoints
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(quiz_routes())
        .merge(profiles_routes())
        .merge(me_routes())
        .merge(likes_routes())
        .merge(search_routes())
        .merge(picks_routes())
        .merge(clusters_routes())
        .merge(embeddings_routes())
        .layer(Extension(state))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::server::Integrations;
    use axum::body::Body;
    use axum::http::Request;
    use relation_core::SideEffectQueue;
    use relation_store::RelationStore;
    use tower::ServiceExt;

    pub async fn test_state_with(integrations: Integrations) -> Arc<AppState> {
        let store = RelationStore::in_memory().await.unwrap();
        let (effects, _worker) = SideEffectQueue::spawn(16);
        Arc::new(AppState::new(
            store,
            effects,
            integrations,
            Some(7),
            crate::middleware::auth::DEFAULT_SESSION_COOKIE,
        ))
    }

    pub async fn test_state() -> Arc<AppState> {
        test_state_with(Integrations::default()).await
    }

    pub async fn send(
        state: &Arc<AppState>,
        request: Request<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let response = router(Arc::clone(state)).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, body)
    }

    /// Letter counts in eight buckets.
    pub struct BucketEmbedder;

    #[async_trait::async_trait]
    impl relation_llm::EmbeddingProvider for BucketEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> relation_llm::Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    let mut v = vec![0.0f32; 8];
                    for c in text.to_lowercase().chars().filter(|c| c.is_alphanumeric()) {
                        v[(c as u32 % 8) as usize] += 1.0;
                    }
                    v
                })
                .collect())
        }

        fn dimensions(&self) -> usize {
            8
        }

        fn name(&self) -> &str {
            "buckets"
        }

        fn model(&self) -> &str {
            "buckets-8"
        }
    }

    pub async fn test_state_with_embedder() -> Arc<AppState> {
        test_state_with(Integrations {
            embedder: Some(Arc::new(BucketEmbedder)),
            ..Default::default()
        })
        .await
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn json(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}
