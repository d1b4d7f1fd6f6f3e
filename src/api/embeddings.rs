//! Facet embedding endpoints
//!
//! POST /api/v1/embeddings/sync - Re-embed one profile's facets
//! POST /api/v1/embeddings/backfill - Embed intros that lack a vector
//!
//! Both answer 503 when no embedding provider is configured.

use std::sync::Arc;

use axum::{routing::post, Extension, Json, Router};
use relation_core::{BackfillReport, FacetSync, SyncReport, DEFAULT_BACKFILL_LIMIT};
use serde::Deserialize;

use super::{ApiError, ApiResponse, ApiResult};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub profile_id: String,
}

fn default_limit() -> usize {
    DEFAULT_BACKFILL_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct BackfillRequest {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub force: bool,
}

impl Default for BackfillRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_BACKFILL_LIMIT,
            force: false,
        }
    }
}

fn facet_sync(state: &AppState) -> Result<&FacetSync, ApiError> {
    state.sync.as_deref().ok_or_else(|| {
        ApiError(relation_core::Error::NotConfigured(
            "embedding provider".to_string(),
        ))
    })
}

async fn sync_profile(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<SyncRequest>,
) -> ApiResult<SyncReport> {
    if request.profile_id.trim().is_empty() {
        return Err(ApiError::validation("profile_id is required"));
    }
    let report = facet_sync(&state)?.sync_profile(&request.profile_id).await?;
    Ok(Json(ApiResponse::success(report)))
}

async fn backfill(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<BackfillRequest>>,
) -> ApiResult<BackfillReport> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let report = facet_sync(&state)?
        .backfill_intro(request.limit, request.force)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

/// Create embedding routes
pub fn embeddings_routes() -> Router {
    Router::new()
        .route("/api/v1/embeddings/sync", post(sync_profile))
        .route("/api/v1/embeddings/backfill", post(backfill))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{json, send, test_state, test_state_with_embedder};
    use axum::http::StatusCode;
    use relation_store::NewProfile;
    use serde_json::json as j;

    #[tokio::test]
    async fn test_unconfigured_sync_is_unavailable() {
        let state = test_state().await;
        let (status, body) = send(
            &state,
            json("POST", "/api/v1/embeddings/sync", j!({"profile_id": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_sync_unknown_profile_is_not_found() {
        let state = test_state_with_embedder().await;
        let (status, _) = send(
            &state,
            json("POST", "/api/v1/embeddings/sync", j!({"profile_id": "ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_backfill_embeds_missing_intros() {
        let state = test_state_with_embedder().await;
        // Written straight to the store so nothing is mirrored.
        for name in ["Mina", "Jun"] {
            state
                .store
                .create_profile(&NewProfile {
                    name: name.into(),
                    intro: Some(format!("{name} builds things")),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let (status, body) = send(
            &state,
            json("POST", "/api/v1/embeddings/backfill", j!({"limit": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["processed"], 1);
        assert_eq!(body["data"]["remaining"], 1);
        assert_eq!(body["data"]["total"], 2);

        let (_, body) = send(&state, json("POST", "/api/v1/embeddings/backfill", j!({}))).await;
        assert_eq!(body["data"]["processed"], 1);
        assert_eq!(body["data"]["remaining"], 0);
    }
}
