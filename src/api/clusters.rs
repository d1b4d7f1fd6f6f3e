//! GET /api/v1/intro-clusters?k=&force= - Intro clusters, cached

use std::sync::Arc;

use axum::{extract::Query, routing::get, Extension, Json, Router};
use relation_core::ClusterResponse;
use serde::Deserialize;

use super::{ApiResponse, ApiResult};
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ClusterQuery {
    pub k: Option<usize>,
    #[serde(default)]
    pub force: bool,
}

async fn intro_clusters(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<ClusterQuery>,
) -> ApiResult<ClusterResponse> {
    Ok(Json(ApiResponse::success(
        state.clusters.get(query.k, query.force).await?,
    )))
}

/// Create intro cluster routes
pub fn clusters_routes() -> Router {
    Router::new().route("/api/v1/intro-clusters", get(intro_clusters))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{get, send, test_state, test_state_with_embedder};
    use axum::http::StatusCode;
    use relation_store::NewProfile;
    use serde_json::json as j;

    #[tokio::test]
    async fn test_no_embeddings_gives_no_clusters() {
        let state = test_state().await;
        let (status, body) = send(&state, get("/api/v1/intro-clusters")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["clusters"], j!([]));
    }

    #[tokio::test]
    async fn test_second_call_is_cached_unless_forced() {
        let state = test_state_with_embedder().await;
        for (name, intro) in [
            ("Mina", "robots and factories"),
            ("Jun", "robotic factory lines"),
            ("Ara", "coffee and pastry"),
        ] {
            state
                .directory
                .create(NewProfile {
                    name: name.into(),
                    intro: Some(intro.into()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        state.effects.flush().await;

        let (status, body) = send(&state, get("/api/v1/intro-clusters?k=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["cached"], false);
        let sizes: u64 = body["data"]["clusters"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["size"].as_u64().unwrap())
            .sum();
        assert_eq!(sizes, 3);

        let (_, body) = send(&state, get("/api/v1/intro-clusters?k=2")).await;
        assert_eq!(body["data"]["cached"], true);

        let (_, body) = send(&state, get("/api/v1/intro-clusters?k=2&force=true")).await;
        assert_eq!(body["data"]["cached"], false);
    }
}
