//! POST /api/v1/ai-picks - Nearest profiles per facet

use std::sync::Arc;

use axum::{routing::post, Extension, Json, Router};
use relation_core::{AiPicks, DEFAULT_PICK_LIMIT};
use serde::Deserialize;

use super::{ApiResponse, ApiResult};
use crate::server::AppState;

fn default_limit() -> usize {
    DEFAULT_PICK_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct PicksRequest {
    #[serde(default)]
    pub profile_id: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

async fn ai_picks(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<PicksRequest>,
) -> ApiResult<AiPicks> {
    let picks = state
        .recommender
        .ai_picks(&request.profile_id, Some(request.limit))
        .await?;
    Ok(Json(ApiResponse::success(picks)))
}

/// Create AI picks routes
pub fn picks_routes() -> Router {
    Router::new().route("/api/v1/ai-picks", post(ai_picks))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{json, send, test_state, test_state_with_embedder};
    use axum::http::StatusCode;
    use relation_store::NewProfile;
    use serde_json::json as j;

    #[tokio::test]
    async fn test_missing_profile_id_is_bad_request() {
        let state = test_state().await;
        let (status, _) = send(&state, json("POST", "/api/v1/ai-picks", j!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_profile_without_embeddings_gets_empty_picks() {
        let state = test_state().await;
        let (status, body) = send(
            &state,
            json("POST", "/api/v1/ai-picks", j!({"profile_id": "ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["intro"], j!([]));
        assert_eq!(body["data"]["combined"], j!([]));
    }

    #[tokio::test]
    async fn test_picks_exclude_self_and_respect_limit() {
        let state = test_state_with_embedder().await;
        let mut ids = Vec::new();
        for (name, intro) in [
            ("Mina", "robots and factories"),
            ("Jun", "robotic factory lines"),
            ("Ara", "coffee and pastry"),
        ] {
            let p = state
                .directory
                .create(NewProfile {
                    name: name.into(),
                    intro: Some(intro.into()),
                    ..Default::default()
                })
                .await
                .unwrap();
            ids.push(p.id);
        }
        state.effects.flush().await;

        let (status, body) = send(
            &state,
            json("POST", "/api/v1/ai-picks", j!({"profile_id": ids[0], "limit": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let intro = body["data"]["intro"].as_array().unwrap();
        assert_eq!(intro.len(), 1);
        assert_ne!(intro[0]["profile_id"], j!(ids[0]));
        assert!(body["data"]["combined"].as_array().unwrap().len() <= 1);
    }
}
