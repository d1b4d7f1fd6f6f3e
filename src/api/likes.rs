//! Likes endpoints
//!
//! GET  /api/v1/likes?liker_id=... - Ids liked by a profile
//! POST /api/v1/likes - Like or unlike

use std::sync::Arc;

use axum::{extract::Query, routing::get, Extension, Json, Router};
use relation_core::LikeState;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResponse, ApiResult};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct LikedQuery {
    pub liker_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LikedIds {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub liker_id: String,
    pub likee_id: String,
    pub on: bool,
}

async fn liked_by(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<LikedQuery>,
) -> ApiResult<LikedIds> {
    let liker_id = query
        .liker_id
        .ok_or_else(|| ApiError::validation("liker_id is required"))?;
    let ids = state.likes.liked_by(&liker_id).await?;
    Ok(Json(ApiResponse::success(LikedIds { ids })))
}

async fn set_like(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<LikeRequest>,
) -> ApiResult<LikeState> {
    Ok(Json(ApiResponse::success(
        state
            .likes
            .set_like(&request.liker_id, &request.likee_id, request.on)
            .await?,
    )))
}

/// Create likes routes
pub fn likes_routes() -> Router {
    Router::new().route("/api/v1/likes", get(liked_by).post(set_like))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{get, json, send, test_state};
    use axum::http::StatusCode;
    use relation_store::NewProfile;
    use serde_json::json as j;

    #[tokio::test]
    async fn test_like_then_unlike() {
        let state = test_state().await;
        let mut ids = Vec::new();
        for name in ["A", "B"] {
            let p = state
                .directory
                .create(NewProfile {
                    name: name.into(),
                    ..Default::default()
                })
                .await
                .unwrap();
            ids.push(p.id);
        }

        let (status, body) = send(
            &state,
            json("POST", "/api/v1/likes", j!({"liker_id": ids[0], "likee_id": ids[1], "on": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["liked"], true);

        let (_, body) = send(&state, get(&format!("/api/v1/likes?liker_id={}", ids[0]))).await;
        assert_eq!(body["data"]["ids"], j!([ids[1]]));

        send(
            &state,
            json("POST", "/api/v1/likes", j!({"liker_id": ids[0], "likee_id": ids[1], "on": false})),
        )
        .await;
        let (_, body) = send(&state, get(&format!("/api/v1/likes?liker_id={}", ids[0]))).await;
        assert_eq!(body["data"]["ids"], j!([]));
    }

    #[tokio::test]
    async fn test_missing_liker_is_bad_request() {
        let state = test_state().await;
        let (status, _) = send(&state, get("/api/v1/likes")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
