//! GET /api/v1/me - The signed-in user and their profile

use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use relation_core::SessionUser;
use relation_store::Profile;
use serde::Serialize;

use super::{ApiResponse, ApiResult};
use crate::middleware::auth::CurrentUser;
use crate::server::AppState;

/// Session user plus the matching profile, both optional
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: Option<SessionUser>,
    pub profile: Option<Profile>,
}

async fn me(
    Extension(state): Extension<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<MeResponse> {
    let profile = match &user {
        Some(user) => state.directory.me(user).await?,
        None => None,
    };
    Ok(Json(ApiResponse::success(MeResponse { user, profile })))
}

/// Create me routes
pub fn me_routes() -> Router {
    Router::new().route("/api/v1/me", get(me))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{get, send, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use relation_store::NewProfile;

    #[tokio::test]
    async fn test_anonymous_me() {
        let state = test_state().await;
        let (status, body) = send(&state, get("/api/v1/me")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["user"].is_null());
        assert!(body["data"]["profile"].is_null());
    }

    #[tokio::test]
    async fn test_me_matches_by_nickname() {
        let state = test_state().await;
        state
            .directory
            .create(NewProfile {
                name: "Mina".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let request = Request::builder()
            .uri("/api/v1/me")
            .header("cookie", r#"relation_session={"id":"77","nickname":"Mina"}"#)
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(&state, request).await;
        assert_eq!(body["data"]["user"]["id"], "77");
        assert_eq!(body["data"]["profile"]["name"], "Mina");
    }
}
