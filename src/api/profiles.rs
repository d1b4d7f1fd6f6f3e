//! Profile directory endpoints
//!
//! GET   /api/v1/profiles - List profiles
//! POST  /api/v1/profiles - Create a profile
//! GET   /api/v1/profiles/:id - One profile
//! PATCH /api/v1/profiles/:id - Update a profile

use std::sync::Arc;

use axum::{
    extract::Path,
    routing::get,
    Extension, Json, Router,
};
use relation_store::{NewProfile, Profile, ProfilePatch};

use super::{ApiError, ApiResponse, ApiResult};
use crate::server::AppState;

async fn list_profiles(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Vec<Profile>> {
    Ok(Json(ApiResponse::success(state.directory.list().await?)))
}

async fn create_profile(
    Extension(state): Extension<Arc<AppState>>,
    Json(new): Json<NewProfile>,
) -> ApiResult<Profile> {
    if new.name.trim().is_empty() {
        return Err(ApiError::validation("name is required"));
    }
    Ok(Json(ApiResponse::success(state.directory.create(new).await?)))
}

async fn get_profile(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Profile> {
    Ok(Json(ApiResponse::success(state.directory.get(&id).await?)))
}

async fn update_profile(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<ProfilePatch>,
) -> ApiResult<Profile> {
    Ok(Json(ApiResponse::success(
        state.directory.update(&id, patch).await?,
    )))
}

/// Create profile routes
pub fn profiles_routes() -> Router {
    Router::new()
        .route("/api/v1/profiles", get(list_profiles).post(create_profile))
        .route(
            "/api/v1/profiles/:id",
            get(get_profile).patch(update_profile),
        )
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{get, json, send, test_state};
    use axum::http::StatusCode;
    use serde_json::json as j;

    #[tokio::test]
    async fn test_create_get_and_patch() {
        let state = test_state().await;
        let (status, body) = send(
            &state,
            json(
                "POST",
                "/api/v1/profiles",
                j!({"name": "Mina", "company": "Orbit", "tags": ["fintech"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &state,
            json("PATCH", &format!("/api/v1/profiles/{id}"), j!({"role": "CEO"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["role"], "CEO");
        assert_eq!(body["data"]["company"], "Orbit");

        let (_, body) = send(&state, get(&format!("/api/v1/profiles/{id}"))).await;
        assert_eq!(body["data"]["name"], "Mina");

        let (_, body) = send(&state, get("/api/v1/profiles")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let state = test_state().await;
        let (status, body) = send(&state, json("POST", "/api/v1/profiles", j!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let state = test_state().await;
        let (status, _) = send(&state, get("/api/v1/profiles/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&state, json("PATCH", "/api/v1/profiles/nope", j!({"role": "x"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
