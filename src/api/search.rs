//! POST /api/v1/search - Text and optional vector search over profiles

use std::sync::Arc;

use axum::{routing::post, Extension, Json, Router};
use relation_core::{SearchResults, DEFAULT_SEARCH_LIMIT};
use serde::Deserialize;

use super::{ApiResponse, ApiResult};
use crate::server::AppState;

fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub use_vector: bool,
}

async fn search(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<SearchResults> {
    let results = state
        .search
        .search(&request.q, Some(request.limit), request.use_vector)
        .await?;
    Ok(Json(ApiResponse::success(results)))
}

/// Create search routes
pub fn search_routes() -> Router {
    Router::new().route("/api/v1/search", post(search))
}
