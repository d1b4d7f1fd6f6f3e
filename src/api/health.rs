//! Health check endpoint
//!
//! `/health` returns status, version and the profile count.

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::server::AppState;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<u64>,
}

async fn health(Extension(state): Extension<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    match state.store.profile_count().await {
        Ok(count) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                version: env!("CARGO_PKG_VERSION"),
                profiles: Some(count),
            }),
        ),
        Err(e) => {
            warn!("Health check database probe failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    version: env!("CARGO_PKG_VERSION"),
                    profiles: None,
                }),
            )
        }
    }
}

/// Create health routes
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health))
}
