//! Quiz API endpoints
//!
//! GET  /api/v1/quiz/deck - The question deck
//! POST /api/v1/quiz/runs - Start a run
//! GET  /api/v1/quiz/runs/:id - Run state
//! DELETE /api/v1/quiz/runs/:id - Drop a run from memory
//! POST /api/v1/quiz/runs/:id/answers - Record a swipe
//! POST /api/v1/quiz/runs/:id/undo - Take back the last swipe
//! POST /api/v1/quiz/runs/:id/reset - Start over
//! PUT  /api/v1/quiz/runs/:id/participant - Change participant details
//! GET  /api/v1/quiz/analytics - List swipe analytics
//! POST /api/v1/quiz/analytics - Record a swipe analytics event

use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use relation_core::{AnswerInput, Participant, RunView};
use relation_quiz::QuestionDeck;
use relation_store::{AnalyticsEvent, AnalyticsFilter, NewAnalyticsEvent};
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiError, ApiResponse, ApiResult};
use crate::middleware::auth::CurrentUser;
use crate::server::AppState;

/// Drop coordinates of a swiped card
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DropPosition {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Analytics event as sent by the quiz client
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRequest {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub session_id: Option<String>,
    pub question_id: Option<String>,
    pub answer: Option<serde_json::Value>,
    pub response_ms: Option<f64>,
    pub swipe_direction: Option<String>,
    pub drop_position: Option<DropPosition>,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Analytics list filters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub session_id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub limit: Option<usize>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Answers arrive as strings or booleans; store them as text.
fn answer_text(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => non_blank(Some(s)),
        other => Some(other.to_string()),
    }
}

/// Fill participant gaps from the signed-in user.
fn with_session_defaults(mut participant: Participant, user: &CurrentUser) -> Participant {
    if let Some(user) = &user.0 {
        if participant.external_id.is_none() {
            participant.external_id = Some(user.id.clone());
        }
        if non_blank(participant.name.clone()).is_none() {
            participant.name = user.nickname.clone();
        }
    }
    participant
}

async fn get_deck(Extension(state): Extension<Arc<AppState>>) -> Json<ApiResponse<QuestionDeck>> {
    Json(ApiResponse::success(state.quiz.deck().clone()))
}

async fn create_run(
    Extension(state): Extension<Arc<AppState>>,
    user: CurrentUser,
    body: Option<Json<Participant>>,
) -> Json<ApiResponse<RunView>> {
    let participant = body.map(|Json(p)| p).unwrap_or_default();
    let participant = with_session_defaults(participant, &user);
    Json(ApiResponse::success(state.quiz.create(participant)))
}

async fn get_run(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<RunView> {
    Ok(Json(ApiResponse::success(state.quiz.get(id)?)))
}

async fn delete_run(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Uuid> {
    state.quiz.remove(id)?;
    Ok(Json(ApiResponse::success(id)))
}

async fn answer(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(input): Json<AnswerInput>,
) -> ApiResult<RunView> {
    Ok(Json(ApiResponse::success(state.quiz.answer(id, input)?)))
}

async fn undo(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<RunView> {
    Ok(Json(ApiResponse::success(state.quiz.undo(id)?)))
}

async fn reset(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<RunView> {
    Ok(Json(ApiResponse::success(state.quiz.reset(id)?)))
}

async fn update_participant(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(participant): Json<Participant>,
) -> ApiResult<RunView> {
    Ok(Json(ApiResponse::success(
        state.quiz.update_participant(id, participant)?,
    )))
}

/// Storage failures answer 200 with `success: false` so the client keeps playing.
async fn record_analytics(
    Extension(state): Extension<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<AnalyticsRequest>,
) -> ApiResult<AnalyticsEvent> {
    let (Some(event_type), Some(session_id)) = (
        non_blank(request.event_type),
        non_blank(request.session_id),
    ) else {
        return Err(ApiError::validation("type and sessionId are required"));
    };

    let drop = request.drop_position.unwrap_or_default();
    let event = NewAnalyticsEvent {
        event_type,
        session_id,
        user_id: user.0.map(|u| u.id),
        question_id: non_blank(request.question_id),
        answer: answer_text(request.answer),
        response_ms: request.response_ms.map(|ms| ms.round() as i64),
        swipe_direction: non_blank(request.swipe_direction),
        drop_position_x: drop.x,
        drop_position_y: drop.y,
        timestamp: request.timestamp,
        metadata: match request.metadata {
            serde_json::Value::Null => serde_json::json!({}),
            other => other,
        },
    };

    let outcome = state.quiz.record_event(event).await;
    Ok(Json(match outcome.event {
        Some(stored) => ApiResponse::success(stored),
        None => ApiResponse::error(outcome.error.unwrap_or_default()),
    }))
}

async fn list_analytics(
    Extension(state): Extension<Arc<AppState>>,
    user: CurrentUser,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Vec<AnalyticsEvent>> {
    let filter = AnalyticsFilter {
        session_id: non_blank(query.session_id),
        event_type: non_blank(query.event_type),
        user_id: user.0.map(|u| u.id),
        limit: query.limit,
    };
    Ok(Json(ApiResponse::success(
        state.quiz.list_events(&filter).await?,
    )))
}

/// Create quiz routes
pub fn quiz_routes() -> Router {
    Router::new()
        .route("/api/v1/quiz/deck", get(get_deck))
        .route("/api/v1/quiz/runs", post(create_run))
        .route("/api/v1/quiz/runs/:id", get(get_run).delete(delete_run))
        .route("/api/v1/quiz/runs/:id/answers", post(answer))
        .route("/api/v1/quiz/runs/:id/undo", post(undo))
        .route("/api/v1/quiz/runs/:id/reset", post(reset))
        .route("/api/v1/quiz/runs/:id/participant", put(update_participant))
        .route(
            "/api/v1/quiz/analytics",
            get(list_analytics).post(record_analytics),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{get, json, send, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json as j;

    #[test]
    fn test_answer_text_accepts_strings_and_bools() {
        assert_eq!(answer_text(Some(j!("yes"))).as_deref(), Some("yes"));
        assert_eq!(answer_text(Some(j!(true))).as_deref(), Some("true"));
        assert_eq!(answer_text(Some(j!(""))), None);
        assert_eq!(answer_text(None), None);
    }

    #[tokio::test]
    async fn test_run_lifecycle_over_http() {
        let state = test_state().await;

        let (status, body) = send(&state, json("POST", "/api/v1/quiz/runs", j!({"name": "Mina"}))).await;
        assert_eq!(status, StatusCode::OK);
        let id = body["data"]["id"].as_str().unwrap().to_string();
        let first = body["data"]["current_question"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["progress"]["answered"], 0);
        assert_eq!(body["data"]["participant"]["name"], "Mina");

        let (status, body) = send(
            &state,
            json(
                "POST",
                &format!("/api/v1/quiz/runs/{id}/answers"),
                j!({"question_id": first, "answer": "yes", "duration_ms": 1200.0}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["progress"]["answered"], 1);

        let (_, body) = send(&state, json("POST", &format!("/api/v1/quiz/runs/{id}/undo"), j!({}))).await;
        assert_eq!(body["data"]["progress"]["answered"], 0);
        assert_eq!(body["data"]["current_question"]["id"], first.as_str());
    }

    #[tokio::test]
    async fn test_answer_for_wrong_card_is_bad_request() {
        let state = test_state().await;
        let (_, body) = send(&state, json("POST", "/api/v1/quiz/runs", j!({}))).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &state,
            json(
                "POST",
                &format!("/api/v1/quiz/runs/{id}/answers"),
                j!({"question_id": "no-such-card", "answer": "no"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_unknown_run_is_not_found() {
        let state = test_state().await;
        let uri = format!("/api/v1/quiz/runs/{}", Uuid::new_v4());
        let (status, _) = send(&state, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_run() {
        let state = test_state().await;
        let (_, body) = send(&state, json("POST", "/api/v1/quiz/runs", j!({}))).await;
        let uri = format!("/api/v1/quiz/runs/{}", body["data"]["id"].as_str().unwrap());

        let delete = || Request::builder().method("DELETE").uri(&uri).body(Body::empty()).unwrap();
        let (status, _) = send(&state, delete()).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&state, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&state, delete()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_run_uses_session_user() {
        let state = test_state().await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/quiz/runs")
            .header("cookie", r#"relation_session={"id":"k-9","nickname":"Jun"}"#)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["participant"]["name"], "Jun");
        assert_eq!(body["data"]["participant"]["external_id"], "k-9");
    }

    #[tokio::test]
    async fn test_analytics_requires_type_and_session() {
        let state = test_state().await;
        let (status, _) = send(
            &state,
            json("POST", "/api/v1/quiz/analytics", j!({"type": "swipe"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analytics_record_and_list() {
        let state = test_state().await;
        let (status, body) = send(
            &state,
            json(
                "POST",
                "/api/v1/quiz/analytics",
                j!({
                    "type": "swipe",
                    "sessionId": "s-1",
                    "questionId": "q1",
                    "answer": true,
                    "responseMs": 812.4,
                    "swipeDirection": "right",
                    "dropPosition": {"x": 120.5, "y": -4.0}
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["response_ms"], 812);
        assert_eq!(body["data"]["answer"], "true");

        let (status, body) = send(&state, get("/api/v1/quiz/analytics?sessionId=s-1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (_, body) = send(&state, get("/api/v1/quiz/analytics?sessionId=other")).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }
}
