// GET handlers: metrics, health, fallback

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::AppState;

const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
}

/// GET /metrics — counts the scrape, then renders the aggregate.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.collector.increment_scrapes();
    let body = state.collector.render();
    ([(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)], body)
}

/// GET /health — 200 while the poller keeps updating, 503 once updates go stale.
pub(super) async fn health_handler(State(state): State<AppState>) -> Response {
    if state.collector.is_fresh(state.health_max_age) {
        (
            StatusCode::OK,
            Json(HealthBody {
                status: "healthy",
                reason: None,
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthBody {
                status: "unhealthy",
                reason: Some("no recent updates"),
            }),
        )
            .into_response()
    }
}

pub(super) async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
