// HTTP routes: Prometheus scrape and liveness

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::collector::Collector;

/// Health turns unhealthy after this many poll intervals without an update.
pub const HEALTH_STALENESS_FACTOR: u32 = 3;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) collector: Arc<Collector>,
    pub(crate) health_max_age: Duration,
}

pub fn app(collector: Arc<Collector>, poll_interval: Duration) -> Router {
    let state = AppState {
        collector,
        health_max_age: poll_interval * HEALTH_STALENESS_FACTOR,
    };
    Router::new()
        .route("/metrics", get(http::metrics_handler)) // GET /metrics
        .route("/health", get(http::health_handler)) // GET /health
        .fallback(http::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
