use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use volley_core::StatusCounts;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Jobs waiting for a worker.
    pub queue_depth: usize,
    pub tasks: StatusCounts,
}

/// GET /health -- service status plus task counters.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let counts = state.engine.counts().await;

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        queue_depth: counts.queue_depth,
        tasks: counts.tasks,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
