//! # Health Probes
//!
//! Unauthenticated liveness and readiness endpoints for orchestration.

use axum::routing::get;
use axum::{Json, Router};

use crate::AppState;

async fn live() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// The health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health/live", get(live))
        .route("/health/ready", get(live))
}
