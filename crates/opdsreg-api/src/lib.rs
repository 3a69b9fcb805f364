//! # opdsreg-api — Axum API Service
//!
//! The HTTP surface of the OPDS library registry, built on Axum/Tower/Tokio.
//!
//! ## Routes
//!
//! - `POST /v1/libraries/{id}/submit` — run a registration attempt
//! - `POST /v1/libraries/{id}/promote` — activate a verified library
//! - `POST /v1/libraries/{id}/demote` — roll production back to testing
//! - `POST /v1/libraries/{id}/cancel` — terminal removal
//! - `GET  /v1/libraries/{id}` — registration state and record summary
//! - `GET  /v1/lookup?lat&lon` — production libraries covering a point
//! - `GET  /v1/lookup/preview?lat&lon` — admin view including testing
//! - `GET  /health/live` — liveness probe (unauthenticated)
//!
//! ## Crate Policy
//!
//! - Sits at the top of the dependency DAG — depends on all other crates.
//! - No business logic in route handlers — delegates to the registrar and
//!   the lookup service.
//! - All errors map to structured HTTP responses via `AppError`, carrying
//!   the taxonomy's kind token and reason string only.

pub mod error;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::AppState;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Assemble the application router over shared state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::libraries::router())
        .merge(routes::lookup::router())
        .merge(routes::health::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
