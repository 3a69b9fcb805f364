//! # Library Lifecycle Routes
//!
//! Submission and admin transitions. Handlers translate between HTTP and
//! the registrar; every domain decision happens below this layer.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use opdsreg_core::LibraryId;
use opdsreg_registrar::{Library, RegistrationState};

use crate::{AppError, AppState};

/// Request body for a registration attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// The URL of the library's authentication document.
    pub auth_url: String,
}

/// One resolved service area, summarized.
#[derive(Debug, Serialize)]
pub struct AreaSummary {
    name: String,
    precision: String,
}

/// A library record as exposed over HTTP.
#[derive(Debug, Serialize)]
pub struct LibrarySummary {
    id: String,
    name: String,
    auth_url: String,
    last_validated_at: Option<String>,
    areas: Vec<AreaSummary>,
}

/// The registration state of an id, with the record when one exists.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    id: String,
    state: RegistrationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    library: Option<LibrarySummary>,
}

impl LibrarySummary {
    fn from_record(record: &Library) -> Self {
        Self {
            id: record.id.as_uuid().to_string(),
            name: record.name.clone(),
            auth_url: record.auth_url.clone(),
            last_validated_at: record.last_validated_at.map(|t| t.to_iso8601()),
            areas: record
                .areas
                .areas()
                .iter()
                .map(|a| AreaSummary {
                    name: a.name.clone(),
                    precision: a.precision.to_string(),
                })
                .collect(),
        }
    }
}

fn parse_id(raw: &str) -> Result<LibraryId, AppError> {
    LibraryId::parse(raw).map_err(|_| AppError::Validation(format!("malformed library id: {raw}")))
}

fn respond(state: &AppState, id: LibraryId, record: &Library) -> Json<StateResponse> {
    Json(StateResponse {
        id: id.as_uuid().to_string(),
        state: state.registrar.state(&id),
        library: Some(LibrarySummary::from_record(record)),
    })
}

async fn submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<StateResponse>, AppError> {
    let id = parse_id(&id)?;
    let record = state.registrar.submit(id, &request.auth_url).await?;
    Ok(respond(&state, id, &record))
}

async fn promote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StateResponse>, AppError> {
    let id = parse_id(&id)?;
    let record = state.registrar.promote(&id)?;
    Ok(respond(&state, id, &record))
}

async fn demote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StateResponse>, AppError> {
    let id = parse_id(&id)?;
    let record = state.registrar.demote(&id)?;
    Ok(respond(&state, id, &record))
}

async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StateResponse>, AppError> {
    let id = parse_id(&id)?;
    let record = state.registrar.cancel(&id)?;
    Ok(respond(&state, id, &record))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StateResponse>, AppError> {
    let id = parse_id(&id)?;
    let registration = state.registrar.state(&id);
    let library = state
        .registrar
        .library(&id)
        .map(|r| LibrarySummary::from_record(&r));
    Ok(Json(StateResponse {
        id: id.as_uuid().to_string(),
        state: registration,
        library,
    }))
}

/// The library lifecycle router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/libraries/{id}", get(show))
        .route("/v1/libraries/{id}/submit", post(submit))
        .route("/v1/libraries/{id}/promote", post(promote))
        .route("/v1/libraries/{id}/demote", post(demote))
        .route("/v1/libraries/{id}/cancel", post(cancel))
}
