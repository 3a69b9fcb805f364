//! # Location Lookup Routes
//!
//! Point queries against the coverage index. The public route returns
//! production libraries only; the preview route is the admin view that
//! includes testing entries.
//!
//! The query point is given either as `lat`/`lon` numbers or as a single
//! `at` string — a `"lat, lon"` pair or a WKT `POINT(lon lat)`.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use opdsreg_core::Coordinates;
use opdsreg_coverage::{CoverageHit, LookupResult};

use crate::{AppError, AppState};

/// Query parameters for a point lookup.
#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    /// Degrees north, in `[-90, 90]`.
    pub lat: Option<f64>,
    /// Degrees east, in `[-180, 180]`.
    pub lon: Option<f64>,
    /// Alternative single-string form: `"lat, lon"` or `POINT(lon lat)`.
    pub at: Option<String>,
}

impl LookupParams {
    fn point(&self) -> Result<Coordinates, AppError> {
        match (self.lat, self.lon, &self.at) {
            (Some(lat), Some(lon), None) => Coordinates::new(lat, lon)
                .map_err(|e| AppError::Validation(e.to_string())),
            (None, None, Some(at)) => {
                Coordinates::parse(at).map_err(|e| AppError::Validation(e.to_string()))
            }
            _ => Err(AppError::Validation(
                "provide either lat and lon, or a single at parameter".into(),
            )),
        }
    }
}

/// One matched library on the wire.
#[derive(Debug, Serialize)]
pub struct HitResponse {
    id: String,
    precision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance_km: Option<f64>,
}

impl HitResponse {
    fn from_hit(hit: CoverageHit) -> Self {
        Self {
            id: hit.library_id.as_uuid().to_string(),
            precision: hit.precision.to_string(),
            distance_km: hit.distance_km,
        }
    }
}

/// The ranked answer to a lookup.
#[derive(Debug, Serialize)]
pub struct LookupResponse {
    libraries: Vec<HitResponse>,
}

impl LookupResponse {
    fn from_result(result: LookupResult) -> Self {
        Self {
            libraries: result.hits.into_iter().map(HitResponse::from_hit).collect(),
        }
    }
}

async fn find(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<LookupResponse>, AppError> {
    let point = params.point()?;
    let result = state.lookup.find(point.latitude, point.longitude);
    Ok(Json(LookupResponse::from_result(result)))
}

async fn preview(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<LookupResponse>, AppError> {
    let point = params.point()?;
    let result = state.lookup.preview_find(point.latitude, point.longitude);
    Ok(Json(LookupResponse::from_result(result)))
}

/// The lookup router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/lookup", get(find))
        .route("/v1/lookup/preview", get(preview))
}
