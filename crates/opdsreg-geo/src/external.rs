//! # External Geocoder Seam
//!
//! The last step of the fallback chain is a network call to an external
//! geocoding service. The service contract is minimal: a free-text query
//! either produces a structured `(lat, lon)` match or nothing.
//!
//! Fallback treats "not found" and transport failure identically — the hint
//! is unresolved either way — but the two are distinguished here in logs:
//! a miss is routine, a transport failure is operational noise worth
//! alerting on.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use opdsreg_core::RegistryError;

/// A structured match from the external geocoder.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ExternalHit {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
    /// Whether the service considers this a structured (exact) match.
    /// Non-exact hits are treated as unresolved by the resolver.
    #[serde(default)]
    pub exact: bool,
}

/// A network-bound geocoding service.
///
/// `Ok(None)` means the service answered and found nothing; `Err` is a
/// transport-level failure (timeout, non-2xx, connection error).
pub trait ExternalGeocoder: Send + Sync {
    /// Geocode a free-text query.
    fn geocode(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Option<ExternalHit>, RegistryError>> + Send;
}

/// HTTP implementation of [`ExternalGeocoder`].
///
/// Issues `GET {endpoint}?q={query}` with an explicit timeout and expects a
/// JSON body deserializing to [`ExternalHit`]. A 404 is a miss; any other
/// non-2xx status or transport error is a `Fetch` error.
#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpGeocoder {
    /// Create a geocoder client against `endpoint` with a request timeout.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Fetch(format!("geocoder client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl ExternalGeocoder for HttpGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<ExternalHit>, RegistryError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(query, error = %e, "external geocoder transport failure");
                RegistryError::Fetch(format!("geocoder request failed: {e}"))
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(query, "external geocoder miss");
            return Ok(None);
        }
        if !response.status().is_success() {
            tracing::warn!(query, status = %response.status(), "external geocoder error status");
            return Err(RegistryError::Fetch(format!(
                "geocoder returned status {}",
                response.status()
            )));
        }

        let hit = response.json::<ExternalHit>().await.map_err(|e| {
            tracing::warn!(query, error = %e, "external geocoder returned malformed body");
            RegistryError::Fetch(format!("geocoder response body: {e}"))
        })?;
        tracing::debug!(query, lat = hit.latitude, lon = hit.longitude, exact = hit.exact,
            "external geocoder hit");
        Ok(Some(hit))
    }
}
