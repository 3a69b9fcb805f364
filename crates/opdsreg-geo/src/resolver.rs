//! # GeoResolver — The Ordered Fallback Chain
//!
//! Converts location hints into geocode candidates. Per hint, sources are
//! tried in a fixed order and the first success wins:
//!
//! ```text
//! 1. postal table    → precision = postal
//! 2. place table     → precision = regional | country
//! 3. external call   → precision = exact (structured match only)
//! ```
//!
//! The chain is data (`FALLBACK_CHAIN`), not nested branching, so tests can
//! assert its order and fakes can stand in for any step.
//!
//! A literal `"everywhere"` hint short-circuits the whole call: the library
//! serves the entire planet and no other hint matters. Candidates from
//! multiple hints are unioned — a library serving "New York" and "Boston"
//! covers both, not their overlap.
//!
//! If every hint exhausts the chain the call fails with
//! `UnresolvableLocation`; the caller must not build a service area from an
//! empty resolution.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use opdsreg_core::RegistryError;

use crate::database::GeoDatabase;
use crate::external::ExternalGeocoder;
use crate::geometry::Geometry;
use crate::precision::Precision;

/// The hint that grants whole-planet coverage, compared case-insensitively.
pub const EVERYWHERE_SENTINEL: &str = "everywhere";

/// Radius assigned to point-only external matches, in kilometers.
const EXTERNAL_POINT_RADIUS_KM: f64 = 25.0;

/// Confidence assigned per source.
const POSTAL_CONFIDENCE: f64 = 0.95;
const OFFLINE_CONFIDENCE: f64 = 0.70;
const EXTERNAL_CONFIDENCE: f64 = 0.85;
const SENTINEL_CONFIDENCE: f64 = 1.0;

/// Which source produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeocodeSource {
    /// The local postal-code table.
    PostalDatabase,
    /// The local place-name table.
    OfflineDatabase,
    /// The external geocoding service.
    External,
    /// The `"everywhere"` sentinel.
    Sentinel,
}

/// A transient geocoding result; consumed to build a [`ServiceArea`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    /// The resolved geometry.
    pub geometry: Geometry,
    /// The coarseness tier of the match.
    pub precision: Precision,
    /// The source that produced the match.
    pub source: GeocodeSource,
    /// Source confidence in `[0, 1]`.
    pub confidence: f64,
}

/// A hint paired with the candidate that resolved it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArea {
    /// The original hint text.
    pub name: String,
    /// The winning candidate for this hint.
    pub candidate: GeocodeCandidate,
}

/// A named geographic area a library serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceArea {
    /// Area name, taken from the hint that produced it.
    pub name: String,
    /// The resolved geometry.
    pub geometry: Geometry,
    /// Coarseness tier.
    pub precision: Precision,
    /// Geocoder provenance.
    pub source: GeocodeSource,
}

/// The full service-area set of one library, replaced wholesale on
/// re-registration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceAreaSet(pub Vec<ServiceArea>);

impl ServiceAreaSet {
    /// Union the resolved hints into a service-area set.
    pub fn from_resolved(resolved: Vec<ResolvedArea>) -> Self {
        Self(
            resolved
                .into_iter()
                .map(|r| ServiceArea {
                    name: r.name,
                    geometry: r.candidate.geometry,
                    precision: r.candidate.precision,
                    source: r.candidate.source,
                })
                .collect(),
        )
    }

    /// The areas in declared order.
    pub fn areas(&self) -> &[ServiceArea] {
        &self.0
    }

    /// Whether the set contains no areas.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A step in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStep {
    /// Exact postal-code lookup.
    Postal,
    /// Offline place-name lookup.
    Offline,
    /// External geocoding call.
    External,
}

/// The fixed fallback order, tried per hint until one step succeeds.
pub const FALLBACK_CHAIN: [ChainStep; 3] = [ChainStep::Postal, ChainStep::Offline, ChainStep::External];

/// The geocoding pipeline.
///
/// Holds the immutable offline database by `Arc` and the external geocoder
/// by value; generic over the geocoder so tests substitute fakes.
pub struct GeoResolver<E> {
    db: Arc<GeoDatabase>,
    geocoder: E,
}

impl<E: ExternalGeocoder> GeoResolver<E> {
    /// Create a resolver over a loaded database and geocoder.
    pub fn new(db: Arc<GeoDatabase>, geocoder: E) -> Self {
        Self { db, geocoder }
    }

    /// Resolve a sequence of hints into per-hint areas.
    ///
    /// # Errors
    ///
    /// `UnresolvableLocation` if no hint resolves. Hints that fail while
    /// others succeed are logged and skipped.
    pub async fn resolve(&self, hints: &[String]) -> Result<Vec<ResolvedArea>, RegistryError> {
        if hints
            .iter()
            .any(|h| h.trim().eq_ignore_ascii_case(EVERYWHERE_SENTINEL))
        {
            tracing::debug!("everywhere sentinel present; whole-planet coverage");
            return Ok(vec![ResolvedArea {
                name: EVERYWHERE_SENTINEL.to_string(),
                candidate: GeocodeCandidate {
                    geometry: Geometry::Global,
                    precision: Precision::Global,
                    source: GeocodeSource::Sentinel,
                    confidence: SENTINEL_CONFIDENCE,
                },
            }]);
        }

        let mut resolved = Vec::new();
        for hint in hints {
            match self.resolve_hint(hint).await {
                Some(candidate) => resolved.push(ResolvedArea {
                    name: hint.clone(),
                    candidate,
                }),
                None => {
                    tracing::warn!(hint, "hint exhausted the geocoding chain");
                }
            }
        }

        if resolved.is_empty() {
            return Err(RegistryError::UnresolvableLocation(format!(
                "no hint could be resolved: {hints:?}"
            )));
        }
        Ok(resolved)
    }

    /// Run the fallback chain for a single hint; first success wins.
    async fn resolve_hint(&self, hint: &str) -> Option<GeocodeCandidate> {
        for step in FALLBACK_CHAIN {
            let candidate = match step {
                ChainStep::Postal => self.lookup_postal(hint),
                ChainStep::Offline => self.lookup_offline(hint),
                ChainStep::External => self.lookup_external(hint).await,
            };
            if let Some(candidate) = candidate {
                tracing::debug!(hint, step = ?step, precision = %candidate.precision,
                    "hint resolved");
                return Some(candidate);
            }
        }
        None
    }

    fn lookup_postal(&self, hint: &str) -> Option<GeocodeCandidate> {
        let entry = self.db.lookup_postal(hint)?;
        Some(GeocodeCandidate {
            geometry: entry.geometry.clone(),
            precision: Precision::Postal,
            source: GeocodeSource::PostalDatabase,
            confidence: POSTAL_CONFIDENCE,
        })
    }

    fn lookup_offline(&self, hint: &str) -> Option<GeocodeCandidate> {
        let entry = self.db.lookup_place(hint)?;
        Some(GeocodeCandidate {
            geometry: entry.geometry.clone(),
            precision: entry.precision,
            source: GeocodeSource::OfflineDatabase,
            confidence: OFFLINE_CONFIDENCE,
        })
    }

    async fn lookup_external(&self, hint: &str) -> Option<GeocodeCandidate> {
        // Transport failure and not-found fall through identically; the
        // geocoder implementation distinguishes them in its own logs.
        let hit = match self.geocoder.geocode(hint).await {
            Ok(Some(hit)) => hit,
            Ok(None) => return None,
            Err(_) => return None,
        };
        if !hit.exact {
            return None;
        }
        Some(GeocodeCandidate {
            geometry: Geometry::Circle {
                center: [hit.longitude, hit.latitude],
                radius_km: EXTERNAL_POINT_RADIUS_KM,
            },
            precision: Precision::Exact,
            source: GeocodeSource::External,
            confidence: EXTERNAL_CONFIDENCE,
        })
    }
}
