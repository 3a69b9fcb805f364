//! # Lookup Service
//!
//! The public query surface over the coverage index. A lookup never
//! touches the network or any geocoder: the point is already a
//! coordinate pair, and the answer comes entirely from indexed geometry.
//!
//! Public lookups return production libraries only. The admin preview
//! includes testing entries so operators can confirm coverage before
//! promotion. Cancelled libraries are removed from the index at
//! cancellation time and can never match.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use opdsreg_core::Stage;

use crate::index::{CoverageHit, CoverageIndex};

/// The answer to one point or radius lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    /// Matching libraries in ranked order.
    pub hits: Vec<CoverageHit>,
}

impl LookupResult {
    /// Whether any library covers the queried location.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// The best-ranked hit, if any.
    pub fn best(&self) -> Option<&CoverageHit> {
        self.hits.first()
    }
}

/// Stateless facade over a shared [`CoverageIndex`].
#[derive(Debug, Clone)]
pub struct LookupService {
    index: Arc<CoverageIndex>,
}

impl LookupService {
    /// Create a service over a shared index.
    pub fn new(index: Arc<CoverageIndex>) -> Self {
        Self { index }
    }

    /// Production libraries covering the point, ranked.
    pub fn find(&self, lat: f64, lon: f64) -> LookupResult {
        let hits = self
            .index
            .query_point(lat, lon)
            .into_iter()
            .filter(|h| h.stage == Stage::Production)
            .collect();
        LookupResult { hits }
    }

    /// Like [`find`](Self::find), but includes testing libraries.
    pub fn preview_find(&self, lat: f64, lon: f64) -> LookupResult {
        let hits = self
            .index
            .query_point(lat, lon)
            .into_iter()
            .filter(|h| h.stage != Stage::Cancelled)
            .collect();
        LookupResult { hits }
    }

    /// Production libraries whose coverage intersects the circle, ordered
    /// by centroid distance.
    pub fn nearby(&self, lat: f64, lon: f64, radius_km: f64) -> LookupResult {
        let hits = self
            .index
            .query_radius(lat, lon, radius_km)
            .into_iter()
            .filter(|h| h.stage == Stage::Production)
            .collect();
        LookupResult { hits }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opdsreg_core::{LibraryId, Timestamp};
    use opdsreg_geo::{GeocodeSource, Geometry, Precision, ServiceArea, ServiceAreaSet};

    fn circle_set(name: &str, lat: f64, lon: f64, radius_km: f64, precision: Precision) -> ServiceAreaSet {
        ServiceAreaSet(vec![ServiceArea {
            name: name.to_string(),
            geometry: Geometry::Circle {
                center: [lon, lat],
                radius_km,
            },
            precision,
            source: GeocodeSource::PostalDatabase,
        }])
    }

    fn global_set() -> ServiceAreaSet {
        ServiceAreaSet(vec![ServiceArea {
            name: "everywhere".to_string(),
            geometry: Geometry::Global,
            precision: Precision::Global,
            source: GeocodeSource::Sentinel,
        }])
    }

    fn ts() -> Timestamp {
        Timestamp::parse("2026-01-01T00:00:00Z").unwrap()
    }

    #[test]
    fn test_find_filters_to_production() {
        let index = Arc::new(CoverageIndex::new());
        let production = LibraryId::new();
        let testing = LibraryId::new();
        index.upsert(
            production,
            circle_set("10001", 40.75, -73.99, 5.0, Precision::Postal),
            Stage::Production,
            ts(),
        );
        index.upsert(
            testing,
            circle_set("10001", 40.75, -73.99, 5.0, Precision::Postal),
            Stage::Testing,
            ts(),
        );

        let service = LookupService::new(index);
        let public = service.find(40.75, -73.99);
        assert_eq!(public.hits.len(), 1);
        assert_eq!(public.best().unwrap().library_id, production);

        let preview = service.preview_find(40.75, -73.99);
        assert_eq!(preview.hits.len(), 2);
    }

    #[test]
    fn test_find_empty_when_nothing_covers() {
        let index = Arc::new(CoverageIndex::new());
        index.upsert(
            LibraryId::new(),
            circle_set("10001", 40.75, -73.99, 5.0, Precision::Postal),
            Stage::Production,
            ts(),
        );
        let service = LookupService::new(index);
        let result = service.find(48.85, 2.35);
        assert!(result.is_empty());
        assert!(result.best().is_none());
    }

    #[test]
    fn test_global_library_ranks_after_local() {
        let index = Arc::new(CoverageIndex::new());
        let local = LibraryId::new();
        let global = LibraryId::new();
        index.upsert(global, global_set(), Stage::Production, ts());
        index.upsert(
            local,
            circle_set("10001", 40.75, -73.99, 5.0, Precision::Postal),
            Stage::Production,
            ts(),
        );
        let service = LookupService::new(index);

        // Inside the local area both match, local first.
        let result = service.find(40.75, -73.99);
        assert_eq!(result.hits.len(), 2);
        assert_eq!(result.best().unwrap().library_id, local);

        // Anywhere else only the global library answers.
        let result = service.find(48.85, 2.35);
        assert_eq!(result.hits.len(), 1);
        assert_eq!(result.best().unwrap().library_id, global);
        assert_eq!(result.best().unwrap().precision, Precision::Global);
    }

    #[test]
    fn test_nearby_filters_and_orders() {
        let index = Arc::new(CoverageIndex::new());
        let near = LibraryId::new();
        let far = LibraryId::new();
        let testing = LibraryId::new();
        index.upsert(
            near,
            circle_set("near", 40.75, -73.99, 5.0, Precision::Exact),
            Stage::Production,
            ts(),
        );
        index.upsert(
            far,
            circle_set("far", 42.65, -73.76, 5.0, Precision::Exact),
            Stage::Production,
            ts(),
        );
        index.upsert(
            testing,
            circle_set("testing", 40.75, -73.99, 5.0, Precision::Exact),
            Stage::Testing,
            ts(),
        );

        let service = LookupService::new(index);
        let result = service.nearby(40.75, -73.99, 250.0);
        let ids: Vec<LibraryId> = result.hits.iter().map(|h| h.library_id).collect();
        assert_eq!(ids, vec![near, far]);
    }
}
