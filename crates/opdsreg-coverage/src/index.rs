//! # Coverage Index
//!
//! In-memory spatial index over registered libraries' service areas.
//!
//! ## Ranking
//!
//! A point query tests geometries in three tier groups — specific
//! (exact/postal), broad (regional/country), then the global catch-all.
//! Within a group, ties break by smallest area first (a more specific
//! claim outranks a broader one), then by `last_validated_at` descending
//! (the most recently re-confirmed registration wins), then by uuid
//! ascending for total determinism.
//!
//! ## Consistency
//!
//! Entries carry the stage recorded at upsert/`set_stage` time. Testing
//! libraries stay indexed for admin preview; the lookup service filters
//! them out of public results. All mutations are idempotent.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use opdsreg_core::{LibraryId, Stage, Timestamp};
use opdsreg_geo::{Precision, ServiceAreaSet, TierGroup};

/// What the index stores per library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageEntry {
    /// The library's current service-area set, replaced wholesale.
    pub areas: ServiceAreaSet,
    /// Stage snapshot, kept in sync by the registrar.
    pub stage: Stage,
    /// Validation recency, used for ranking.
    pub last_validated_at: Timestamp,
}

/// One library matched by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageHit {
    /// The matched library.
    pub library_id: LibraryId,
    /// Precision of the matching area.
    pub precision: Precision,
    /// Stage snapshot at match time.
    pub stage: Stage,
    /// Centroid distance in kilometers; `None` for global coverage.
    pub distance_km: Option<f64>,
}

/// Internal: a hit plus the sort keys that never leave the index.
struct RankedHit {
    hit: CoverageHit,
    group: TierGroup,
    area_km2: f64,
    last_validated_at: Timestamp,
}

/// Concurrent spatial index keyed by library id.
#[derive(Debug, Default)]
pub struct CoverageIndex {
    entries: DashMap<LibraryId, CoverageEntry>,
}

impl CoverageIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a library's service-area set.
    ///
    /// Re-upserting identical geometry is a no-op with respect to query
    /// results.
    pub fn upsert(
        &self,
        library_id: LibraryId,
        areas: ServiceAreaSet,
        stage: Stage,
        last_validated_at: Timestamp,
    ) {
        tracing::debug!(library = %library_id, areas = areas.areas().len(), stage = %stage,
            "coverage upserted");
        self.entries.insert(
            library_id,
            CoverageEntry {
                areas,
                stage,
                last_validated_at,
            },
        );
    }

    /// Update the stage snapshot for an indexed library.
    pub fn set_stage(&self, library_id: &LibraryId, stage: Stage) {
        if let Some(mut entry) = self.entries.get_mut(library_id) {
            entry.stage = stage;
        }
    }

    /// Remove a library from the index.
    pub fn remove(&self, library_id: &LibraryId) {
        self.entries.remove(library_id);
    }

    /// Whether the index holds an entry for the library.
    pub fn contains(&self, library_id: &LibraryId) -> bool {
        self.entries.contains_key(library_id)
    }

    /// Number of indexed libraries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All libraries whose coverage contains the point, deterministically
    /// ordered. Includes testing entries; callers filter by stage.
    pub fn query_point(&self, lat: f64, lon: f64) -> Vec<CoverageHit> {
        let mut ranked: Vec<RankedHit> = Vec::new();
        for item in self.entries.iter() {
            if let Some(hit) = best_match(*item.key(), item.value(), lat, lon) {
                ranked.push(hit);
            }
        }
        sort_ranked(&mut ranked);
        ranked.into_iter().map(|r| r.hit).collect()
    }

    /// All libraries whose coverage intersects the query circle, ordered
    /// by centroid distance ascending (global coverage last).
    pub fn query_radius(&self, lat: f64, lon: f64, radius_km: f64) -> Vec<CoverageHit> {
        let mut hits: Vec<CoverageHit> = Vec::new();
        for item in self.entries.iter() {
            let entry = item.value();
            let mut best: Option<(Option<f64>, Precision)> = None;
            for area in entry.areas.areas() {
                if !area.geometry.intersects_circle(lat, lon, radius_km) {
                    continue;
                }
                let distance = area.geometry.centroid_distance_km(lat, lon);
                let better = match (&best, &distance) {
                    (None, _) => true,
                    (Some((Some(current), _)), Some(candidate)) => candidate < current,
                    (Some((None, _)), Some(_)) => true,
                    _ => false,
                };
                if better {
                    best = Some((distance, area.precision));
                }
            }
            if let Some((distance_km, precision)) = best {
                hits.push(CoverageHit {
                    library_id: *item.key(),
                    precision,
                    stage: entry.stage,
                    distance_km,
                });
            }
        }
        hits.sort_by(|a, b| {
            match (&a.distance_km, &b.distance_km) {
                (Some(x), Some(y)) => x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then_with(|| a.library_id.cmp(&b.library_id))
        });
        hits
    }
}

/// The best-ranked matching area of one library for a point, if any.
fn best_match(
    library_id: LibraryId,
    entry: &CoverageEntry,
    lat: f64,
    lon: f64,
) -> Option<RankedHit> {
    let mut best: Option<(TierGroup, f64, Precision, Option<f64>)> = None;
    for area in entry.areas.areas() {
        if !area.geometry.contains(lat, lon) {
            continue;
        }
        let group = area.precision.group();
        let area_km2 = area.geometry.area_km2();
        let replace = match &best {
            None => true,
            Some((bg, ba, _, _)) => (group, area_km2) < (*bg, *ba),
        };
        if replace {
            best = Some((
                group,
                area_km2,
                area.precision,
                area.geometry.centroid_distance_km(lat, lon),
            ));
        }
    }
    best.map(|(group, area_km2, precision, distance_km)| RankedHit {
        hit: CoverageHit {
            library_id,
            precision,
            stage: entry.stage,
            distance_km,
        },
        group,
        area_km2,
        last_validated_at: entry.last_validated_at,
    })
}

/// Tier group, then smallest area, then recency desc, then uuid asc.
fn sort_ranked(ranked: &mut [RankedHit]) {
    ranked.sort_by(|a, b| {
        a.group
            .cmp(&b.group)
            .then_with(|| {
                a.area_km2
                    .partial_cmp(&b.area_km2)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| b.last_validated_at.cmp(&a.last_validated_at))
            .then_with(|| a.hit.library_id.cmp(&b.hit.library_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use opdsreg_geo::{GeocodeSource, Geometry, ServiceArea};
    use uuid::Uuid;

    fn area(name: &str, geometry: Geometry, precision: Precision) -> ServiceArea {
        ServiceArea {
            name: name.to_string(),
            geometry,
            precision,
            source: GeocodeSource::PostalDatabase,
        }
    }

    fn postal_set() -> ServiceAreaSet {
        ServiceAreaSet(vec![area(
            "10001",
            Geometry::Polygon {
                ring: vec![
                    [-74.008, 40.743],
                    [-73.984, 40.743],
                    [-73.984, 40.757],
                    [-74.008, 40.757],
                ],
            },
            Precision::Postal,
        )])
    }

    fn regional_set() -> ServiceAreaSet {
        ServiceAreaSet(vec![area(
            "US-NY",
            Geometry::Circle {
                center: [-75.5, 42.9],
                radius_km: 350.0,
            },
            Precision::Regional,
        )])
    }

    fn global_set() -> ServiceAreaSet {
        ServiceAreaSet(vec![area("everywhere", Geometry::Global, Precision::Global)])
    }

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    const POINT_10001: (f64, f64) = (40.75, -73.99);

    #[test]
    fn test_upsert_is_idempotent_for_queries() {
        let index = CoverageIndex::new();
        let id = LibraryId::new();
        let when = ts("2026-01-01T00:00:00Z");
        index.upsert(id, postal_set(), Stage::Production, when);
        let before = index.query_point(POINT_10001.0, POINT_10001.1);
        index.upsert(id, postal_set(), Stage::Production, when);
        let after = index.query_point(POINT_10001.0, POINT_10001.1);
        assert_eq!(before, after);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_point_query_misses_outside_geometry() {
        let index = CoverageIndex::new();
        index.upsert(
            LibraryId::new(),
            postal_set(),
            Stage::Production,
            ts("2026-01-01T00:00:00Z"),
        );
        assert!(index.query_point(42.36, -71.06).is_empty());
    }

    #[test]
    fn test_specific_tier_outranks_broad_and_global() {
        let index = CoverageIndex::new();
        let postal_lib = LibraryId::new();
        let regional_lib = LibraryId::new();
        let global_lib = LibraryId::new();
        let when = ts("2026-01-01T00:00:00Z");
        index.upsert(regional_lib, regional_set(), Stage::Production, when);
        index.upsert(global_lib, global_set(), Stage::Production, when);
        index.upsert(postal_lib, postal_set(), Stage::Production, when);

        let hits = index.query_point(POINT_10001.0, POINT_10001.1);
        let ids: Vec<LibraryId> = hits.iter().map(|h| h.library_id).collect();
        assert_eq!(ids, vec![postal_lib, regional_lib, global_lib]);
        assert_eq!(hits[0].precision, Precision::Postal);
        assert_eq!(hits[2].precision, Precision::Global);
        assert!(hits[2].distance_km.is_none());
    }

    #[test]
    fn test_same_tier_tie_breaks_by_recency_then_uuid() {
        let index = CoverageIndex::new();
        let older = LibraryId::new();
        let newer = LibraryId::new();
        index.upsert(older, postal_set(), Stage::Production, ts("2026-01-01T00:00:00Z"));
        index.upsert(newer, postal_set(), Stage::Production, ts("2026-06-01T00:00:00Z"));

        let hits = index.query_point(POINT_10001.0, POINT_10001.1);
        assert_eq!(hits[0].library_id, newer);
        assert_eq!(hits[1].library_id, older);

        // Same recency: uuid ascending decides.
        let a = LibraryId(Uuid::from_u128(1));
        let b = LibraryId(Uuid::from_u128(2));
        let index = CoverageIndex::new();
        let when = ts("2026-01-01T00:00:00Z");
        index.upsert(b, postal_set(), Stage::Production, when);
        index.upsert(a, postal_set(), Stage::Production, when);
        let hits = index.query_point(POINT_10001.0, POINT_10001.1);
        assert_eq!(hits[0].library_id, a);
        assert_eq!(hits[1].library_id, b);
    }

    #[test]
    fn test_smaller_area_outranks_within_tier() {
        let tight = ServiceAreaSet(vec![area(
            "tight",
            Geometry::Circle {
                center: [-73.99, 40.75],
                radius_km: 2.0,
            },
            Precision::Postal,
        )]);
        let loose = ServiceAreaSet(vec![area(
            "loose",
            Geometry::Circle {
                center: [-73.99, 40.75],
                radius_km: 50.0,
            },
            Precision::Postal,
        )]);
        let index = CoverageIndex::new();
        let tight_lib = LibraryId::new();
        let loose_lib = LibraryId::new();
        // Give the loose library better recency; area still wins first.
        index.upsert(tight_lib, tight, Stage::Production, ts("2026-01-01T00:00:00Z"));
        index.upsert(loose_lib, loose, Stage::Production, ts("2026-06-01T00:00:00Z"));
        let hits = index.query_point(POINT_10001.0, POINT_10001.1);
        assert_eq!(hits[0].library_id, tight_lib);
    }

    #[test]
    fn test_testing_entries_stay_indexed() {
        let index = CoverageIndex::new();
        let id = LibraryId::new();
        index.upsert(id, postal_set(), Stage::Testing, ts("2026-01-01T00:00:00Z"));
        let hits = index.query_point(POINT_10001.0, POINT_10001.1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].stage, Stage::Testing);
    }

    #[test]
    fn test_set_stage_updates_snapshot() {
        let index = CoverageIndex::new();
        let id = LibraryId::new();
        index.upsert(id, postal_set(), Stage::Testing, ts("2026-01-01T00:00:00Z"));
        index.set_stage(&id, Stage::Production);
        let hits = index.query_point(POINT_10001.0, POINT_10001.1);
        assert_eq!(hits[0].stage, Stage::Production);
    }

    #[test]
    fn test_remove_clears_entry() {
        let index = CoverageIndex::new();
        let id = LibraryId::new();
        index.upsert(id, postal_set(), Stage::Production, ts("2026-01-01T00:00:00Z"));
        index.remove(&id);
        assert!(!index.contains(&id));
        assert!(index.query_point(POINT_10001.0, POINT_10001.1).is_empty());
        // Removing again is a no-op.
        index.remove(&id);
        assert!(index.is_empty());
    }

    #[test]
    fn test_radius_query_orders_by_distance() {
        let near = ServiceAreaSet(vec![area(
            "near",
            Geometry::Circle {
                center: [-73.99, 40.75],
                radius_km: 5.0,
            },
            Precision::Exact,
        )]);
        let far = ServiceAreaSet(vec![area(
            "far",
            Geometry::Circle {
                center: [-73.76, 42.65], // Albany, ~210 km away
                radius_km: 5.0,
            },
            Precision::Exact,
        )]);
        let index = CoverageIndex::new();
        let near_lib = LibraryId::new();
        let far_lib = LibraryId::new();
        let when = ts("2026-01-01T00:00:00Z");
        index.upsert(far_lib, far, Stage::Production, when);
        index.upsert(near_lib, near, Stage::Production, when);

        let hits = index.query_radius(POINT_10001.0, POINT_10001.1, 250.0);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].library_id, near_lib);
        assert_eq!(hits[1].library_id, far_lib);

        // A tighter radius excludes the far library.
        let hits = index.query_radius(POINT_10001.0, POINT_10001.1, 50.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].library_id, near_lib);
    }

    #[test]
    fn test_radius_query_global_sorts_last() {
        let index = CoverageIndex::new();
        let near_lib = LibraryId::new();
        let global_lib = LibraryId::new();
        let when = ts("2026-01-01T00:00:00Z");
        index.upsert(global_lib, global_set(), Stage::Production, when);
        index.upsert(
            near_lib,
            ServiceAreaSet(vec![area(
                "near",
                Geometry::Circle {
                    center: [-73.99, 40.75],
                    radius_km: 5.0,
                },
                Precision::Exact,
            )]),
            Stage::Production,
            when,
        );
        let hits = index.query_radius(POINT_10001.0, POINT_10001.1, 100.0);
        assert_eq!(hits[0].library_id, near_lib);
        assert_eq!(hits[1].library_id, global_lib);
    }
}
