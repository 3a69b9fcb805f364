//! # Coverage Geometry
//!
//! The geometry a resolved service area is stored as. Three shapes cover
//! everything the registry needs: a polygon ring for postal-code and
//! administrative boundaries, a point-plus-radius circle for external
//! geocoder hits, and the whole-planet `Global` shape for `"everywhere"`
//! coverage.
//!
//! All math uses a spherical-earth approximation. Coordinates are degrees;
//! polygon rings are `[lon, lat]` vertex pairs in GeoJSON order, implicitly
//! closed. Service areas are regional-scale, so planar ray casting and
//! equirectangular edge distances are accurate enough for membership and
//! ranking decisions.

use serde::{Deserialize, Serialize};

/// Mean earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude (and of longitude at the equator).
const KM_PER_DEGREE: f64 = 111.32;

/// A coverage geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    /// A polygon boundary. `ring` holds `[lon, lat]` vertices in GeoJSON
    /// order; the ring is implicitly closed.
    Polygon {
        /// Vertices as `[lon, lat]` pairs.
        ring: Vec<[f64; 2]>,
    },
    /// A circle around a center point.
    Circle {
        /// Center as `[lon, lat]`.
        center: [f64; 2],
        /// Radius in kilometers.
        radius_km: f64,
    },
    /// The whole planet.
    Global,
}

impl Geometry {
    /// Whether the geometry contains the given point.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        match self {
            Self::Polygon { ring } => point_in_ring(ring, lat, lon),
            Self::Circle { center, radius_km } => {
                haversine_km(lat, lon, center[1], center[0]) <= *radius_km
            }
            Self::Global => true,
        }
    }

    /// Whether the geometry intersects a query circle.
    pub fn intersects_circle(&self, lat: f64, lon: f64, radius_km: f64) -> bool {
        match self {
            Self::Polygon { ring } => {
                if point_in_ring(ring, lat, lon) {
                    return true;
                }
                ring_edges(ring)
                    .any(|(a, b)| segment_distance_km(lat, lon, a, b) <= radius_km)
            }
            Self::Circle {
                center,
                radius_km: own_radius,
            } => haversine_km(lat, lon, center[1], center[0]) <= radius_km + own_radius,
            Self::Global => true,
        }
    }

    /// The centroid of the geometry, as `(lat, lon)`.
    ///
    /// `None` for `Global`, which has no meaningful center.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        match self {
            Self::Polygon { ring } => {
                if ring.is_empty() {
                    return None;
                }
                let n = ring.len() as f64;
                let lat = ring.iter().map(|v| v[1]).sum::<f64>() / n;
                let lon = ring.iter().map(|v| v[0]).sum::<f64>() / n;
                Some((lat, lon))
            }
            Self::Circle { center, .. } => Some((center[1], center[0])),
            Self::Global => None,
        }
    }

    /// Approximate area in square kilometers.
    ///
    /// Used only for smallest-area-first ranking, so a flat-projection
    /// shoelace with cos-latitude longitude scaling is sufficient.
    /// `Global` is infinite.
    pub fn area_km2(&self) -> f64 {
        match self {
            Self::Polygon { ring } => {
                if ring.len() < 3 {
                    return 0.0;
                }
                let mean_lat =
                    ring.iter().map(|v| v[1]).sum::<f64>() / ring.len() as f64;
                let lon_scale = mean_lat.to_radians().cos();
                let mut doubled = 0.0;
                for (a, b) in ring_edges(ring) {
                    doubled += a[0] * b[1] - b[0] * a[1];
                }
                (doubled.abs() / 2.0) * KM_PER_DEGREE * KM_PER_DEGREE * lon_scale
            }
            Self::Circle { radius_km, .. } => std::f64::consts::PI * radius_km * radius_km,
            Self::Global => f64::INFINITY,
        }
    }

    /// Haversine distance from the centroid to a point, in kilometers.
    ///
    /// `None` for `Global`.
    pub fn centroid_distance_km(&self, lat: f64, lon: f64) -> Option<f64> {
        self.centroid()
            .map(|(clat, clon)| haversine_km(lat, lon, clat, clon))
    }
}

/// Great-circle distance between two points in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Iterate the closed edge list of a ring, including the wrap-around edge.
fn ring_edges(ring: &[[f64; 2]]) -> impl Iterator<Item = ([f64; 2], [f64; 2])> + '_ {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .take(ring.len())
        .map(|(a, b)| (*a, *b))
}

/// Ray-cast point-in-polygon test on the lon/lat plane.
fn point_in_ring(ring: &[[f64; 2]], lat: f64, lon: f64) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    for (a, b) in ring_edges(ring) {
        let (ax, ay) = (a[0], a[1]);
        let (bx, by) = (b[0], b[1]);
        let crosses = (ay > lat) != (by > lat);
        if crosses {
            let x_at_lat = ax + (lat - ay) / (by - ay) * (bx - ax);
            if lon < x_at_lat {
                inside = !inside;
            }
        }
    }
    inside
}

/// Approximate distance from a point to a polygon edge, in kilometers.
///
/// Projects onto an equirectangular plane centered at the query latitude.
fn segment_distance_km(lat: f64, lon: f64, a: [f64; 2], b: [f64; 2]) -> f64 {
    let scale = lat.to_radians().cos();
    let px = lon * scale;
    let py = lat;
    let (ax, ay) = (a[0] * scale, a[1]);
    let (bx, by) = (b[0] * scale, b[1]);
    let (dx, dy) = (bx - ax, by - ay);
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
    };
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    let (ex, ey) = (px - cx, py - cy);
    (ex * ex + ey * ey).sqrt() * KM_PER_DEGREE
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rectangle roughly covering ZIP 10001 in Manhattan.
    fn zip_10001() -> Geometry {
        Geometry::Polygon {
            ring: vec![
                [-74.008, 40.743],
                [-73.984, 40.743],
                [-73.984, 40.757],
                [-74.008, 40.757],
            ],
        }
    }

    #[test]
    fn test_polygon_contains_interior_point() {
        assert!(zip_10001().contains(40.75, -73.99));
    }

    #[test]
    fn test_polygon_excludes_exterior_point() {
        assert!(!zip_10001().contains(42.36, -71.06)); // Boston
    }

    #[test]
    fn test_circle_contains() {
        let g = Geometry::Circle {
            center: [-73.99, 40.75],
            radius_km: 10.0,
        };
        assert!(g.contains(40.75, -73.99));
        assert!(g.contains(40.78, -73.97));
        assert!(!g.contains(42.36, -71.06));
    }

    #[test]
    fn test_global_contains_everything() {
        assert!(Geometry::Global.contains(90.0, 0.0));
        assert!(Geometry::Global.contains(-45.0, 170.0));
    }

    #[test]
    fn test_haversine_known_distance() {
        // New York to Boston is roughly 306 km.
        let d = haversine_km(40.7128, -74.0060, 42.3601, -71.0589);
        assert!((d - 306.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn test_centroid_of_rectangle() {
        let (lat, lon) = zip_10001().centroid().unwrap();
        assert!((lat - 40.75).abs() < 0.01);
        assert!((lon + 73.996).abs() < 0.01);
    }

    #[test]
    fn test_global_has_no_centroid() {
        assert!(Geometry::Global.centroid().is_none());
        assert!(Geometry::Global.centroid_distance_km(0.0, 0.0).is_none());
    }

    #[test]
    fn test_area_ranking_smaller_polygon_smaller_area() {
        let small = zip_10001();
        let big = Geometry::Polygon {
            ring: vec![
                [-75.0, 40.0],
                [-73.0, 40.0],
                [-73.0, 41.5],
                [-75.0, 41.5],
            ],
        };
        assert!(small.area_km2() < big.area_km2());
        assert!(big.area_km2() < Geometry::Global.area_km2());
    }

    #[test]
    fn test_degenerate_polygon_has_zero_area() {
        let g = Geometry::Polygon {
            ring: vec![[-74.0, 40.7], [-73.9, 40.8]],
        };
        assert_eq!(g.area_km2(), 0.0);
        assert!(!g.contains(40.75, -73.95));
    }

    #[test]
    fn test_intersects_circle_polygon_nearby() {
        let g = zip_10001();
        // Point ~15 km east of the rectangle; a 20 km circle reaches it.
        assert!(g.intersects_circle(40.75, -73.82, 20.0));
        assert!(!g.intersects_circle(40.75, -73.82, 5.0));
        // A point inside always intersects.
        assert!(g.intersects_circle(40.75, -73.99, 0.1));
    }

    #[test]
    fn test_intersects_circle_circles() {
        let g = Geometry::Circle {
            center: [-73.99, 40.75],
            radius_km: 5.0,
        };
        assert!(g.intersects_circle(40.75, -73.90, 5.0));
        assert!(!g.intersects_circle(42.36, -71.06, 5.0));
    }

    #[test]
    fn test_serde_shape() {
        let g = zip_10001();
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["type"], "polygon");
        let parsed: Geometry = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, g);
    }
}
