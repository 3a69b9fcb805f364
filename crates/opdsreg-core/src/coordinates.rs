//! # Coordinates — A Point on the Earth
//!
//! Validated latitude/longitude pair with parsing for the input forms the
//! registry accepts at its boundary:
//!
//! - `"40.75, -73.99"` — comma- or space-separated latitude, longitude
//! - `"POINT(-73.99 40.75)"` — Well-Known Text point (longitude first)
//! - `"SRID=4326;POINT(-73.99 40.75)"` — Extended WKT with an SRID prefix
//!
//! Only SRID 4326 (WGS-84) is meaningful here; a parsed SRID is accepted
//! and discarded. Two coordinates are equal when latitude and longitude
//! match to six decimal places.

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// A validated point on the earth.
///
/// Latitude is degrees north in `[-90, 90]`; longitude is degrees east in
/// `[-180, 180]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinates {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
}

impl Coordinates {
    /// Create coordinates, validating the latitude/longitude ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, RegistryError> {
        if !latitude.is_finite() || latitude.abs() > 90.0 {
            return Err(RegistryError::Parse(format!(
                "latitude out of range: {latitude}"
            )));
        }
        if !longitude.is_finite() || longitude.abs() > 180.0 {
            return Err(RegistryError::Parse(format!(
                "longitude out of range: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse coordinates from any of the accepted string forms.
    pub fn parse(input: &str) -> Result<Self, RegistryError> {
        let trimmed = input.trim();
        let upper = trimmed.to_ascii_uppercase();
        let result = if upper.starts_with("SRID=") || upper.starts_with("POINT") {
            parse_wkt_point(trimmed)
        } else {
            parse_lat_lon_pair(trimmed)
        };
        result.ok_or_else(|| {
            RegistryError::Parse(format!("could not parse coordinates from input: {input:?}"))
        })
        .and_then(|(lat, lon)| Self::new(lat, lon))
    }

    /// Render as a WKT point string: `POINT(lon lat)`.
    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.longitude, self.latitude)
    }
}

impl PartialEq for Coordinates {
    /// Equal when latitude and longitude match to six decimal places.
    fn eq(&self, other: &Self) -> bool {
        let r = |v: f64| (v * 1e6).round();
        r(self.latitude) == r(other.latitude) && r(self.longitude) == r(other.longitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Parse `"lat, lon"` or `"lat lon"` into an (unvalidated) pair.
fn parse_lat_lon_pair(s: &str) -> Option<(f64, f64)> {
    let mut parts = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    let lat: f64 = parts.next()?.parse().ok()?;
    let lon: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((lat, lon))
}

/// Parse a WKT or EWKT point. WKT puts longitude first: `POINT(lon lat)`.
fn parse_wkt_point(s: &str) -> Option<(f64, f64)> {
    let upper = s.to_ascii_uppercase();
    let body = if let Some(rest) = upper.strip_prefix("SRID=") {
        // The SRID must be an integer; the value itself is discarded.
        let (srid, point) = rest.split_once(';')?;
        srid.parse::<u32>().ok()?;
        point.to_string()
    } else {
        upper
    };
    let inner = body.strip_prefix("POINT(")?.strip_suffix(')')?;
    let mut parts = inner.split_whitespace();
    let lon: f64 = parts.next()?.parse().ok()?;
    let lat: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((lat, lon))
}
