//! # opdsreg-geo — Geocoding Pipeline
//!
//! Turns the free-text location hints extracted from an authentication
//! document into queryable coverage geometry:
//!
//! - **Geometry** (`geometry.rs`): polygon, point+radius, and global
//!   geometries with containment, intersection, centroid, and area.
//! - **Precision** (`precision.rs`): coarseness tiers (`exact` > `postal` >
//!   `regional` > `country` > `global`) and the three-level query grouping
//!   the coverage index partitions by.
//! - **GeoDatabase** (`database.rs`): the immutable offline postal-code and
//!   place-name tables, loaded once at startup and shared by reference.
//! - **ExternalGeocoder** (`external.rs`): the network-bound fallback seam
//!   and its HTTP implementation.
//! - **GeoResolver** (`resolver.rs`): the ordered fallback chain — postal,
//!   offline, external — with the `"everywhere"` sentinel short-circuit,
//!   producing `GeocodeCandidate`s unioned into a `ServiceAreaSet`.
//!
//! ## Determinism
//!
//! Given identical hints, an identical `GeoDatabase` snapshot, and identical
//! external responses, resolution output is reproducible: the chain order is
//! fixed and hints are processed in declared order.

pub mod database;
pub mod external;
pub mod geometry;
pub mod precision;
pub mod resolver;

pub use database::{GeoDatabase, GeoDatabaseBuilder};
pub use external::{ExternalGeocoder, ExternalHit, HttpGeocoder};
pub use geometry::Geometry;
pub use precision::{Precision, TierGroup};
pub use resolver::{
    GeoResolver, GeocodeCandidate, GeocodeSource, ResolvedArea, ServiceArea, ServiceAreaSet,
    EVERYWHERE_SENTINEL,
};
