//! # opdsreg-coverage — Spatial Index and Lookup
//!
//! The queryable side of the registry:
//!
//! - **CoverageIndex** (`index.rs`): a concurrent map of library id to
//!   service-area set, stage, and validation recency, answering point and
//!   radius queries with a deterministic ranking.
//! - **LookupService** (`lookup.rs`): the public query surface — point
//!   lookups filtered to production libraries, plus an admin preview that
//!   includes testing entries.
//!
//! The index never owns library records; it holds the id plus the two
//! fields ranking needs (stage, `last_validated_at`), refreshed on every
//! upsert. Mutations for different library ids proceed in parallel
//! (per-shard locking); mutations for the same id serialize on its entry.

pub mod index;
pub mod lookup;

pub use index::{CoverageEntry, CoverageHit, CoverageIndex};
pub use lookup::{LookupResult, LookupService};
