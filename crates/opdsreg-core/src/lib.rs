//! # opdsreg-core — Foundational Types for the OPDS Library Registry
//!
//! Defines the type-system primitives shared by every other crate in the
//! workspace: library identifiers, UTC-only timestamps, the library stage
//! enum, coordinate parsing, canonical serialization for signed payloads,
//! content digests, and the registry error taxonomy.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `LibraryId` and
//!    `Coordinates` are validated newtypes — no bare uuids or `(f64, f64)`
//!    tuples cross crate boundaries.
//!
//! 2. **`CanonicalBytes` newtype.** All signature verification and digest
//!    computation flows through `CanonicalBytes::new()`, which serializes
//!    with sorted object keys. No ad-hoc `serde_json::to_vec()` for signed
//!    payloads.
//!
//! 3. **UTC-only timestamps.** `Timestamp` enforces UTC with Z suffix at
//!    seconds precision, so `last_validated_at` comparisons and serialized
//!    records are deterministic.
//!
//! 4. **One error taxonomy.** `RegistryError` carries every failure kind a
//!    registration attempt can surface; each kind has a stable token for
//!    the API boundary.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `opdsreg-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod coordinates;
pub mod digest;
pub mod error;
pub mod identity;
pub mod stage;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use coordinates::Coordinates;
pub use digest::{sha256_digest, ContentDigest};
pub use error::RegistryError;
pub use identity::LibraryId;
pub use stage::Stage;
pub use temporal::Timestamp;
