//! # Library Identifiers
//!
//! Newtype wrapper for library identifiers. A `LibraryId` is the key under
//! which a library's record, service areas, and coverage-index entries are
//! stored; the newtype prevents passing an arbitrary uuid where a library
//! id is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a registered library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LibraryId(pub Uuid);

impl LibraryId {
    /// Generate a new random library identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse a library id from its string form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for LibraryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LibraryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "library:{}", self.0)
    }
}
