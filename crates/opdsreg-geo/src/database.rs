//! # Offline Geo Database
//!
//! The local postal-code and place-name tables the resolver consults before
//! falling back to the network. Loaded once at process start from a JSON
//! snapshot (or built programmatically), then immutable for the process
//! lifetime and shared by `Arc` — never ambient global state.
//!
//! Place-name lookup is case-insensitive and alias-aware, so "NYC" can map
//! to the same entry as "New York City".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use opdsreg_core::RegistryError;

use crate::geometry::Geometry;
use crate::precision::Precision;

/// A postal-code table entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostalEntry {
    /// The postal code.
    pub code: String,
    /// Human-readable name of the covered area.
    pub name: String,
    /// The boundary geometry.
    pub geometry: Geometry,
}

/// A place-name table entry: a region or nation with coarse geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceEntry {
    /// Canonical place name.
    pub name: String,
    /// `Regional` for sub-national divisions, `Country` for nations.
    pub precision: Precision,
    /// The coarse boundary geometry.
    pub geometry: Geometry,
}

/// JSON snapshot format for loading a database at startup.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    postal_codes: Vec<PostalEntry>,
    #[serde(default)]
    places: Vec<PlaceEntry>,
    /// `alias → canonical name` pairs.
    #[serde(default)]
    aliases: HashMap<String, String>,
}

/// The immutable offline lookup tables.
#[derive(Debug)]
pub struct GeoDatabase {
    postal: HashMap<String, PostalEntry>,
    // Keyed by lowercased canonical name.
    places: HashMap<String, PlaceEntry>,
    // Lowercased alias → lowercased canonical name.
    aliases: HashMap<String, String>,
}

impl GeoDatabase {
    /// Build a database from a JSON snapshot string.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let snapshot: Snapshot = serde_json::from_str(json)
            .map_err(|e| RegistryError::Parse(format!("invalid geo database snapshot: {e}")))?;
        let mut builder = GeoDatabaseBuilder::new();
        for entry in snapshot.postal_codes {
            builder = builder.postal_entry(entry);
        }
        for entry in snapshot.places {
            builder = builder.place_entry(entry);
        }
        for (alias, canonical) in snapshot.aliases {
            builder = builder.alias(&alias, &canonical);
        }
        Ok(builder.build())
    }

    /// Exact postal-code lookup.
    pub fn lookup_postal(&self, code: &str) -> Option<&PostalEntry> {
        self.postal.get(code.trim())
    }

    /// Case-insensitive, alias-aware place-name lookup.
    pub fn lookup_place(&self, name: &str) -> Option<&PlaceEntry> {
        let key = name.trim().to_lowercase();
        if let Some(entry) = self.places.get(&key) {
            return Some(entry);
        }
        let canonical = self.aliases.get(&key)?;
        self.places.get(canonical)
    }

    /// Number of postal entries (used by startup logging).
    pub fn postal_count(&self) -> usize {
        self.postal.len()
    }

    /// Number of place entries (used by startup logging).
    pub fn place_count(&self) -> usize {
        self.places.len()
    }
}

/// Builder for constructing a [`GeoDatabase`] programmatically.
///
/// Consumed by `build()`; the resulting database cannot be mutated.
#[derive(Debug, Default)]
pub struct GeoDatabaseBuilder {
    postal: HashMap<String, PostalEntry>,
    places: HashMap<String, PlaceEntry>,
    aliases: HashMap<String, String>,
}

impl GeoDatabaseBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a postal-code entry.
    pub fn postal(self, code: &str, name: &str, geometry: Geometry) -> Self {
        self.postal_entry(PostalEntry {
            code: code.to_string(),
            name: name.to_string(),
            geometry,
        })
    }

    /// Add a prebuilt postal entry.
    pub fn postal_entry(mut self, entry: PostalEntry) -> Self {
        self.postal.insert(entry.code.trim().to_string(), entry);
        self
    }

    /// Add a sub-national region.
    pub fn region(self, name: &str, geometry: Geometry) -> Self {
        self.place_entry(PlaceEntry {
            name: name.to_string(),
            precision: Precision::Regional,
            geometry,
        })
    }

    /// Add a nation.
    pub fn nation(self, name: &str, geometry: Geometry) -> Self {
        self.place_entry(PlaceEntry {
            name: name.to_string(),
            precision: Precision::Country,
            geometry,
        })
    }

    /// Add a prebuilt place entry.
    pub fn place_entry(mut self, entry: PlaceEntry) -> Self {
        self.places.insert(entry.name.trim().to_lowercase(), entry);
        self
    }

    /// Add an alias for a canonical place name.
    pub fn alias(mut self, alias: &str, canonical: &str) -> Self {
        self.aliases.insert(
            alias.trim().to_lowercase(),
            canonical.trim().to_lowercase(),
        );
        self
    }

    /// Freeze into an immutable database.
    pub fn build(self) -> GeoDatabase {
        GeoDatabase {
            postal: self.postal,
            places: self.places,
            aliases: self.aliases,
        }
    }
}
