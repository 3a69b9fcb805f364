//! # Library Store Seam
//!
//! Persistence for library records sits behind a trait so the registrar is
//! testable against an in-memory map and a durable backend can slot in
//! later. Operations are whole-record: `put` replaces the stored record
//! atomically, there is no partial field update.

use std::collections::HashMap;
use std::sync::RwLock;

use opdsreg_core::{LibraryId, RegistryError};

use crate::library::Library;

/// Storage for library records.
pub trait LibraryStore: Send + Sync {
    /// The record for `id`, if any.
    fn get(&self, id: &LibraryId) -> Option<Library>;

    /// Insert or replace the record under its own id.
    fn put(&self, record: Library);

    /// Delete the record for `id`. Deleting a missing id is a no-op.
    fn delete(&self, id: &LibraryId);

    /// All stored records, in unspecified order.
    fn list(&self) -> Vec<Library>;

    /// The record for `id`, or `NotFound`.
    fn require(&self, id: &LibraryId) -> Result<Library, RegistryError> {
        self.get(id)
            .ok_or_else(|| RegistryError::NotFound(format!("no library record for {id}")))
    }
}

/// `RwLock<HashMap>` store for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<LibraryId, Library>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LibraryStore for MemoryStore {
    fn get(&self, id: &LibraryId) -> Option<Library> {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    fn put(&self, record: Library) {
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(record.id, record);
    }

    fn delete(&self, id: &LibraryId) {
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
    }

    fn list(&self) -> Vec<Library> {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }
}
