//! # opdsreg-registrar — Registration State Machine
//!
//! Drives a library's lifecycle from first submission to activation:
//!
//! - **Library** (`library.rs`): the persisted registration record and the
//!   derived `RegistrationState` view.
//! - **LibraryStore** (`store.rs`): the storage seam and its in-memory
//!   implementation.
//! - **RegistrarConfig** (`config.rs`): demotion threshold and network
//!   timeouts, deserializable with defaults.
//! - **Registrar** (`registrar.rs`): the pipeline itself — validate the
//!   authentication document, resolve coverage, persist, index — plus the
//!   admin transitions (`promote`, `demote`, `cancel`) and the per-library
//!   single-flight guard.
//!
//! One registration attempt is one `submit` call. Attempts either complete
//! fully (record persisted, index updated) or record their failure on the
//! library; they never leave the index and the store disagreeing.

pub mod config;
pub mod library;
pub mod registrar;
pub mod store;

pub use config::RegistrarConfig;
pub use library::{Library, RegistrationState};
pub use registrar::Registrar;
pub use store::{LibraryStore, MemoryStore};
