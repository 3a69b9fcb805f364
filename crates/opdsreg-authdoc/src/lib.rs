//! # opdsreg-authdoc — Authentication Document Handling
//!
//! A library proves its identity by publishing a signed authentication
//! document at a stable URL. This crate owns everything between "here is a
//! URL" and "here is a verified identity with location hints":
//!
//! - **Document** (`document.rs`): the JSON document model, structural
//!   checks, the canonical signed payload, and hint extraction.
//! - **Fetcher** (`fetcher.rs`): the `DocumentFetcher` seam and its
//!   reqwest implementation with an explicit timeout.
//! - **Validator** (`validator.rs`): the fetch → parse → verify → key-pin
//!   pipeline producing an `AuthenticationRecord`.
//!
//! The validator never writes to storage; it returns fields for the
//! registrar to persist.

pub mod document;
pub mod fetcher;
pub mod validator;

pub use document::AuthenticationDocument;
pub use fetcher::{DocumentFetcher, FetchedDocument, HttpFetcher};
pub use validator::{AuthenticationRecord, DocumentValidator};
