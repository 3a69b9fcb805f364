//! # Application State
//!
//! Shared state for the Axum application: the registrar driving the
//! registration lifecycle and the lookup service answering point queries.
//! Both sit behind `Arc` so handler clones are cheap.

use std::sync::Arc;

use opdsreg_authdoc::HttpFetcher;
use opdsreg_coverage::{CoverageIndex, LookupService};
use opdsreg_geo::HttpGeocoder;
use opdsreg_registrar::{MemoryStore, Registrar};

/// The registrar as deployed: reqwest fetcher and geocoder, in-memory store.
pub type AppRegistrar = Registrar<HttpFetcher, HttpGeocoder, MemoryStore>;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// The registration state machine.
    pub registrar: Arc<AppRegistrar>,
    /// The public query surface over the coverage index.
    pub lookup: LookupService,
}

impl AppState {
    /// Assemble state from a registrar and the coverage index it maintains.
    pub fn new(registrar: AppRegistrar, index: Arc<CoverageIndex>) -> Self {
        Self {
            registrar: Arc::new(registrar),
            lookup: LookupService::new(index),
        }
    }
}
