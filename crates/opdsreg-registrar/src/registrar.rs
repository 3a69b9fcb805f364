//! # Registrar — The Onboarding Pipeline
//!
//! One `submit` call is one registration attempt:
//!
//! ```text
//! submit ──▶ fetch + verify document ──▶ resolve coverage ──▶ persist + index
//! ```
//!
//! At most one attempt per library id is in flight at a time; a second
//! concurrent call fails fast with `AlreadyInProgress`. Attempts for
//! different ids proceed in parallel.
//!
//! Failures are recorded on the library record and returned to the caller;
//! they never unwind the store or the index. A production library survives
//! transient failures: demotion to `testing` happens only after
//! `demotion_threshold` consecutive failed attempts.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use opdsreg_authdoc::{AuthenticationRecord, DocumentFetcher, DocumentValidator};
use opdsreg_core::{LibraryId, RegistryError, Stage};
use opdsreg_coverage::CoverageIndex;
use opdsreg_geo::{ExternalGeocoder, GeoResolver, ServiceAreaSet};

use crate::config::RegistrarConfig;
use crate::library::{Library, RegistrationState};
use crate::store::LibraryStore;

/// Releases the in-flight reservation when an attempt ends, however it ends.
struct FlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<LibraryId>>,
    id: LibraryId,
}

impl<'a> FlightGuard<'a> {
    /// Reserve `id`, or fail if an attempt is already in flight.
    fn acquire(
        in_flight: &'a Mutex<HashSet<LibraryId>>,
        id: LibraryId,
    ) -> Result<Self, RegistryError> {
        let mut set = in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(id) {
            return Err(RegistryError::AlreadyInProgress(format!(
                "a registration attempt for {id} is already running"
            )));
        }
        Ok(Self { in_flight, id })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}

/// The registration state machine.
///
/// Generic over the document fetcher, the external geocoder, and the store
/// so tests run entirely in memory.
pub struct Registrar<F, E, S> {
    validator: DocumentValidator<F>,
    resolver: GeoResolver<E>,
    store: S,
    index: Arc<CoverageIndex>,
    config: RegistrarConfig,
    in_flight: Mutex<HashSet<LibraryId>>,
    // Serializes every store+index mutation (attempt commits and admin
    // transitions). Admin transitions run while a submit is in flight, so
    // commits re-read the record under this lock and must never interleave
    // with a transition's read-modify-write.
    transitions: Mutex<()>,
}

impl<F, E, S> Registrar<F, E, S>
where
    F: DocumentFetcher,
    E: ExternalGeocoder,
    S: LibraryStore,
{
    /// Assemble a registrar from its components.
    pub fn new(
        validator: DocumentValidator<F>,
        resolver: GeoResolver<E>,
        store: S,
        index: Arc<CoverageIndex>,
        config: RegistrarConfig,
    ) -> Self {
        Self {
            validator,
            resolver,
            store,
            index,
            config,
            in_flight: Mutex::new(HashSet::new()),
            transitions: Mutex::new(()),
        }
    }

    /// The stored record for `id`, if any.
    pub fn library(&self, id: &LibraryId) -> Option<Library> {
        self.store.get(id)
    }

    /// The externally visible registration state of `id`.
    pub fn state(&self, id: &LibraryId) -> RegistrationState {
        let in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id);
        RegistrationState::derive(self.store.get(id).as_ref(), in_flight)
    }

    /// Run one registration attempt for `id` against `auth_url`.
    ///
    /// New ids get a `testing` record on first success. Re-submission of an
    /// existing library re-validates against its pinned key and replaces its
    /// coverage wholesale. Cancelled ids are rejected with `InvalidStage`.
    ///
    /// Admin transitions are not blocked by an in-flight attempt: the commit
    /// re-reads the record and merges the attempt into whatever stage the
    /// library holds by then. A cancellation that lands mid-attempt wins —
    /// the commit is dropped and the attempt fails with `InvalidStage`.
    ///
    /// # Errors
    ///
    /// Any taxonomy error from the pipeline. Failures are also recorded on
    /// the library record before returning.
    pub async fn submit(&self, id: LibraryId, auth_url: &str) -> Result<Library, RegistryError> {
        let _guard = FlightGuard::acquire(&self.in_flight, id)?;

        let existing = self.store.get(&id);
        if let Some(record) = &existing {
            if record.stage.is_terminal() {
                return Err(RegistryError::InvalidStage(format!(
                    "{id} is cancelled and cannot be re-registered"
                )));
            }
        }
        tracing::info!(library = %id, url = auth_url, "registration attempt started");

        match self.attempt(&existing, auth_url).await {
            Ok((record_of_attempt, areas)) => {
                let record = self.commit_success(id, auth_url, record_of_attempt, areas)?;
                tracing::info!(library = %id, stage = %record.stage,
                    areas = record.areas.areas().len(), "registration attempt succeeded");
                Ok(record)
            }
            Err(error) => {
                self.commit_failure(id, auth_url, &error);
                tracing::warn!(library = %id, kind = error.kind(), error = %error,
                    "registration attempt failed");
                Err(error)
            }
        }
    }

    /// Promote a verified library to production.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `PromotionPrecondition` when the latest
    /// attempt is unverified or coverage is empty, `InvalidStage` for
    /// cancelled libraries.
    pub fn promote(&self, id: &LibraryId) -> Result<Library, RegistryError> {
        let _lock = self.transitions.lock().unwrap_or_else(|e| e.into_inner());
        let mut record = self.store.require(id)?;
        record.stage.require_transition(Stage::Production)?;
        if !record.is_promotable() {
            return Err(RegistryError::PromotionPrecondition(format!(
                "{id} has no verified document or no resolved service area"
            )));
        }
        record.stage = Stage::Production;
        self.store.put(record.clone());
        self.index.set_stage(id, Stage::Production);
        tracing::info!(library = %id, "promoted to production");
        Ok(record)
    }

    /// Roll a production library back to testing.
    pub fn demote(&self, id: &LibraryId) -> Result<Library, RegistryError> {
        let _lock = self.transitions.lock().unwrap_or_else(|e| e.into_inner());
        let mut record = self.store.require(id)?;
        record.stage.require_transition(Stage::Testing)?;
        record.stage = Stage::Testing;
        self.store.put(record.clone());
        self.index.set_stage(id, Stage::Testing);
        tracing::info!(library = %id, "demoted to testing");
        Ok(record)
    }

    /// Cancel a library. Terminal: the record stays for audit, coverage is
    /// removed, and the id can never be re-submitted.
    pub fn cancel(&self, id: &LibraryId) -> Result<Library, RegistryError> {
        let _lock = self.transitions.lock().unwrap_or_else(|e| e.into_inner());
        let mut record = self.store.require(id)?;
        record.stage.require_transition(Stage::Cancelled)?;
        record.stage = Stage::Cancelled;
        record.areas = ServiceAreaSet::default();
        self.store.put(record.clone());
        self.index.remove(id);
        tracing::info!(library = %id, "cancelled");
        Ok(record)
    }

    /// The fallible middle of an attempt: validate, then resolve coverage.
    async fn attempt(
        &self,
        existing: &Option<Library>,
        auth_url: &str,
    ) -> Result<(AuthenticationRecord, ServiceAreaSet), RegistryError> {
        let pinned = existing.as_ref().and_then(|r| r.public_key.as_deref());
        let record = self.validator.validate(auth_url, pinned).await?;
        let resolved = self.resolver.resolve(&record.extracted_hints).await?;
        Ok((record, ServiceAreaSet::from_resolved(resolved)))
    }

    /// Persist a successful attempt and refresh the index.
    ///
    /// The record is re-read under the transition lock: admin transitions
    /// may have run while the attempt was fetching and resolving, and the
    /// attempt must merge into the record as it stands now. If the library
    /// was cancelled mid-attempt the commit is dropped entirely.
    fn commit_success(
        &self,
        id: LibraryId,
        auth_url: &str,
        attempt: AuthenticationRecord,
        areas: ServiceAreaSet,
    ) -> Result<Library, RegistryError> {
        let _lock = self.transitions.lock().unwrap_or_else(|e| e.into_inner());
        let current = self.store.get(&id);
        if current.as_ref().is_some_and(|r| r.stage.is_terminal()) {
            return Err(RegistryError::InvalidStage(format!(
                "{id} was cancelled while the attempt was running"
            )));
        }
        let mut record = current.unwrap_or_else(|| Library::new(id, auth_url));
        record.auth_url = auth_url.to_string();
        if let Some(title) = &attempt.title {
            record.name = title.clone();
        }
        if record.public_key.is_none() {
            record.public_key = attempt.public_key.clone();
        }
        record.last_validated_at = Some(attempt.fetched_at);
        record.consecutive_failures = 0;
        record.latest_attempt = Some(attempt);
        record.areas = areas.clone();
        self.store.put(record.clone());
        if let Some(validated_at) = record.last_validated_at {
            self.index.upsert(id, areas, record.stage, validated_at);
        }
        Ok(record)
    }

    /// Record a failed attempt, demoting a production library once the
    /// consecutive-failure threshold is crossed.
    ///
    /// Re-reads under the transition lock for the same reason as
    /// [`commit_success`](Self::commit_success); a library cancelled
    /// mid-attempt records nothing.
    fn commit_failure(&self, id: LibraryId, auth_url: &str, error: &RegistryError) {
        let _lock = self.transitions.lock().unwrap_or_else(|e| e.into_inner());
        let current = self.store.get(&id);
        if current.as_ref().is_some_and(|r| r.stage.is_terminal()) {
            tracing::debug!(library = %id, "cancelled mid-attempt; failure not recorded");
            return;
        }
        let mut record = current.unwrap_or_else(|| Library::new(id, auth_url));
        record.consecutive_failures += 1;
        record.latest_attempt = Some(AuthenticationRecord::from_failure(error));
        if record.stage == Stage::Production
            && record.consecutive_failures >= self.config.demotion_threshold
        {
            tracing::warn!(library = %id, failures = record.consecutive_failures,
                "consecutive-failure threshold crossed; demoting to testing");
            record.stage = Stage::Testing;
            self.index.set_stage(&id, Stage::Testing);
        }
        self.store.put(record);
    }
}
