//! # Library Record
//!
//! The persisted registration record and its derived state view.
//!
//! The stored record keeps only three lifecycle values (`testing`,
//! `production`, `cancelled`). The richer five-state view adds `New`
//! (no record exists yet) and `PendingValidation` (a submit call is in
//! flight), both derived at read time rather than persisted.

use serde::{Deserialize, Serialize};

use opdsreg_authdoc::AuthenticationRecord;
use opdsreg_core::{LibraryId, Stage, Timestamp};
use opdsreg_geo::ServiceAreaSet;

/// The persisted record of one registered library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    /// Registry-assigned identifier.
    pub id: LibraryId,
    /// Display name, taken from the authentication document's title.
    pub name: String,
    /// The URL of the library's authentication document.
    pub auth_url: String,
    /// Hex public key pinned at first successful validation.
    pub public_key: Option<String>,
    /// Current lifecycle stage.
    pub stage: Stage,
    /// When validation last succeeded.
    pub last_validated_at: Option<Timestamp>,
    /// Consecutive failed validation attempts since the last success.
    pub consecutive_failures: u32,
    /// The most recent validation attempt, success or failure.
    pub latest_attempt: Option<AuthenticationRecord>,
    /// The library's current resolved coverage.
    pub areas: ServiceAreaSet,
}

impl Library {
    /// A fresh record for a first submission, in `testing`.
    pub fn new(id: LibraryId, auth_url: &str) -> Self {
        Self {
            id,
            name: String::new(),
            auth_url: auth_url.to_string(),
            public_key: None,
            stage: Stage::Testing,
            last_validated_at: None,
            consecutive_failures: 0,
            latest_attempt: None,
            areas: ServiceAreaSet::default(),
        }
    }

    /// Whether the latest attempt verified end to end.
    pub fn is_verified(&self) -> bool {
        self.latest_attempt.as_ref().is_some_and(|a| a.verified)
    }

    /// Whether promotion preconditions hold: a verified document and a
    /// non-empty service area.
    pub fn is_promotable(&self) -> bool {
        self.is_verified() && !self.areas.is_empty()
    }
}

/// The externally visible registration state of a library id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    /// No record exists for this id.
    New,
    /// A submit call is currently in flight.
    PendingValidation,
    /// Registered, awaiting promotion.
    Testing,
    /// Live in public lookup results.
    Production,
    /// Removed. Terminal.
    Cancelled,
}

impl RegistrationState {
    /// Derive the view from store presence, the in-flight set, and stage.
    pub fn derive(record: Option<&Library>, in_flight: bool) -> Self {
        if in_flight {
            return Self::PendingValidation;
        }
        match record.map(|r| r.stage) {
            None => Self::New,
            Some(Stage::Testing) => Self::Testing,
            Some(Stage::Production) => Self::Production,
            Some(Stage::Cancelled) => Self::Cancelled,
        }
    }
}
