//! # Error Taxonomy
//!
//! The failure kinds a registration attempt or lookup can surface. All are
//! recoverable at the attempt granularity: they never crash the process and
//! never leave the coverage index or a library record half-written.
//!
//! Each variant carries a human-readable reason string; `kind()` returns a
//! stable machine token for the API boundary. Internal detail (stack traces,
//! transport errors) stays on this side of that boundary.

use thiserror::Error;

/// Top-level error type for the registry core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Network failure, timeout, or non-2xx status fetching a remote document.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The fetched document was not well-formed or failed structural checks.
    #[error("parse error: {0}")]
    Parse(String),

    /// Signature verification failed, or the declared key or algorithm is
    /// malformed or unsupported.
    #[error("signature error: {0}")]
    Signature(String),

    /// The declared public key differs from the key pinned at first
    /// successful validation. Requires an explicit re-registration flow;
    /// never auto-retried.
    #[error("key mismatch: {0}")]
    KeyMismatch(String),

    /// Every location hint exhausted the geocoding chain without resolving.
    #[error("unresolvable location: {0}")]
    UnresolvableLocation(String),

    /// A registration attempt for this library is already in flight.
    #[error("registration already in progress: {0}")]
    AlreadyInProgress(String),

    /// Promotion preconditions not met (unverified document or missing
    /// service area).
    #[error("promotion precondition failed: {0}")]
    PromotionPrecondition(String),

    /// The operation is not valid for the library's current stage
    /// (e.g., any transition out of `cancelled`).
    #[error("invalid stage: {0}")]
    InvalidStage(String),

    /// No library record exists for the given id.
    #[error("library not found: {0}")]
    NotFound(String),
}

impl RegistryError {
    /// Stable machine-readable token for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch-error",
            Self::Parse(_) => "parse-error",
            Self::Signature(_) => "signature-error",
            Self::KeyMismatch(_) => "key-mismatch",
            Self::UnresolvableLocation(_) => "unresolvable-location",
            Self::AlreadyInProgress(_) => "already-in-progress",
            Self::PromotionPrecondition(_) => "promotion-precondition",
            Self::InvalidStage(_) => "invalid-stage",
            Self::NotFound(_) => "not-found",
        }
    }

    /// Whether a caller-initiated retry is reasonable for this kind.
    ///
    /// Only transport-level failures qualify. `Signature` and `KeyMismatch`
    /// always require admin intervention.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tokens_are_stable() {
        assert_eq!(RegistryError::Fetch("x".into()).kind(), "fetch-error");
        assert_eq!(RegistryError::KeyMismatch("x".into()).kind(), "key-mismatch");
        assert_eq!(
            RegistryError::PromotionPrecondition("x".into()).kind(),
            "promotion-precondition"
        );
    }

    #[test]
    fn test_only_fetch_is_transient() {
        assert!(RegistryError::Fetch("timeout".into()).is_transient());
        assert!(!RegistryError::Signature("bad".into()).is_transient());
        assert!(!RegistryError::KeyMismatch("changed".into()).is_transient());
        assert!(!RegistryError::UnresolvableLocation("none".into()).is_transient());
    }

    #[test]
    fn test_display_includes_reason() {
        let err = RegistryError::Parse("missing title".into());
        assert_eq!(err.to_string(), "parse error: missing title");
    }
}
