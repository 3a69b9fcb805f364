//! # Library Stage
//!
//! The stored lifecycle stage of a registered library. Three values persist,
//! matching the original registry's wire strings: `testing`, `production`,
//! `cancelled`.
//!
//! ## Transition Rules
//!
//! ```text
//! testing ──▶ production     (admin promotion)
//! production ──▶ testing     (admin rollback, or N consecutive failures)
//! testing | production ──▶ cancelled   (terminal)
//! ```
//!
//! `cancelled` has no outgoing edges — a cancelled library cannot be
//! resurrected by re-submission.

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// The lifecycle stage of a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Registered but not yet approved; excluded from public lookup.
    Testing,
    /// Approved; included in public lookup results.
    Production,
    /// Removed from the registry. Terminal.
    Cancelled,
}

impl Stage {
    /// Whether this stage is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether a transition to `target` is permitted.
    ///
    /// `production ↔ testing` is the only bidirectional edge; `cancelled`
    /// is reachable from any non-terminal stage and has no exits.
    pub fn can_transition_to(&self, target: Stage) -> bool {
        match (self, target) {
            (Self::Cancelled, _) => false,
            (_, Self::Cancelled) => true,
            (Self::Testing, Self::Production) => true,
            (Self::Production, Self::Testing) => true,
            (a, b) => *a == b,
        }
    }

    /// Validate a transition, returning a structured error on rejection.
    pub fn require_transition(&self, target: Stage) -> Result<(), RegistryError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(RegistryError::InvalidStage(format!(
                "cannot transition from {self} to {target}"
            )))
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Testing => "testing",
            Self::Production => "production",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_and_rollback_are_allowed() {
        assert!(Stage::Testing.can_transition_to(Stage::Production));
        assert!(Stage::Production.can_transition_to(Stage::Testing));
    }

    #[test]
    fn test_cancelled_is_terminal() {
        assert!(Stage::Cancelled.is_terminal());
        assert!(!Stage::Cancelled.can_transition_to(Stage::Testing));
        assert!(!Stage::Cancelled.can_transition_to(Stage::Production));
        assert!(!Stage::Cancelled.can_transition_to(Stage::Cancelled));
    }

    #[test]
    fn test_cancel_reachable_from_non_terminal() {
        assert!(Stage::Testing.can_transition_to(Stage::Cancelled));
        assert!(Stage::Production.can_transition_to(Stage::Cancelled));
    }

    #[test]
    fn test_self_transition_is_noop_allowed() {
        assert!(Stage::Testing.can_transition_to(Stage::Testing));
        assert!(Stage::Production.can_transition_to(Stage::Production));
    }

    #[test]
    fn test_require_transition_error_kind() {
        let err = Stage::Cancelled
            .require_transition(Stage::Testing)
            .unwrap_err();
        assert_eq!(err.kind(), "invalid-stage");
    }

    #[test]
    fn test_serde_wire_strings() {
        assert_eq!(serde_json::to_string(&Stage::Testing).unwrap(), "\"testing\"");
        assert_eq!(
            serde_json::to_string(&Stage::Production).unwrap(),
            "\"production\""
        );
        let parsed: Stage = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, Stage::Cancelled);
    }
}
