//! # Application Error
//!
//! Maps the registry error taxonomy to structured HTTP responses. Only the
//! stable kind token and the reason string cross the boundary; transport
//! detail stays in logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use opdsreg_core::RegistryError;

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// A domain error from the registry core.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Request parameters failed validation before reaching the domain.
    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// The machine-readable kind token for the response body.
    fn kind(&self) -> &'static str {
        match self {
            Self::Registry(e) => e.kind(),
            Self::Validation(_) => "validation-error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Registry(e) => match e {
                RegistryError::Fetch(_)
                | RegistryError::Parse(_)
                | RegistryError::Signature(_)
                | RegistryError::KeyMismatch(_)
                | RegistryError::UnresolvableLocation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                RegistryError::AlreadyInProgress(_)
                | RegistryError::PromotionPrecondition(_)
                | RegistryError::InvalidStage(_) => StatusCode::CONFLICT,
                RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (RegistryError::Fetch("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (RegistryError::Parse("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (RegistryError::Signature("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (RegistryError::KeyMismatch("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (
                RegistryError::UnresolvableLocation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (RegistryError::AlreadyInProgress("x".into()), StatusCode::CONFLICT),
            (
                RegistryError::PromotionPrecondition("x".into()),
                StatusCode::CONFLICT,
            ),
            (RegistryError::InvalidStage("x".into()), StatusCode::CONFLICT),
            (RegistryError::NotFound("x".into()), StatusCode::NOT_FOUND),
        ];
        for (error, expected) in cases {
            assert_eq!(AppError::from(error).status(), expected);
        }
        assert_eq!(
            AppError::Validation("bad lat".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_kind_token_carried() {
        let err = AppError::from(RegistryError::KeyMismatch("changed".into()));
        assert_eq!(err.kind(), "key-mismatch");
    }
}
