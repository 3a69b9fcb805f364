//! # Document Validator
//!
//! The fetch → parse → verify → key-pin pipeline. One call validates one
//! authentication document and produces an `AuthenticationRecord` for the
//! registrar to persist.
//!
//! Trust model: keys are self-signed, no CA chain. The first successful
//! validation pins the declared key; any later validation that declares a
//! different key fails with `KeyMismatch` until an explicit
//! re-registration clears the pin.

use opdsreg_core::{ContentDigest, RegistryError, Timestamp};
use opdsreg_crypto::VerifierRegistry;
use serde::{Deserialize, Serialize};

use crate::document::AuthenticationDocument;
use crate::fetcher::DocumentFetcher;

/// The outcome of one validation attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticationRecord {
    /// Whether the document verified end to end.
    pub verified: bool,
    /// Failure reason, when `verified` is false.
    pub failure_reason: Option<String>,
    /// The library's declared display name.
    pub title: Option<String>,
    /// Location hints in declared order, exact-deduplicated.
    pub extracted_hints: Vec<String>,
    /// The declared key's algorithm, when parsing got that far.
    pub key_algorithm: Option<String>,
    /// The declared key's hex value, when parsing got that far.
    pub public_key: Option<String>,
    /// SHA-256 of the fetched body, for drift detection between attempts.
    pub document_digest: Option<ContentDigest>,
    /// When the fetch happened.
    pub fetched_at: Timestamp,
}

impl AuthenticationRecord {
    /// Record a failed attempt from a pipeline error.
    pub fn from_failure(error: &RegistryError) -> Self {
        Self {
            verified: false,
            failure_reason: Some(error.to_string()),
            title: None,
            extracted_hints: Vec::new(),
            key_algorithm: None,
            public_key: None,
            document_digest: None,
            fetched_at: Timestamp::now(),
        }
    }
}

/// Validates authentication documents. No storage side effects.
pub struct DocumentValidator<F> {
    fetcher: F,
    verifiers: VerifierRegistry,
}

impl<F: DocumentFetcher> DocumentValidator<F> {
    /// Create a validator over a fetcher, with the default verifier set.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            verifiers: VerifierRegistry::with_defaults(),
        }
    }

    /// Create a validator with a custom verifier registry.
    pub fn with_verifiers(fetcher: F, verifiers: VerifierRegistry) -> Self {
        Self { fetcher, verifiers }
    }

    /// Validate the document at `url`.
    ///
    /// `pinned_key` is the hex key stored at first successful validation,
    /// if any; a declared key that differs fails with `KeyMismatch`.
    ///
    /// On success the returned record has `verified = true` and carries
    /// the declared key for the caller to pin. Failures are returned as
    /// errors; callers persist them via
    /// [`AuthenticationRecord::from_failure`].
    pub async fn validate(
        &self,
        url: &str,
        pinned_key: Option<&str>,
    ) -> Result<AuthenticationRecord, RegistryError> {
        let fetched = self.fetcher.fetch(url).await?;
        let fetched_at = Timestamp::now();
        let digest = ContentDigest::of_bytes(&fetched.bytes);

        let document = AuthenticationDocument::from_bytes(&fetched.bytes)?;
        document.check_structure(&fetched.final_url)?;

        let key = document.public_key.clone().ok_or_else(|| {
            RegistryError::Signature("document does not declare a public key".into())
        })?;
        let signature = document.signature.clone().ok_or_else(|| {
            RegistryError::Signature("document does not carry a signature".into())
        })?;

        let payload = document.signed_payload()?;
        self.verifiers
            .verify(&key.algorithm, &payload, &signature, &key.value)?;

        if let Some(pinned) = pinned_key {
            if !pinned.eq_ignore_ascii_case(&key.value) {
                return Err(RegistryError::KeyMismatch(format!(
                    "declared key differs from the key pinned at registration for {url}"
                )));
            }
        }

        let hints = document.location_hints();
        tracing::info!(url, hints = hints.len(), "authentication document verified");
        Ok(AuthenticationRecord {
            verified: true,
            failure_reason: None,
            title: document.title.clone(),
            extracted_hints: hints,
            key_algorithm: Some(key.algorithm),
            public_key: Some(key.value),
            document_digest: Some(digest),
            fetched_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchedDocument;
    use opdsreg_core::CanonicalBytes;
    use opdsreg_crypto::{Ed25519KeyPair, ED25519_ALGORITHM};
    use serde_json::{json, Value};

    /// Serves a fixed body for any URL, reporting that URL as final.
    struct FakeFetcher {
        body: Vec<u8>,
        status_error: bool,
    }

    impl DocumentFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedDocument, RegistryError> {
            if self.status_error {
                return Err(RegistryError::Fetch(format!(
                    "document at {url} returned status 503"
                )));
            }
            Ok(FetchedDocument {
                bytes: self.body.clone(),
                final_url: url.to_string(),
            })
        }
    }

    const URL: &str = "https://lib.example/auth";

    /// Build a signed document for `URL` and return (body, key hex).
    fn signed_document(keypair: &Ed25519KeyPair, extra: Value) -> Vec<u8> {
        let mut doc = json!({
            "id": URL,
            "title": "Example Library",
            "public_key": {"type": ED25519_ALGORITHM, "value": keypair.public_key().to_hex()},
        });
        if let (Some(base), Some(more)) = (doc.as_object_mut(), extra.as_object()) {
            for (k, v) in more {
                base.insert(k.clone(), v.clone());
            }
        }
        let payload = CanonicalBytes::from_value(&doc).unwrap();
        let sig = keypair.sign(&payload);
        doc.as_object_mut()
            .unwrap()
            .insert("signature".into(), Value::String(sig.to_hex()));
        serde_json::to_vec(&doc).unwrap()
    }

    fn validator_for(body: Vec<u8>) -> DocumentValidator<FakeFetcher> {
        DocumentValidator::new(FakeFetcher {
            body,
            status_error: false,
        })
    }

    #[tokio::test]
    async fn test_valid_document_verifies() {
        let kp = Ed25519KeyPair::generate();
        let body = signed_document(&kp, json!({"service_area": ["10001"]}));
        let record = validator_for(body).validate(URL, None).await.unwrap();
        assert!(record.verified);
        assert_eq!(record.title.as_deref(), Some("Example Library"));
        assert_eq!(record.extracted_hints, vec!["10001"]);
        assert_eq!(record.public_key.unwrap(), kp.public_key().to_hex());
        assert!(record.document_digest.is_some());
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let validator = DocumentValidator::new(FakeFetcher {
            body: Vec::new(),
            status_error: true,
        });
        let err = validator.validate(URL, None).await.unwrap_err();
        assert_eq!(err.kind(), "fetch-error");
        let record = AuthenticationRecord::from_failure(&err);
        assert!(!record.verified);
        assert!(record.failure_reason.unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let err = validator_for(b"not json".to_vec())
            .validate(URL, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "parse-error");
    }

    #[tokio::test]
    async fn test_unsigned_document_is_signature_error() {
        let kp = Ed25519KeyPair::generate();
        let body = serde_json::to_vec(&json!({
            "id": URL,
            "title": "Example Library",
            "public_key": {"type": ED25519_ALGORITHM, "value": kp.public_key().to_hex()},
        }))
        .unwrap();
        let err = validator_for(body).validate(URL, None).await.unwrap_err();
        assert_eq!(err.kind(), "signature-error");
    }

    #[tokio::test]
    async fn test_tampered_document_fails_verification() {
        let kp = Ed25519KeyPair::generate();
        let body = signed_document(&kp, json!({}));
        let mut doc: Value = serde_json::from_slice(&body).unwrap();
        doc["title"] = Value::String("Tampered Title".into());
        let err = validator_for(serde_json::to_vec(&doc).unwrap())
            .validate(URL, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "signature-error");
    }

    #[tokio::test]
    async fn test_id_mismatch_is_parse_error() {
        let kp = Ed25519KeyPair::generate();
        let body = signed_document(&kp, json!({}));
        let err = validator_for(body)
            .validate("https://elsewhere.example/auth", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "parse-error");
    }

    #[tokio::test]
    async fn test_pinned_key_match_passes() {
        let kp = Ed25519KeyPair::generate();
        let body = signed_document(&kp, json!({}));
        let pinned = kp.public_key().to_hex();
        let record = validator_for(body)
            .validate(URL, Some(&pinned))
            .await
            .unwrap();
        assert!(record.verified);
    }

    #[tokio::test]
    async fn test_changed_key_is_key_mismatch() {
        let kp = Ed25519KeyPair::generate();
        let other = Ed25519KeyPair::generate();
        let body = signed_document(&kp, json!({}));
        let pinned = other.public_key().to_hex();
        let err = validator_for(body)
            .validate(URL, Some(&pinned))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "key-mismatch");
    }

    #[tokio::test]
    async fn test_unknown_algorithm_rejected() {
        let kp = Ed25519KeyPair::generate();
        let body = signed_document(&kp, json!({}));
        let mut doc: Value = serde_json::from_slice(&body).unwrap();
        doc["public_key"]["type"] = Value::String("RSA-PSS".into());
        let err = validator_for(serde_json::to_vec(&doc).unwrap())
            .validate(URL, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "signature-error");
    }
}
