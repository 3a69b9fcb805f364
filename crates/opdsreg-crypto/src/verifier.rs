//! # Verifier Registry — Pluggable Signature Schemes
//!
//! An authentication document declares the algorithm its public key uses.
//! The document validator looks the algorithm up here and delegates to the
//! matching `SignatureVerifier`, so adding a scheme is a registration call
//! rather than a new branch in the validation control flow.
//!
//! Key material crosses this seam as hex strings because each scheme owns
//! its key encoding; the Ed25519 verifier parses 32-byte hex keys and
//! 64-byte hex signatures.

use std::collections::HashMap;

use opdsreg_core::{CanonicalBytes, RegistryError};

use crate::ed25519::{self, Ed25519PublicKey, Ed25519Signature};

/// Algorithm name for Ed25519, as declared in `public_key.type`.
pub const ED25519_ALGORITHM: &str = "Ed25519";

/// A signature verification strategy for one declared algorithm.
pub trait SignatureVerifier: Send + Sync {
    /// The algorithm name this verifier handles.
    fn algorithm(&self) -> &'static str;

    /// Verify `signature_hex` over `payload` using `public_key_hex`.
    ///
    /// Returns `RegistryError::Signature` on malformed key material or a
    /// failed verification.
    fn verify(
        &self,
        payload: &CanonicalBytes,
        signature_hex: &str,
        public_key_hex: &str,
    ) -> Result<(), RegistryError>;
}

/// Ed25519 implementation of [`SignatureVerifier`].
#[derive(Debug, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn algorithm(&self) -> &'static str {
        ED25519_ALGORITHM
    }

    fn verify(
        &self,
        payload: &CanonicalBytes,
        signature_hex: &str,
        public_key_hex: &str,
    ) -> Result<(), RegistryError> {
        let key = Ed25519PublicKey::from_hex(public_key_hex)?;
        let sig = Ed25519Signature::from_hex(signature_hex)?;
        ed25519::verify(payload, &sig, &key)
    }
}

/// Registry of verification strategies keyed by declared algorithm name.
pub struct VerifierRegistry {
    verifiers: HashMap<&'static str, Box<dyn SignatureVerifier>>,
}

impl VerifierRegistry {
    /// An empty registry with no algorithms.
    pub fn empty() -> Self {
        Self {
            verifiers: HashMap::new(),
        }
    }

    /// The default registry: Ed25519 only.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(Ed25519Verifier));
        registry
    }

    /// Register a verification strategy under its algorithm name.
    pub fn register(&mut self, verifier: Box<dyn SignatureVerifier>) {
        self.verifiers.insert(verifier.algorithm(), verifier);
    }

    /// Verify a signature using the strategy for `algorithm`.
    ///
    /// An unknown algorithm is a `Signature` error — the document declared
    /// a scheme this registry cannot check.
    pub fn verify(
        &self,
        algorithm: &str,
        payload: &CanonicalBytes,
        signature_hex: &str,
        public_key_hex: &str,
    ) -> Result<(), RegistryError> {
        let verifier = self.verifiers.get(algorithm).ok_or_else(|| {
            RegistryError::Signature(format!("unsupported signature algorithm: {algorithm}"))
        })?;
        verifier.verify(payload, signature_hex, public_key_hex)
    }
}

impl Default for VerifierRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
