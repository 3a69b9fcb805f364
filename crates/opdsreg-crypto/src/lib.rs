//! # opdsreg-crypto — Signature Verification Primitives
//!
//! Provides the cryptographic building blocks for authentication-document
//! verification:
//!
//! - **Ed25519** key and signature newtypes with hex serde, signing (for
//!   key tooling and tests), and verification over `CanonicalBytes`.
//! - **Verifier registry**: a pluggable `SignatureVerifier` strategy keyed
//!   by the algorithm name a document declares, so new schemes can be added
//!   without touching the document validator's control flow.
//!
//! Trust is established at registration time: keys are self-signed and
//! pinned on first successful validation, with no CA chain.
//!
//! ## Crate Policy
//!
//! - Depends only on `opdsreg-core` internally.
//! - No mocking of cryptographic operations in tests — all tests use real
//!   `CanonicalBytes` and real Ed25519.

pub mod ed25519;
pub mod verifier;

pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use verifier::{SignatureVerifier, VerifierRegistry, ED25519_ALGORITHM};
