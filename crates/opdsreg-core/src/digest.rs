//! # Content Digest
//!
//! SHA-256 digests for fetched authentication documents. The registrar
//! stores the digest of each fetched document so re-validation can tell
//! whether the remote document actually changed between attempts.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// A SHA-256 content digest, hex-rendered for storage and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(pub [u8; 32]);

impl ContentDigest {
    /// Digest the raw bytes of a fetched document.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute a SHA-256 digest from canonical bytes.
///
/// Accepts only `&CanonicalBytes` so that digests of structured payloads
/// always flow through the canonicalization pipeline.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    ContentDigest::of_bytes(data.as_bytes())
}
