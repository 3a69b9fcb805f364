//! # Canonical Serialization
//!
//! Defines `CanonicalBytes`, the sole construction path for bytes used in
//! signature verification and digest computation.
//!
//! An authentication document is signed by the library over the document
//! body with the `signature` member removed; both sides must produce the
//! same byte sequence for the same logical document. `CanonicalBytes`
//! serializes through `serde_json::Value`, whose object maps are ordered
//! by key, with compact separators — so member order in the source text
//! never affects the signed bytes.
//!
//! The inner field is private: any function that verifies or digests must
//! accept `&CanonicalBytes`, and the only way to produce one is through
//! this pipeline.

use serde::Serialize;
use serde_json::Value;

use crate::error::RegistryError;

/// Bytes produced exclusively by sorted-key, compact JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Parse` if the value cannot be represented
    /// as JSON (e.g., a map with non-string keys or a non-finite float).
    pub fn new(obj: &impl Serialize) -> Result<Self, RegistryError> {
        let value = serde_json::to_value(obj)
            .map_err(|e| RegistryError::Parse(format!("canonicalization failed: {e}")))?;
        Self::from_value(&value)
    }

    /// Construct canonical bytes from an existing JSON value.
    pub fn from_value(value: &Value) -> Result<Self, RegistryError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| RegistryError::Parse(format!("canonicalization failed: {e}")))?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_order_does_not_matter() {
        let a: Value = serde_json::from_str(r#"{"b": 1, "a": 2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a": 2, "b": 1}"#).unwrap();
        assert_eq!(
            CanonicalBytes::from_value(&a).unwrap(),
            CanonicalBytes::from_value(&b).unwrap()
        );
    }

    #[test]
    fn test_output_is_sorted_and_compact() {
        let v = json!({"zeta": 1, "alpha": {"y": true, "x": null}});
        let c = CanonicalBytes::from_value(&v).unwrap();
        assert_eq!(
            std::str::from_utf8(c.as_bytes()).unwrap(),
            r#"{"alpha":{"x":null,"y":true},"zeta":1}"#
        );
    }

    #[test]
    fn test_from_struct() {
        #[derive(Serialize)]
        struct Doc {
            title: String,
            id: String,
        }
        let doc = Doc {
            title: "Test Library".into(),
            id: "https://example.org/auth".into(),
        };
        let c = CanonicalBytes::new(&doc).unwrap();
        assert!(!c.is_empty());
        assert_eq!(c.len(), c.as_bytes().len());
    }
}
