//! # Authentication Document Model
//!
//! The signed JSON document a library publishes. The members the registry
//! cares about:
//!
//! - `id` — the document's own URL; must match where it was fetched from.
//! - `title` — the library's display name.
//! - `public_key` — `{ "type": <algorithm>, "value": <hex> }`.
//! - `service_area` — `"everywhere"`, an array of names, or a
//!   `{nation: places}` map.
//! - `postal_codes`, `place_names` — optional plain hint arrays.
//! - `signature` — hex signature over the canonical document with the
//!   `signature` member removed.
//!
//! Hint extraction preserves declared order — service area first, then
//! postal codes, then place names — deduplicated by exact string match
//! only. Semantic dedup ("NY" vs "New York") is the resolver's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use opdsreg_core::{CanonicalBytes, RegistryError};

/// The declared public key of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredKey {
    /// Algorithm name, e.g. `"Ed25519"`.
    #[serde(rename = "type")]
    pub algorithm: String,
    /// Hex-encoded key material; encoding is algorithm-specific.
    pub value: String,
}

/// The `service_area` member in any of its three accepted shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceAreaField {
    /// `"everywhere"` or a single place name.
    Single(String),
    /// A flat list of place names.
    List(Vec<String>),
    /// `{nation: "everywhere" | name | [names]}`.
    ByNation(serde_json::Map<String, Value>),
}

/// A parsed authentication document.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticationDocument {
    /// The document's own URL.
    pub id: Option<String>,
    /// The library's display name.
    pub title: Option<String>,
    /// The declared signing key.
    pub public_key: Option<DeclaredKey>,
    /// Declared coverage.
    pub service_area: Option<ServiceAreaField>,
    /// Optional postal-code hints.
    #[serde(default)]
    pub postal_codes: Vec<String>,
    /// Optional free-text place-name hints.
    #[serde(default)]
    pub place_names: Vec<String>,
    /// Hex signature over the canonical payload.
    pub signature: Option<String>,
    /// The raw document value, kept for payload reconstruction.
    #[serde(skip)]
    raw: Value,
}

impl AuthenticationDocument {
    /// Parse a document from fetched bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RegistryError> {
        let raw: Value = serde_json::from_slice(bytes)
            .map_err(|e| RegistryError::Parse(format!("document is not valid JSON: {e}")))?;
        if !raw.is_object() {
            return Err(RegistryError::Parse(
                "document root must be a JSON object".into(),
            ));
        }
        let mut doc: AuthenticationDocument = serde_json::from_value(raw.clone())
            .map_err(|e| RegistryError::Parse(format!("document has malformed members: {e}")))?;
        doc.raw = raw;
        Ok(doc)
    }

    /// Structural checks: required members present and `id` matching the
    /// URL the document was actually fetched from.
    pub fn check_structure(&self, fetched_from: &str) -> Result<(), RegistryError> {
        let id = self
            .id
            .as_deref()
            .ok_or_else(|| RegistryError::Parse("document is missing an id".into()))?;
        if self.title.as_deref().map_or(true, str::is_empty) {
            return Err(RegistryError::Parse("document is missing a title".into()));
        }
        if id != fetched_from {
            return Err(RegistryError::Parse(format!(
                "document id ({id}) does not match its url ({fetched_from})"
            )));
        }
        Ok(())
    }

    /// The canonical bytes the signature covers: the document with the
    /// `signature` member removed, sorted-key serialized.
    pub fn signed_payload(&self) -> Result<CanonicalBytes, RegistryError> {
        let mut value = self.raw.clone();
        if let Some(obj) = value.as_object_mut() {
            obj.remove("signature");
        }
        CanonicalBytes::from_value(&value)
    }

    /// Extract location hints in declared order, deduplicated by exact
    /// string match.
    pub fn location_hints(&self) -> Vec<String> {
        let mut hints: Vec<String> = Vec::new();
        let mut push = |hint: String| {
            let trimmed = hint.trim().to_string();
            if !trimmed.is_empty() && !hints.contains(&trimmed) {
                hints.push(trimmed);
            }
        };

        match &self.service_area {
            Some(ServiceAreaField::Single(s)) => push(s.clone()),
            Some(ServiceAreaField::List(items)) => {
                for item in items {
                    push(item.clone());
                }
            }
            Some(ServiceAreaField::ByNation(map)) => {
                for (nation, places) in map {
                    match places {
                        // A whole nation: the nation name is the hint.
                        Value::String(s) if s.eq_ignore_ascii_case("everywhere") => {
                            push(nation.clone())
                        }
                        Value::String(s) => push(format!("{s}, {nation}")),
                        Value::Array(items) => {
                            for item in items {
                                if let Value::String(s) = item {
                                    push(format!("{s}, {nation}"));
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            None => {}
        }
        for code in &self.postal_codes {
            push(code.clone());
        }
        for name in &self.place_names {
            push(name.clone());
        }
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc_from(value: Value) -> AuthenticationDocument {
        AuthenticationDocument::from_bytes(&serde_json::to_vec(&value).unwrap()).unwrap()
    }

    #[test]
    fn test_parse_minimal_document() {
        let doc = doc_from(json!({
            "id": "https://lib.example/auth",
            "title": "Example Library",
        }));
        assert_eq!(doc.id.as_deref(), Some("https://lib.example/auth"));
        doc.check_structure("https://lib.example/auth").unwrap();
    }

    #[test]
    fn test_not_json_is_parse_error() {
        let err = AuthenticationDocument::from_bytes(b"<html>nope</html>").unwrap_err();
        assert_eq!(err.kind(), "parse-error");
    }

    #[test]
    fn test_non_object_root_rejected() {
        assert!(AuthenticationDocument::from_bytes(b"[1, 2]").is_err());
    }

    #[test]
    fn test_missing_id_fails_structure() {
        let doc = doc_from(json!({"title": "No Id Library"}));
        let err = doc.check_structure("https://lib.example/auth").unwrap_err();
        assert!(err.to_string().contains("missing an id"));
    }

    #[test]
    fn test_missing_title_fails_structure() {
        let doc = doc_from(json!({"id": "https://lib.example/auth"}));
        assert!(doc.check_structure("https://lib.example/auth").is_err());
    }

    #[test]
    fn test_id_url_mismatch_fails_structure() {
        let doc = doc_from(json!({"id": "https://lib.example/auth", "title": "T"}));
        let err = doc.check_structure("https://other.example/auth").unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_signed_payload_excludes_signature() {
        let with_sig = doc_from(json!({
            "id": "https://lib.example/auth",
            "title": "T",
            "signature": "aa".repeat(64),
        }));
        let without_sig = doc_from(json!({
            "id": "https://lib.example/auth",
            "title": "T",
        }));
        assert_eq!(
            with_sig.signed_payload().unwrap(),
            without_sig.signed_payload().unwrap()
        );
    }

    #[test]
    fn test_hints_single_string() {
        let doc = doc_from(json!({"id": "x", "title": "T", "service_area": "everywhere"}));
        assert_eq!(doc.location_hints(), vec!["everywhere"]);
    }

    #[test]
    fn test_hints_list_preserves_order() {
        let doc = doc_from(json!({
            "id": "x", "title": "T",
            "service_area": ["US-NY", "US-MA"],
            "postal_codes": ["10001"],
            "place_names": ["Boston"],
        }));
        assert_eq!(
            doc.location_hints(),
            vec!["US-NY", "US-MA", "10001", "Boston"]
        );
    }

    #[test]
    fn test_hints_by_nation_map() {
        let doc = doc_from(json!({
            "id": "x", "title": "T",
            "service_area": {"US": ["New York", "Boston"], "CA": "everywhere"},
        }));
        let hints = doc.location_hints();
        assert!(hints.contains(&"New York, US".to_string()));
        assert!(hints.contains(&"Boston, US".to_string()));
        assert!(hints.contains(&"CA".to_string()));
    }

    #[test]
    fn test_hints_dedup_exact_only() {
        let doc = doc_from(json!({
            "id": "x", "title": "T",
            "service_area": ["10001", "New York"],
            "postal_codes": ["10001"],
            "place_names": ["NY", "New York"],
        }));
        assert_eq!(doc.location_hints(), vec!["10001", "New York", "NY"]);
    }

    #[test]
    fn test_hints_skip_blank_entries() {
        let doc = doc_from(json!({
            "id": "x", "title": "T",
            "service_area": ["  ", "US-NY"],
        }));
        assert_eq!(doc.location_hints(), vec!["US-NY"]);
    }
}
