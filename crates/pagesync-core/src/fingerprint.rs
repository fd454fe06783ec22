//! Content fingerprints used for change detection.
//!
//! A fingerprint is the SHA-256 of a canonical rendering of a set of named
//! fields. Fields are sorted by name before hashing, so the order in which a
//! payload was assembled never changes its fingerprint.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 over a canonical field map
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a set of named fields.
    ///
    /// Later duplicates of a field name replace earlier ones.
    pub fn from_fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let canonical: BTreeMap<String, Value> = fields
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();

        let mut hasher = Sha256::new();
        for (name, value) in &canonical {
            // Both halves are JSON-encoded, so separators cannot be forged by field content
            hasher.update(Value::String(name.clone()).to_string().as_bytes());
            hasher.update(b":");
            hasher.update(value.to_string().as_bytes());
            hasher.update(b"\n");
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Wrap a fingerprint previously read from storage
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_order_does_not_matter() {
        let forward = Fingerprint::from_fields([
            ("message", json!("Hello")),
            ("link", json!("https://example.com/a")),
            ("entry_id", json!(42)),
        ]);
        let backward = Fingerprint::from_fields([
            ("entry_id", json!(42)),
            ("link", json!("https://example.com/a")),
            ("message", json!("Hello")),
        ]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn any_value_change_changes_fingerprint() {
        let base = Fingerprint::from_fields([("message", json!("Hello")), ("flag", json!(true))]);
        let message = Fingerprint::from_fields([("message", json!("Hello!")), ("flag", json!(true))]);
        let flag = Fingerprint::from_fields([("message", json!("Hello")), ("flag", json!(false))]);
        assert_ne!(base, message);
        assert_ne!(base, flag);
        assert_ne!(message, flag);
    }

    #[test]
    fn value_types_are_distinguished() {
        let number = Fingerprint::from_fields([("entry_id", json!(42))]);
        let text = Fingerprint::from_fields([("entry_id", json!("42"))]);
        assert_ne!(number, text);
    }

    #[test]
    fn separators_inside_values_do_not_collide() {
        let joined = Fingerprint::from_fields([("a", json!("x\n\"b\":\"y\""))]);
        let split = Fingerprint::from_fields([("a", json!("x")), ("b", json!("y"))]);
        assert_ne!(joined, split);
    }

    #[test]
    fn fingerprint_is_hex_sha256() {
        let fingerprint = Fingerprint::from_fields([("message", json!("Hello"))]);
        assert_eq!(fingerprint.as_str().len(), 64);
        assert!(fingerprint.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
