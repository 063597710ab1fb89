//! Checksum utilities for schema document fingerprinting

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA256 fingerprint of a schema document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from a string
    pub fn from_content(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Compute checksum from a JSON value (canonicalized)
    pub fn from_json(value: &serde_json::Value) -> Self {
        // Compact serialization is stable for a given value
        let canonical = serde_json::to_string(value).unwrap_or_default();
        Self::from_content(&canonical)
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that a JSON value matches this checksum
    pub fn verify_json(&self, value: &serde_json::Value) -> bool {
        let computed = Self::from_json(value);
        self.0 == computed.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Checksum {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let doc = serde_json::json!({"$id": "https://example.org/schemas/test"});
        let checksum1 = Checksum::from_json(&doc);
        let checksum2 = Checksum::from_json(&doc);
        assert_eq!(checksum1, checksum2);
    }

    #[test]
    fn test_checksum_different_content() {
        let doc1 = serde_json::json!({"type": "object"});
        let doc2 = serde_json::json!({"type": "string"});
        assert_ne!(Checksum::from_json(&doc1), Checksum::from_json(&doc2));
    }

    #[test]
    fn test_checksum_verification() {
        let doc = serde_json::json!({"type": "object"});
        let checksum = Checksum::from_json(&doc);
        assert!(checksum.verify_json(&doc));
        assert!(!checksum.verify_json(&serde_json::json!({"type": "array"})));
    }
}
