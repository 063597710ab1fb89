//! Schema Registry
//!
//! Process-wide, read-mostly store mapping schema ids to compiled schemas.
//! Populated once at boot from the bundled analysis-type documents (plus any
//! configured extras), then frozen and shared behind an `Arc`; `get`/`ids`
//! never take a lock. Swapping in updated schemas means building a fresh
//! registry and replacing the `Arc` at the service boundary.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::checksum::Checksum;
use crate::engine::{CompiledSchema, JsonSchemaEngine, SchemaEngine};
use crate::error::{Error, Result};

/// Bundled schema document for sequencing read analyses
pub const SEQUENCING_READ_SCHEMA: &str = include_str!("../schemas/sequencing-read.json");

/// Bundled schema document for variant call analyses
pub const VARIANT_CALL_SCHEMA: &str = include_str!("../schemas/variant-call.json");

/// An immutable registered schema
pub struct SchemaRecord {
    /// Registry key, derived from the document's declared identifier
    pub id: String,
    /// The raw schema document as registered
    pub document: serde_json::Value,
    /// Executable form of the document
    pub compiled: Box<dyn CompiledSchema>,
    /// SHA256 fingerprint of the raw document
    pub checksum: Checksum,
    /// When this record was registered
    pub registered_at: DateTime<Utc>,
    /// Whether this schema is excluded from external listing
    pub hidden: bool,
}

impl fmt::Debug for SchemaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRecord")
            .field("id", &self.id)
            .field("checksum", &self.checksum)
            .field("registered_at", &self.registered_at)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

/// The schema registry
pub struct SchemaRegistry {
    engine: Box<dyn SchemaEngine>,
    records: HashMap<String, SchemaRecord>,
}

impl SchemaRegistry {
    /// Create an empty registry backed by the default `jsonschema` engine
    pub fn new() -> Self {
        Self::with_engine(Box::new(JsonSchemaEngine))
    }

    /// Create an empty registry backed by a custom engine
    pub fn with_engine(engine: Box<dyn SchemaEngine>) -> Self {
        Self {
            engine,
            records: HashMap::new(),
        }
    }

    /// Create a registry pre-populated with the bundled analysis-type schemas
    pub fn bundled() -> Result<Self> {
        let mut registry = Self::new();
        for raw in [SEQUENCING_READ_SCHEMA, VARIANT_CALL_SCHEMA] {
            let document: serde_json::Value = serde_json::from_str(raw)?;
            registry.register(document)?;
        }
        Ok(registry)
    }

    /// Register a schema document, deriving its id from the declared
    /// identifier field (the segment after the last `/`).
    pub fn register(&mut self, document: serde_json::Value) -> Result<String> {
        self.register_record(document, false)
    }

    /// Register a schema document that should be excluded from listing
    pub fn register_hidden(&mut self, document: serde_json::Value) -> Result<String> {
        self.register_record(document, true)
    }

    /// Register a schema document read from a file
    pub fn register_file(&mut self, path: impl AsRef<Path>) -> Result<String> {
        let content = fs::read_to_string(path.as_ref())?;
        let document: serde_json::Value = serde_json::from_str(&content)?;
        self.register(document)
    }

    fn register_record(&mut self, document: serde_json::Value, hidden: bool) -> Result<String> {
        let id = derive_schema_id(&document)?;
        if self.records.contains_key(&id) {
            return Err(Error::DuplicateSchemaId { id });
        }

        let compiled = self.engine.compile(&document)?;
        let checksum = Checksum::from_json(&document);
        tracing::debug!(schema_id = %id, checksum = %checksum, "registered schema");

        self.records.insert(
            id.clone(),
            SchemaRecord {
                id: id.clone(),
                document,
                compiled,
                checksum,
                registered_at: Utc::now(),
                hidden,
            },
        );
        Ok(id)
    }

    /// Look up a schema by id
    pub fn get(&self, id: &str) -> Result<&SchemaRecord> {
        self.records.get(id).ok_or_else(|| Error::SchemaNotFound {
            id: id.to_string(),
        })
    }

    /// Whether a schema id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Listable schema ids (hidden schemas excluded), sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self
            .records
            .values()
            .filter(|r| !r.hidden)
            .map(|r| r.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// All schema ids, including hidden ones, sorted
    pub fn all_ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.records.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered schemas
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the registry key from a schema document's self-declared identifier:
/// the substring after the last `/` of its `$id` (or legacy `id`) field.
fn derive_schema_id(document: &serde_json::Value) -> Result<String> {
    let declared = document
        .get("$id")
        .or_else(|| document.get("id"))
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| Error::malformed_schema_id("document has no string '$id' or 'id' field"))?;

    let (_, tail) = declared.rsplit_once('/').ok_or_else(|| {
        Error::malformed_schema_id(format!("identifier '{}' has no '/' separator", declared))
    })?;

    if tail.is_empty() {
        return Err(Error::malformed_schema_id(format!(
            "identifier '{}' ends with '/'",
            declared
        )));
    }
    Ok(tail.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_schema(id: &str) -> serde_json::Value {
        serde_json::json!({
            "$id": format!("https://example.org/schemas/{}", id),
            "type": "object",
            "properties": {
                "name": { "type": "string" }
            }
        })
    }

    #[test]
    fn test_register_and_get_round_trip() {
        let mut registry = SchemaRegistry::new();
        let id = registry.register(minimal_schema("testSchema")).unwrap();
        assert_eq!(id, "testSchema");

        let record = registry.get("testSchema").unwrap();
        assert_eq!(record.id, "testSchema");
        assert!(record.checksum.verify_json(&record.document));
        assert!(record
            .compiled
            .check(&serde_json::json!({"name": "x"}))
            .is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register(minimal_schema("dup")).unwrap();
        let err = registry.register(minimal_schema("dup")).unwrap_err();
        assert!(matches!(err, Error::DuplicateSchemaId { id } if id == "dup"));
    }

    #[test]
    fn test_missing_identifier_field_rejected() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .register(serde_json::json!({"type": "object"}))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedSchemaId { .. }));
    }

    #[test]
    fn test_identifier_without_separator_rejected() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .register(serde_json::json!({"$id": "noSeparator", "type": "object"}))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedSchemaId { .. }));
    }

    #[test]
    fn test_legacy_id_field_accepted() {
        let mut registry = SchemaRegistry::new();
        let id = registry
            .register(serde_json::json!({
                "id": "https://example.org/schemas/legacy",
                "type": "object"
            }))
            .unwrap();
        assert_eq!(id, "legacy");
    }

    #[test]
    fn test_hidden_schemas_excluded_from_listing() {
        let mut registry = SchemaRegistry::new();
        registry.register(minimal_schema("visible")).unwrap();
        registry
            .register_hidden(minimal_schema("internal"))
            .unwrap();

        assert_eq!(registry.ids(), vec!["visible"]);
        assert_eq!(registry.all_ids(), vec!["internal", "visible"]);
        assert!(registry.contains("internal"));
    }

    #[test]
    fn test_bundled_registry() {
        let registry = SchemaRegistry::bundled().unwrap();
        assert_eq!(registry.ids(), vec!["sequencingRead", "variantCall"]);
    }

    #[test]
    fn test_register_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(
            &path,
            serde_json::to_string_pretty(&minimal_schema("custom")).unwrap(),
        )
        .unwrap();

        let mut registry = SchemaRegistry::new();
        let id = registry.register_file(&path).unwrap();
        assert_eq!(id, "custom");
    }
}
