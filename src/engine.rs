//! Pluggable JSON Schema engine
//!
//! The registry and validator depend only on the [`SchemaEngine`] and
//! [`CompiledSchema`] traits, so the underlying JSON Schema implementation can
//! be swapped without touching either. [`JsonSchemaEngine`] is the default
//! implementation, backed by the `jsonschema` crate.

use jsonschema::{Draft, JSONSchema};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// A single schema violation reported for a document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Violation {
    /// Location of the offending value within the document (JSON pointer)
    pub location: String,
    /// Human-readable description of the violation
    pub message: String,
}

impl Violation {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// An executable, immutable form of a schema document
pub trait CompiledSchema: Send + Sync {
    /// Check a document against this schema, returning one violation per
    /// failed constraint. An empty result means the document conforms.
    fn check(&self, document: &serde_json::Value) -> Vec<Violation>;
}

/// Compiles raw schema documents into executable validators
pub trait SchemaEngine: Send + Sync {
    fn compile(&self, document: &serde_json::Value) -> Result<Box<dyn CompiledSchema>>;
}

/// Default engine backed by the `jsonschema` crate (draft-07)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaEngine;

impl SchemaEngine for JsonSchemaEngine {
    fn compile(&self, document: &serde_json::Value) -> Result<Box<dyn CompiledSchema>> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(document)
            .map_err(|e| Error::SchemaCompile {
                detail: e.to_string(),
            })?;
        Ok(Box::new(CompiledJsonSchema { inner: compiled }))
    }
}

struct CompiledJsonSchema {
    inner: JSONSchema,
}

impl CompiledSchema for CompiledJsonSchema {
    fn check(&self, document: &serde_json::Value) -> Vec<Violation> {
        match self.inner.validate(document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|e| {
                    let pointer = e.instance_path.to_string();
                    let location = if pointer.is_empty() {
                        "#".to_string()
                    } else {
                        pointer
                    };
                    Violation::new(location, e.to_string())
                })
                .collect(),
        }
    }
}
