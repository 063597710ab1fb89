//! Payload validation against registered schemas
//!
//! A [`Validator`] resolves a schema id in the shared registry and runs the
//! compiled schema over a candidate payload. Non-conformance is an expected
//! outcome and is returned as data ([`ValidationResult`] with violations),
//! never as an error; only an unknown schema id is an error, since that means
//! the service is misconfigured rather than the submitter's payload being bad.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::engine::Violation;
use crate::error::Result;
use crate::registry::SchemaRegistry;

/// Separator used when flattening violations into a single log line
const ERROR_SEPARATOR: &str = "|";

/// Aggregate outcome of validating one or more documents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: BTreeSet<String>,
}

impl ValidationResult {
    /// A result with no violations
    pub fn ok() -> Self {
        Self::default()
    }

    /// Build a result from engine violations
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            errors: violations.iter().map(Violation::to_string).collect(),
        }
    }

    /// Validity is derived: true exactly when the error set is empty
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The violation messages, as a set
    pub fn errors(&self) -> &BTreeSet<String> {
        &self.errors
    }

    /// Union this result with another; the merged result is valid only if
    /// both inputs were valid.
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self
    }

    /// Pipe-joined flattening of the violation messages, for logs
    pub fn error_report(&self) -> String {
        self.errors
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(ERROR_SEPARATOR)
    }
}

/// Validates payloads against schemas held in a shared registry
#[derive(Clone)]
pub struct Validator {
    registry: Arc<SchemaRegistry>,
}

impl Validator {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Validate a payload against the schema registered under `schema_id`.
    ///
    /// Returns `Err(SchemaNotFound)` only when the id is unknown; a payload
    /// that does not conform yields `Ok` with an invalid result.
    pub fn validate(
        &self,
        schema_id: &str,
        payload: &serde_json::Value,
    ) -> Result<ValidationResult> {
        let record = self.registry.get(schema_id)?;
        let result = ValidationResult::from_violations(record.compiled.check(payload));

        if result.is_valid() {
            tracing::debug!(schema_id, "payload conforms to schema");
        } else {
            tracing::warn!(
                schema_id,
                errors = %result.error_report(),
                "payload failed schema validation"
            );
        }
        Ok(result)
    }
}
