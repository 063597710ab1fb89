//! Genometa Metadata Core
//!
//! Schema registry, payload validator, and info-search query compiler for a
//! genomic analysis metadata service. Submitted analysis payloads must
//! conform to one of the registered, independently-versioned JSON Schemas
//! before being accepted, and the per-entity "info" JSON extension blobs are
//! searched through compiled, conjunctive regex queries.
//!
//! ## Features
//!
//! - **Schema Registry**: boot-time registration of bundled (and configured)
//!   JSON Schema documents, keyed by the id derived from each document's
//!   declared identifier
//! - **Pluggable Engine**: validation runs through the [`SchemaEngine`]
//!   capability trait; the default implementation wraps the `jsonschema` crate
//! - **Validation As Data**: non-conforming payloads yield a
//!   [`ValidationResult`] carrying the violation set, never an error
//! - **Search Query Compiler**: dotted-path/pattern terms compile
//!   deterministically into a PostgreSQL fragment over the `info` JSON column
//!
//! ## Flow
//!
//! ```text
//! submission ──> Validator::validate(schema_id, payload) ──> ValidationResult
//!                      │
//!                      └── Arc<SchemaRegistry> (frozen at boot)
//!
//! search terms ──> SearchQueryBuilder::add(key, pattern)* ──> build()
//!                                                             └─> SQL fragment
//! ```

pub mod checksum;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod search;
pub mod validator;

pub use checksum::Checksum;
pub use config::Settings;
pub use engine::{CompiledSchema, JsonSchemaEngine, SchemaEngine, Violation};
pub use error::{Error, Result};
pub use registry::{SchemaRecord, SchemaRegistry};
pub use search::{BoundQuery, SearchQueryBuilder, SearchTerm, ANALYSIS_ID_TYPE};
pub use validator::{ValidationResult, Validator};
