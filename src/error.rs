//! Error types for the metadata core

use thiserror::Error;

/// Result type for registry, validation, and search operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the schema registry and search query compiler
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed schema id: {detail}")]
    MalformedSchemaId { detail: String },

    #[error("Duplicate schema id: {id}")]
    DuplicateSchemaId { id: String },

    #[error("Schema not found: {id}")]
    SchemaNotFound { id: String },

    #[error("Invalid search term: {detail}")]
    InvalidSearchTerm { detail: String },

    #[error("Schema failed to compile: {detail}")]
    SchemaCompile { detail: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl Error {
    pub(crate) fn malformed_schema_id(detail: impl Into<String>) -> Self {
        Error::MalformedSchemaId {
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid_search_term(detail: impl Into<String>) -> Self {
        Error::InvalidSearchTerm {
            detail: detail.into(),
        }
    }
}
