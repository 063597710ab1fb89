//! Configuration for the metadata core
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (genometa.toml)
//! - Environment variables (GENOMETA_*)
//!
//! ## Example config file (genometa.toml):
//! ```toml
//! [registry]
//! schema_paths = ["schemas/custom-analysis.json"]
//! hidden = ["legacyAnalysis"]
//!
//! [log]
//! filter = "genometa=debug"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::registry::SchemaRegistry;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistrySettings,

    /// Logging settings
    #[serde(default)]
    pub log: LogSettings,
}

/// Registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// Additional schema documents to register at boot, beyond the bundled set
    #[serde(default)]
    pub schema_paths: Vec<PathBuf>,

    /// Schema ids to exclude from external listing
    #[serde(default)]
    pub hidden: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// Tracing env-filter directive
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Settings {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally from a specific file
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name("genometa").required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("GENOMETA")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Build the boot registry: the bundled analysis-type schemas plus any
    /// configured extras, with configured ids registered as hidden.
    pub fn build_registry(&self) -> Result<SchemaRegistry> {
        let mut registry = SchemaRegistry::bundled()?;
        for path in &self.registry.schema_paths {
            let content = std::fs::read_to_string(path)?;
            let document: serde_json::Value = serde_json::from_str(&content)?;
            if should_hide(&document, &self.registry.hidden) {
                registry.register_hidden(document)?;
            } else {
                registry.register(document)?;
            }
        }
        Ok(registry)
    }
}

fn should_hide(document: &serde_json::Value, hidden: &[String]) -> bool {
    document
        .get("$id")
        .or_else(|| document.get("id"))
        .and_then(serde_json::Value::as_str)
        .and_then(|declared| declared.rsplit_once('/'))
        .map(|(_, tail)| hidden.iter().any(|h| h == tail))
        .unwrap_or(false)
}
