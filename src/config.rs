//! Encoder configuration
//!
//! Loaded from a JSON file. Every field is optional:
//!
//! ```json
//! {
//!   "schema_validation": "ENABLED",
//!   "log_events": true,
//!   "log_level": "INFO",
//!   "schema_table_dir": "/var/lib/cells/schemas"
//! }
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell::SchemaValidation;
use crate::observability::{log_event, Event, Logger, Severity};
use crate::schema_table::{LocalSchemaTable, SchemaTableError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to open schema table: {0}")]
    SchemaTable(#[from] SchemaTableError),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "CELL_CONFIG_IO",
            ConfigError::Parse(_) => "CELL_CONFIG_PARSE",
            ConfigError::InvalidValue { .. } => "CELL_CONFIG_INVALID_VALUE",
            ConfigError::SchemaTable(_) => "CELL_CONFIG_SCHEMA_TABLE",
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Process-wide validation override: DISABLED, LEGACY_PRIMITIVE_ONLY
    /// (or SCHEMA_1_0) or ENABLED
    #[serde(default = "default_schema_validation")]
    pub schema_validation: String,

    /// Whether encoders log their lifecycle and rejections
    #[serde(default = "default_log_events")]
    pub log_events: bool,

    /// Minimum log severity
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory of the local schema table; in-memory when absent
    #[serde(default)]
    pub schema_table_dir: Option<String>,
}

fn default_schema_validation() -> String {
    "ENABLED".to_string()
}

fn default_log_events() -> bool {
    true
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            schema_validation: default_schema_validation(),
            log_events: default_log_events(),
            log_level: default_log_level(),
            schema_table_dir: None,
        }
    }
}

impl EncoderConfig {
    /// Loads and validates the configuration at `path`.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_json(&content)?;

        if config.log_events {
            log_event(
                Event::ConfigLoaded,
                &[
                    ("path", &path.display().to_string()),
                    ("schema_validation", &config.schema_validation),
                ],
            );
        }
        Ok(config)
    }

    /// Parses and validates a configuration document.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: EncoderConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.validation()?;
        self.log_level()?;
        if let Some(dir) = &self.schema_table_dir {
            if dir.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "schema_table_dir",
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn validation(&self) -> ConfigResult<SchemaValidation> {
        self.schema_validation
            .parse()
            .map_err(|e: crate::cell::EncodeError| ConfigError::InvalidValue {
                field: "schema_validation",
                reason: e.to_string(),
            })
    }

    pub fn log_level(&self) -> ConfigResult<Severity> {
        self.log_level
            .parse()
            .map_err(|reason| ConfigError::InvalidValue {
                field: "log_level",
                reason,
            })
    }

    /// Sets the process-wide minimum log severity.
    pub fn apply_log_level(&self) -> ConfigResult<()> {
        Logger::set_min_severity(self.log_level()?);
        Ok(())
    }

    /// Opens the configured schema table, logging its events only when
    /// `log_events` is set.
    pub fn open_schema_table(&self) -> ConfigResult<Arc<LocalSchemaTable>> {
        let table = match &self.schema_table_dir {
            Some(dir) => LocalSchemaTable::open_with_log_events(dir, self.log_events)?,
            None => LocalSchemaTable::in_memory().with_log_events(self.log_events),
        };
        Ok(Arc::new(table))
    }
}
