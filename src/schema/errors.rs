//! Schema error types
//!
//! Error codes:
//! - CELL_SCHEMA_INVALID_JSON
//! - CELL_SCHEMA_UNKNOWN_TYPE
//! - CELL_SCHEMA_MISSING_ATTRIBUTE
//! - CELL_SCHEMA_INVALID_ATTRIBUTE
//! - CELL_SCHEMA_INVALID_NAME
//! - CELL_SCHEMA_DUPLICATE_NAME
//! - CELL_SCHEMA_DUPLICATE_FIELD
//! - CELL_SCHEMA_INVALID_UNION

use thiserror::Error;

/// Errors raised while building or parsing a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Invalid schema JSON: {0}")]
    InvalidJson(String),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Missing attribute '{attribute}' in {context}")]
    MissingAttribute { attribute: String, context: String },

    #[error("Invalid attribute '{attribute}': {reason}")]
    InvalidAttribute { attribute: String, reason: String },

    #[error("Invalid name: '{0}'")]
    InvalidName(String),

    #[error("Named type redefined: {0}")]
    DuplicateName(String),

    #[error("Duplicate field '{field}' in record {record}")]
    DuplicateField { record: String, field: String },

    #[error("Invalid union: {0}")]
    InvalidUnion(String),
}

impl SchemaError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::InvalidJson(_) => "CELL_SCHEMA_INVALID_JSON",
            SchemaError::UnknownType(_) => "CELL_SCHEMA_UNKNOWN_TYPE",
            SchemaError::MissingAttribute { .. } => "CELL_SCHEMA_MISSING_ATTRIBUTE",
            SchemaError::InvalidAttribute { .. } => "CELL_SCHEMA_INVALID_ATTRIBUTE",
            SchemaError::InvalidName(_) => "CELL_SCHEMA_INVALID_NAME",
            SchemaError::DuplicateName(_) => "CELL_SCHEMA_DUPLICATE_NAME",
            SchemaError::DuplicateField { .. } => "CELL_SCHEMA_DUPLICATE_FIELD",
            SchemaError::InvalidUnion(_) => "CELL_SCHEMA_INVALID_UNION",
        }
    }

    pub(crate) fn missing(attribute: &str, context: impl Into<String>) -> Self {
        SchemaError::MissingAttribute {
            attribute: attribute.to_string(),
            context: context.into(),
        }
    }

    pub(crate) fn invalid(attribute: &str, reason: impl Into<String>) -> Self {
        SchemaError::InvalidAttribute {
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaError::InvalidJson("x".into()).code(), "CELL_SCHEMA_INVALID_JSON");
        assert_eq!(SchemaError::missing("name", "record").code(), "CELL_SCHEMA_MISSING_ATTRIBUTE");
        assert_eq!(SchemaError::invalid("size", "negative").code(), "CELL_SCHEMA_INVALID_ATTRIBUTE");
    }

    #[test]
    fn test_error_display() {
        let err = SchemaError::missing("fields", "record Foo");
        let display = format!("{}", err);
        assert!(display.contains("fields"));
        assert!(display.contains("record Foo"));
    }
}
