//! Cell encoding error types
//!
//! Every failure aborts the current encode call. Nothing is retried here.

use thiserror::Error;

use crate::encoding::SerializationError;
use crate::schema_table::SchemaTableError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The value is neither self-describing nor a supported primitive
    #[error("Unable to determine a writer schema for a value of type {value_type}")]
    Resolution { value_type: &'static str },

    /// The writer schema is not registered for the column
    #[error("Writer schema is not registered for this column:\n{schema}")]
    Validation { schema: String },

    /// A final column received a value whose schema is not the reader schema
    #[error("Writer schema {writer} does not match final column reader schema {reader}")]
    SchemaMismatch { writer: String, reader: String },

    #[error("Unsupported validation policy: {policy}")]
    UnsupportedPolicy { policy: String },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] SerializationError),

    #[error("Schema table error: {0}")]
    Registry(#[from] SchemaTableError),
}

impl EncodeError {
    pub fn code(&self) -> &'static str {
        match self {
            EncodeError::Resolution { .. } => "CELL_ENCODE_RESOLUTION",
            EncodeError::Validation { .. } => "CELL_ENCODE_VALIDATION",
            EncodeError::SchemaMismatch { .. } => "CELL_ENCODE_SCHEMA_MISMATCH",
            EncodeError::UnsupportedPolicy { .. } => "CELL_ENCODE_UNSUPPORTED_POLICY",
            EncodeError::Serialization(_) => "CELL_ENCODE_SERIALIZATION",
            EncodeError::Registry(_) => "CELL_ENCODE_REGISTRY",
        }
    }

    pub(crate) fn unsupported_policy(policy: impl Into<String>) -> Self {
        EncodeError::UnsupportedPolicy {
            policy: policy.into(),
        }
    }
}

pub type EncodeResult<T> = Result<T, EncodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err = EncodeError::Resolution { value_type: "null" };
        assert_eq!(err.code(), "CELL_ENCODE_RESOLUTION");
        assert!(err.to_string().contains("null"));

        let err = EncodeError::from(SchemaTableError::SchemaIdNotFound(3));
        assert_eq!(err.code(), "CELL_ENCODE_REGISTRY");
        assert!(err.to_string().contains("ID 3"));
    }

    #[test]
    fn test_unsupported_policy_names_policy() {
        let err = EncodeError::unsupported_policy("DEVELOPER");
        assert_eq!(
            err,
            EncodeError::UnsupportedPolicy {
                policy: "DEVELOPER".to_string()
            }
        );
        assert!(err.to_string().contains("DEVELOPER"));
    }
}
