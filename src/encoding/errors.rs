//! Serialization error types

use thiserror::Error;

/// A value did not conform to the schema it was written against.
///
/// `path` locates the offending value: `$` is the root, `$.field` a record
/// field, `$[3]` an array item and `${key}` a map value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializationError {
    #[error("Type mismatch at '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Unknown symbol '{symbol}' at '{path}' for enum {name}")]
    UnknownSymbol {
        path: String,
        name: String,
        symbol: String,
    },

    #[error("Size mismatch at '{path}': fixed {name} expects {expected} bytes, got {actual}")]
    FixedSize {
        path: String,
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Undeclared field '{field}' at '{path}' for record {record}")]
    UndeclaredField {
        path: String,
        record: String,
        field: String,
    },

    #[error("No branch of union at '{path}' accepts a value of type {actual}")]
    NoUnionBranch { path: String, actual: String },
}

impl SerializationError {
    pub fn code(&self) -> &'static str {
        match self {
            SerializationError::TypeMismatch { .. } => "CELL_SERIALIZATION_TYPE_MISMATCH",
            SerializationError::UnknownSymbol { .. } => "CELL_SERIALIZATION_UNKNOWN_SYMBOL",
            SerializationError::FixedSize { .. } => "CELL_SERIALIZATION_FIXED_SIZE",
            SerializationError::UndeclaredField { .. } => "CELL_SERIALIZATION_UNDECLARED_FIELD",
            SerializationError::NoUnionBranch { .. } => "CELL_SERIALIZATION_NO_UNION_BRANCH",
        }
    }

    /// Path of the offending value
    pub fn path(&self) -> &str {
        match self {
            SerializationError::TypeMismatch { path, .. }
            | SerializationError::UnknownSymbol { path, .. }
            | SerializationError::FixedSize { path, .. }
            | SerializationError::UndeclaredField { path, .. }
            | SerializationError::NoUnionBranch { path, .. } => path,
        }
    }

    pub(crate) fn type_mismatch(
        path: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        SerializationError::TypeMismatch {
            path: path.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Result type for serialization
pub type SerializationResult<T> = Result<T, SerializationError>;
