//! Schema table error types

use thiserror::Error;

use super::SchemaHash;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaTableError {
    #[error("No schema with ID {0} in schema table")]
    SchemaIdNotFound(u64),

    #[error("No schema with hash {0} in schema table")]
    SchemaHashNotFound(SchemaHash),

    #[error("Schema table I/O error on '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Corrupt schema table entry '{path}': {reason}")]
    Corrupt { path: String, reason: String },
}

impl SchemaTableError {
    pub fn code(&self) -> &'static str {
        match self {
            SchemaTableError::SchemaIdNotFound(_) => "CELL_SCHEMA_TABLE_ID_NOT_FOUND",
            SchemaTableError::SchemaHashNotFound(_) => "CELL_SCHEMA_TABLE_HASH_NOT_FOUND",
            SchemaTableError::Io { .. } => "CELL_SCHEMA_TABLE_IO",
            SchemaTableError::Corrupt { .. } => "CELL_SCHEMA_TABLE_CORRUPT",
        }
    }

    /// True for lookups of unknown entries
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SchemaTableError::SchemaIdNotFound(_) | SchemaTableError::SchemaHashNotFound(_)
        )
    }

    pub(crate) fn io(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        SchemaTableError::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn corrupt(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaTableError::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type SchemaTableResult<T> = Result<T, SchemaTableError>;
