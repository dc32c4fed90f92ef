//! Schema table: durable mapping between schemas, content hashes and IDs
//!
//! The cell encoder only talks to the [`SchemaTable`] trait. Implementations
//! must be safe to share between encoders and threads, and every
//! `get_or_create_*` call must be idempotent: asking twice for the same
//! schema returns the same identifier and creates at most one entry.

mod errors;
mod local;

use std::fmt;

use sha2::{Digest, Sha256};

use crate::schema::Schema;

pub use errors::{SchemaTableError, SchemaTableResult};
pub use local::{LocalSchemaTable, SchemaEntry};

/// Size in bytes of a schema hash
pub const SCHEMA_HASH_SIZE: usize = 16;

/// Fixed-size content hash of a schema.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaHash([u8; SCHEMA_HASH_SIZE]);

impl SchemaHash {
    pub fn from_bytes(bytes: [u8; SCHEMA_HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Hashes the canonical JSON form of `schema`.
    ///
    /// Structurally equal schemas always hash equal.
    pub fn of(schema: &Schema) -> Self {
        let digest = Sha256::digest(schema.to_canonical_json().as_bytes());
        let mut bytes = [0u8; SCHEMA_HASH_SIZE];
        bytes.copy_from_slice(&digest[..SCHEMA_HASH_SIZE]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SCHEMA_HASH_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != SCHEMA_HASH_SIZE * 2 || !hex.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; SCHEMA_HASH_SIZE];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(bytes))
    }
}

impl fmt::Display for SchemaHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for SchemaHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaHash({})", self.to_hex())
    }
}

/// Registry of schemas shared by all cell encoders.
pub trait SchemaTable: Send + Sync {
    /// Returns the hash of `schema`, registering it first if unknown.
    fn get_or_create_schema_hash(&self, schema: &Schema) -> SchemaTableResult<SchemaHash>;

    /// Returns the ID of `schema`, registering it first if unknown.
    fn get_or_create_schema_id(&self, schema: &Schema) -> SchemaTableResult<u64>;

    /// Looks up a schema by ID.
    fn get_schema_by_id(&self, id: u64) -> SchemaTableResult<Schema>;

    /// Looks up a schema by hash.
    fn get_schema_by_hash(&self, hash: &SchemaHash) -> SchemaTableResult<Schema>;
}
