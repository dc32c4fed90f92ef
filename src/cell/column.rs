//! Per-column cell configuration
//!
//! A [`CellSpec`] is immutable once built and is bound to exactly one
//! encoder. It can be built in code or from a JSON [`CellSchemaDesc`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{Schema, SchemaResult};

/// How the writer schema is identified in front of the value bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaStorage {
    /// 16-byte content hash of the writer schema
    Hash,
    /// Varint-encoded schema table ID
    Uid,
    /// Nothing; the writer schema is always the reader schema
    Final,
}

impl SchemaStorage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaStorage::Hash => "HASH",
            SchemaStorage::Uid => "UID",
            SchemaStorage::Final => "FINAL",
        }
    }
}

impl fmt::Display for SchemaStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Column-level writer schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvroValidationPolicy {
    /// No validation
    None,
    /// Writer schema must be one of the column's registered writers
    Strict,
    /// Primitives are written with the reader schema; no registration check
    #[default]
    #[serde(alias = "SCHEMA_1_0")]
    LegacyPrimitiveOnly,
    /// Reserved; always rejected
    Developer,
}

impl AvroValidationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvroValidationPolicy::None => "NONE",
            AvroValidationPolicy::Strict => "STRICT",
            AvroValidationPolicy::LegacyPrimitiveOnly => "LEGACY_PRIMITIVE_ONLY",
            AvroValidationPolicy::Developer => "DEVELOPER",
        }
    }
}

impl fmt::Display for AvroValidationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable configuration of one column's cells.
#[derive(Debug, Clone)]
pub struct CellSpec {
    reader_schema: Schema,
    storage: SchemaStorage,
    validation_policy: AvroValidationPolicy,
    writer_uids: Option<Vec<u64>>,
}

impl CellSpec {
    /// Creates a cell spec with the default validation policy and no registered
    /// writers.
    pub fn new(reader_schema: Schema, storage: SchemaStorage) -> Self {
        Self {
            reader_schema,
            storage,
            validation_policy: AvroValidationPolicy::default(),
            writer_uids: None,
        }
    }

    pub fn with_validation_policy(mut self, policy: AvroValidationPolicy) -> Self {
        self.validation_policy = policy;
        self
    }

    /// Registers the schema table IDs of the writer schemas accepted under
    /// [`AvroValidationPolicy::Strict`].
    pub fn with_writers(mut self, uids: impl IntoIterator<Item = u64>) -> Self {
        self.writer_uids = Some(uids.into_iter().collect());
        self
    }

    /// Builds a cell spec from a JSON descriptor.
    pub fn from_desc(desc: &CellSchemaDesc) -> SchemaResult<Self> {
        let reader_schema = Schema::from_json_value(&desc.reader)?;
        Ok(Self {
            reader_schema,
            storage: desc.storage,
            validation_policy: desc.avro_validation_policy,
            writer_uids: desc.writers.clone(),
        })
    }

    pub fn reader_schema(&self) -> &Schema {
        &self.reader_schema
    }

    pub fn storage(&self) -> SchemaStorage {
        self.storage
    }

    pub fn validation_policy(&self) -> AvroValidationPolicy {
        self.validation_policy
    }

    /// Registered writer IDs; `None` when no constraint is configured.
    pub fn writer_uids(&self) -> Option<&[u64]> {
        self.writer_uids.as_deref()
    }

    pub fn is_final(&self) -> bool {
        self.storage == SchemaStorage::Final
    }
}

/// JSON descriptor of a column's cell schema.
///
/// ```json
/// {
///   "storage": "UID",
///   "avro_validation_policy": "STRICT",
///   "writers": [0, 3],
///   "reader": "int"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSchemaDesc {
    pub storage: SchemaStorage,

    #[serde(default)]
    pub avro_validation_policy: AvroValidationPolicy,

    /// Registered writer schema IDs (optional)
    #[serde(default)]
    pub writers: Option<Vec<u64>>,

    /// Reader schema in JSON form
    pub reader: serde_json::Value,
}

impl CellSchemaDesc {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_defaults() {
        let spec = CellSpec::new(Schema::int(), SchemaStorage::Uid);
        assert_eq!(spec.validation_policy(), AvroValidationPolicy::LegacyPrimitiveOnly);
        assert_eq!(spec.writer_uids(), None);
        assert!(!spec.is_final());
    }

    #[test]
    fn test_spec_builders() {
        let spec = CellSpec::new(Schema::string(), SchemaStorage::Final)
            .with_validation_policy(AvroValidationPolicy::Strict)
            .with_writers([1, 2]);
        assert!(spec.is_final());
        assert_eq!(spec.validation_policy(), AvroValidationPolicy::Strict);
        assert_eq!(spec.writer_uids(), Some(&[1, 2][..]));
    }

    #[test]
    fn test_desc_from_json() {
        let desc = CellSchemaDesc::from_json(
            r#"{"storage": "HASH", "avro_validation_policy": "STRICT", "writers": [4], "reader": "long"}"#,
        )
        .unwrap();
        let spec = CellSpec::from_desc(&desc).unwrap();
        assert_eq!(spec.storage(), SchemaStorage::Hash);
        assert_eq!(spec.validation_policy(), AvroValidationPolicy::Strict);
        assert_eq!(spec.writer_uids(), Some(&[4][..]));
        assert_eq!(spec.reader_schema(), &Schema::long());
    }

    #[test]
    fn test_desc_defaults_and_legacy_alias() {
        let desc = CellSchemaDesc::from_json(r#"{"storage": "FINAL", "reader": "string"}"#).unwrap();
        assert_eq!(desc.avro_validation_policy, AvroValidationPolicy::LegacyPrimitiveOnly);
        assert_eq!(desc.writers, None);

        let desc = CellSchemaDesc::from_json(
            r#"{"storage": "UID", "avro_validation_policy": "SCHEMA_1_0", "reader": "int"}"#,
        )
        .unwrap();
        assert_eq!(desc.avro_validation_policy, AvroValidationPolicy::LegacyPrimitiveOnly);
    }

    #[test]
    fn test_desc_rejects_unknown_storage() {
        assert!(CellSchemaDesc::from_json(r#"{"storage": "INLINE", "reader": "int"}"#).is_err());
    }

    #[test]
    fn test_desc_with_bad_reader_schema() {
        let desc = CellSchemaDesc::from_json(r#"{"storage": "UID", "reader": "integer"}"#).unwrap();
        assert!(CellSpec::from_desc(&desc).is_err());
    }
}
