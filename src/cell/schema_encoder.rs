//! Writer schema embedding
//!
//! Chosen once per encoder from the column's storage mode.

use crate::encoding::write_varint_u64;
use crate::schema::Schema;
use crate::schema_table::SchemaTable;

use super::column::SchemaStorage;
use super::errors::EncodeResult;

/// Writes the bytes identifying the writer schema in front of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaEncoder {
    /// Raw schema hash bytes
    Hash,
    /// Unsigned varint schema ID
    Id,
    /// Nothing
    Final,
}

impl SchemaEncoder {
    pub fn for_storage(storage: SchemaStorage) -> Self {
        match storage {
            SchemaStorage::Hash => SchemaEncoder::Hash,
            SchemaStorage::Uid => SchemaEncoder::Id,
            SchemaStorage::Final => SchemaEncoder::Final,
        }
    }

    /// Appends the identifier of `schema` to `out`, registering the schema in
    /// `table` if it is new.
    pub fn encode(
        &self,
        table: &dyn SchemaTable,
        schema: &Schema,
        out: &mut Vec<u8>,
    ) -> EncodeResult<()> {
        match self {
            SchemaEncoder::Hash => {
                let hash = table.get_or_create_schema_hash(schema)?;
                out.extend_from_slice(hash.as_bytes());
            }
            SchemaEncoder::Id => {
                let id = table.get_or_create_schema_id(schema)?;
                write_varint_u64(out, id);
            }
            SchemaEncoder::Final => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_table::{LocalSchemaTable, SchemaHash};

    #[test]
    fn test_for_storage() {
        assert_eq!(SchemaEncoder::for_storage(SchemaStorage::Hash), SchemaEncoder::Hash);
        assert_eq!(SchemaEncoder::for_storage(SchemaStorage::Uid), SchemaEncoder::Id);
        assert_eq!(SchemaEncoder::for_storage(SchemaStorage::Final), SchemaEncoder::Final);
    }

    #[test]
    fn test_hash_writes_sixteen_bytes() {
        let table = LocalSchemaTable::in_memory();
        let mut out = Vec::new();
        SchemaEncoder::Hash.encode(&table, &Schema::int(), &mut out).unwrap();
        assert_eq!(out, SchemaHash::of(&Schema::int()).as_bytes().to_vec());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_id_writes_varint() {
        let table = LocalSchemaTable::in_memory();
        for i in 0..200u32 {
            let schema = Schema::fixed(format!("F{}", i), 1).unwrap();
            table.get_or_create_schema_id(&schema).unwrap();
        }
        let mut out = Vec::new();
        SchemaEncoder::Id.encode(&table, &Schema::int(), &mut out).unwrap();
        // ID 200 needs two bytes
        assert_eq!(out, vec![0xC8, 0x01]);
    }

    #[test]
    fn test_final_writes_nothing() {
        let table = LocalSchemaTable::in_memory();
        let mut out = Vec::new();
        SchemaEncoder::Final.encode(&table, &Schema::int(), &mut out).unwrap();
        assert!(out.is_empty());
        assert!(table.is_empty());
    }
}
