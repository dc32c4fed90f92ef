//! cellcodec - Schema-aware cell encoding for column-oriented key-value storage
//!
//! Values are written as `[schema identifier][binary value]`, where the
//! identifier comes from a shared schema table.

pub mod cell;
pub mod config;
pub mod encoding;
pub mod observability;
pub mod schema;
pub mod schema_table;
pub mod value;

pub use cell::{
    AvroValidationPolicy, CellEncoder, CellEncoderFactory, CellSpec, ColumnEncoder, DecodedCell,
    EncodeError, SchemaStorage, SchemaValidation, ValidationOverride,
};
pub use config::EncoderConfig;
pub use schema::Schema;
pub use schema_table::{LocalSchemaTable, SchemaHash, SchemaTable};
pub use value::Value;
