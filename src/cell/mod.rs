//! Cell encoding
//!
//! A [`ColumnEncoder`] turns values into cell bytes:
//!
//! ```text
//! [ schema identifier ][ value bytes ]
//! ```
//!
//! The identifier is a 16-byte schema hash, a varint schema ID, or nothing
//! for final columns, as selected by the column's [`SchemaStorage`].

mod column;
mod encoder;
mod errors;
mod factory;
mod resolver;
mod schema_encoder;
mod validation;
mod writer_cache;

pub use column::{AvroValidationPolicy, CellSchemaDesc, CellSpec, SchemaStorage};
pub use encoder::{CellEncoder, ColumnEncoder, DecodedCell, EncoderOptions};
pub use errors::{EncodeError, EncodeResult};
pub use factory::CellEncoderFactory;
pub use resolver::{legacy_writer_schema, writer_schema};
pub use schema_encoder::SchemaEncoder;
pub use validation::{resolve_policy, SchemaValidation, ValidationOverride};
pub use writer_cache::WriterCache;
