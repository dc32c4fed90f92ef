//! Binary value encoding
//!
//! [`binary`] holds the primitive wire encodings; [`DatumWriter`] walks a
//! value against its writer schema and emits the value bytes of a cell.

pub mod binary;
mod datum_writer;
mod errors;

pub use binary::{encode_varint_u64, write_varint_u64, zigzag_encode, BinaryEncoder};
pub use datum_writer::DatumWriter;
pub use errors::{SerializationError, SerializationResult};
