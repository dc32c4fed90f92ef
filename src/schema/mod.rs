//! Schema model for cell values
//!
//! Schemas are immutable once built and shared by cheap handle clones.
//!
//! # Equality
//!
//! - `==` and `Hash` are structural.
//! - [`Schema::identity`] / [`Schema::ptr_eq`] compare node identity. Caches
//!   keyed by identity treat two independently parsed copies of the same
//!   schema as distinct entries.

mod errors;
mod parser;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use parser::SchemaParser;
pub use types::{Field, Schema, SchemaIdentity, SchemaKind, SchemaType};
