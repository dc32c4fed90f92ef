//! Writer schema resolution
//!
//! Self-describing values report their own schema. Primitive values map to
//! process-wide primitive schemas, so resolving two ints yields the same
//! schema handle and the writer cache hits.

use std::sync::OnceLock;

use crate::schema::Schema;
use crate::value::Value;

use super::errors::{EncodeError, EncodeResult};

struct PrimitiveSchemas {
    boolean: Schema,
    int: Schema,
    long: Schema,
    float: Schema,
    double: Schema,
    string: Schema,
    bytes: Schema,
}

fn primitives() -> &'static PrimitiveSchemas {
    static PRIMITIVES: OnceLock<PrimitiveSchemas> = OnceLock::new();
    PRIMITIVES.get_or_init(|| PrimitiveSchemas {
        boolean: Schema::boolean(),
        int: Schema::int(),
        long: Schema::long(),
        float: Schema::float(),
        double: Schema::double(),
        string: Schema::string(),
        bytes: Schema::bytes(),
    })
}

/// Returns the writer schema of `value`.
///
/// Null, bare arrays and bare maps have no writer schema of their own.
pub fn writer_schema(value: &Value) -> EncodeResult<Schema> {
    if let Some(schema) = value.schema() {
        return Ok(schema.clone());
    }
    let p = primitives();
    let schema = match value {
        Value::Boolean(_) => &p.boolean,
        Value::Int(_) => &p.int,
        Value::Long(_) => &p.long,
        Value::Float(_) => &p.float,
        Value::Double(_) => &p.double,
        Value::String(_) => &p.string,
        Value::Bytes(_) => &p.bytes,
        other => {
            return Err(EncodeError::Resolution {
                value_type: other.type_name(),
            })
        }
    };
    Ok(schema.clone())
}

/// Writer schema under legacy rules: a self-describing value keeps its own
/// schema, anything else is written with the column's reader schema.
pub fn legacy_writer_schema(value: &Value, reader_schema: &Schema) -> Schema {
    value
        .schema()
        .unwrap_or(reader_schema)
        .clone()
}
