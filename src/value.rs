//! Runtime cell values
//!
//! Primitive values carry no schema; their writer schema is inferred from the
//! runtime type. Generic containers (records, enum symbols, fixed) are
//! self-describing and carry the schema they were built against.

use std::collections::BTreeMap;

use crate::schema::{Schema, SchemaKind};

/// A value that can be written to a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Bare list of items; only valid nested inside a self-describing value
    Array(Vec<Value>),
    /// Bare map; only valid nested inside a self-describing value
    Map(BTreeMap<String, Value>),
    Record(GenericRecord),
    Enum(EnumSymbol),
    Fixed(GenericFixed),
}

impl Value {
    /// Returns the schema carried by a self-describing value.
    pub fn schema(&self) -> Option<&Schema> {
        match self {
            Value::Record(record) => Some(record.schema()),
            Value::Enum(symbol) => Some(symbol.schema()),
            Value::Fixed(fixed) => Some(fixed.schema()),
            _ => None,
        }
    }

    /// Name of the runtime type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Enum(_) => "enum",
            Value::Fixed(_) => "fixed",
        }
    }
}

/// A record value bound to a record schema.
///
/// Fields not set read as [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenericRecord {
    schema: Schema,
    values: BTreeMap<String, Value>,
}

impl GenericRecord {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Sets a field value, returning the previous one.
    pub fn put(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(field.into(), value.into())
    }

    /// Builder-style [`GenericRecord::put`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Names of all fields that were explicitly set.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// An enum symbol bound to an enum schema.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSymbol {
    schema: Schema,
    symbol: String,
}

impl EnumSymbol {
    pub fn new(schema: Schema, symbol: impl Into<String>) -> Self {
        Self {
            schema,
            symbol: symbol.into(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Position of the symbol in the schema, if declared there.
    pub fn ordinal(&self) -> Option<usize> {
        match self.schema.kind() {
            SchemaKind::Enum { symbols, .. } => symbols.iter().position(|s| *s == self.symbol),
            _ => None,
        }
    }
}

/// A fixed-size byte value bound to a fixed schema.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericFixed {
    schema: Schema,
    bytes: Vec<u8>,
}

impl GenericFixed {
    pub fn new(schema: Schema, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            schema,
            bytes: bytes.into(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<GenericRecord> for Value {
    fn from(v: GenericRecord) -> Self {
        Value::Record(v)
    }
}

impl From<EnumSymbol> for Value {
    fn from(v: EnumSymbol) -> Self {
        Value::Enum(v)
    }
}

impl From<GenericFixed> for Value {
    fn from(v: GenericFixed) -> Self {
        Value::Fixed(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
