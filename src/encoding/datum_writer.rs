//! Schema-bound value serializer
//!
//! A [`DatumWriter`] is compiled once from a writer schema: record field
//! plans, enum symbol ordinals and union branch lists are precomputed so that
//! writing a value only walks the plan. The writer holds a clone of its
//! schema and never mutates it, so one writer can be shared freely.
//!
//! Numeric promotion follows the usual rules: an int value may be written
//! as long, float or double; a long as float or double; a float as double.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::schema::{Schema, SchemaKind};
use crate::value::Value;

use super::binary::BinaryEncoder;
use super::errors::{SerializationError, SerializationResult};

/// Compiled serializer for one writer schema.
#[derive(Debug)]
pub struct DatumWriter {
    schema: Schema,
    root: WriterNode,
}

#[derive(Debug)]
enum WriterNode {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record {
        name: String,
        fields: Vec<(String, WriterNode)>,
        declared: HashSet<String>,
    },
    Enum {
        name: String,
        ordinals: HashMap<String, usize>,
    },
    Array(Box<WriterNode>),
    Map(Box<WriterNode>),
    Union(Vec<WriterNode>),
    Fixed {
        name: String,
        size: usize,
    },
}

impl DatumWriter {
    /// Compiles a writer for `schema`.
    pub fn new(schema: Schema) -> Self {
        let root = WriterNode::compile(&schema);
        Self { schema, root }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Serializes `value`, appending to `out`.
    ///
    /// On error, `out` may hold a partial encoding; callers discard it.
    pub fn write(&self, value: &Value, out: &mut Vec<u8>) -> SerializationResult<()> {
        let mut encoder = BinaryEncoder::new(out);
        self.root.write(value, ValuePath::Root, &mut encoder)
    }
}

impl WriterNode {
    fn compile(schema: &Schema) -> Self {
        match schema.kind() {
            SchemaKind::Null => WriterNode::Null,
            SchemaKind::Boolean => WriterNode::Boolean,
            SchemaKind::Int => WriterNode::Int,
            SchemaKind::Long => WriterNode::Long,
            SchemaKind::Float => WriterNode::Float,
            SchemaKind::Double => WriterNode::Double,
            SchemaKind::Bytes => WriterNode::Bytes,
            SchemaKind::String => WriterNode::String,
            SchemaKind::Record { name, fields } => WriterNode::Record {
                name: name.clone(),
                fields: fields
                    .iter()
                    .map(|f| (f.name.clone(), WriterNode::compile(&f.schema)))
                    .collect(),
                declared: fields.iter().map(|f| f.name.clone()).collect(),
            },
            SchemaKind::Enum { name, symbols } => WriterNode::Enum {
                name: name.clone(),
                ordinals: symbols
                    .iter()
                    .enumerate()
                    .map(|(i, s)| (s.clone(), i))
                    .collect(),
            },
            SchemaKind::Array { items } => WriterNode::Array(Box::new(WriterNode::compile(items))),
            SchemaKind::Map { values } => WriterNode::Map(Box::new(WriterNode::compile(values))),
            SchemaKind::Union { branches } => {
                WriterNode::Union(branches.iter().map(WriterNode::compile).collect())
            }
            SchemaKind::Fixed { name, size } => WriterNode::Fixed {
                name: name.clone(),
                size: *size,
            },
        }
    }

    fn describe(&self) -> String {
        match self {
            WriterNode::Null => "null".into(),
            WriterNode::Boolean => "boolean".into(),
            WriterNode::Int => "int".into(),
            WriterNode::Long => "long".into(),
            WriterNode::Float => "float".into(),
            WriterNode::Double => "double".into(),
            WriterNode::Bytes => "bytes".into(),
            WriterNode::String => "string".into(),
            WriterNode::Record { name, .. } => format!("record {}", name),
            WriterNode::Enum { name, .. } => format!("enum {}", name),
            WriterNode::Array(_) => "array".into(),
            WriterNode::Map(_) => "map".into(),
            WriterNode::Union(_) => "union".into(),
            WriterNode::Fixed { name, .. } => format!("fixed {}", name),
        }
    }

    /// Whether `value` can be written by this node without looking deeper
    /// than its type tag and name. With `exact`, numeric promotion is off.
    fn accepts(&self, value: &Value, exact: bool) -> bool {
        match (self, value) {
            (WriterNode::Null, Value::Null)
            | (WriterNode::Boolean, Value::Boolean(_))
            | (WriterNode::Int, Value::Int(_))
            | (WriterNode::Long, Value::Long(_))
            | (WriterNode::Float, Value::Float(_))
            | (WriterNode::Double, Value::Double(_))
            | (WriterNode::Bytes, Value::Bytes(_))
            | (WriterNode::String, Value::String(_))
            | (WriterNode::Array(_), Value::Array(_))
            | (WriterNode::Map(_), Value::Map(_)) => true,
            (WriterNode::Long, Value::Int(_))
            | (WriterNode::Float, Value::Int(_) | Value::Long(_))
            | (WriterNode::Double, Value::Int(_) | Value::Long(_) | Value::Float(_)) => !exact,
            (WriterNode::Record { name, .. }, Value::Record(_))
            | (WriterNode::Enum { name, .. }, Value::Enum(_))
            | (WriterNode::Fixed { name, .. }, Value::Fixed(_)) => has_name(value, name),
            _ => false,
        }
    }

    fn write(
        &self,
        value: &Value,
        path: ValuePath<'_>,
        enc: &mut BinaryEncoder<'_>,
    ) -> SerializationResult<()> {
        match (self, value) {
            (WriterNode::Null, Value::Null) => {}
            (WriterNode::Boolean, Value::Boolean(b)) => enc.write_boolean(*b),
            (WriterNode::Int, Value::Int(v)) => enc.write_int(*v),
            (WriterNode::Long, Value::Int(v)) => enc.write_long(i64::from(*v)),
            (WriterNode::Long, Value::Long(v)) => enc.write_long(*v),
            (WriterNode::Float, Value::Int(v)) => enc.write_float(*v as f32),
            (WriterNode::Float, Value::Long(v)) => enc.write_float(*v as f32),
            (WriterNode::Float, Value::Float(v)) => enc.write_float(*v),
            (WriterNode::Double, Value::Int(v)) => enc.write_double(f64::from(*v)),
            (WriterNode::Double, Value::Long(v)) => enc.write_double(*v as f64),
            (WriterNode::Double, Value::Float(v)) => enc.write_double(f64::from(*v)),
            (WriterNode::Double, Value::Double(v)) => enc.write_double(*v),
            (WriterNode::Bytes, Value::Bytes(v)) => enc.write_bytes(v),
            (WriterNode::String, Value::String(v)) => enc.write_string(v),

            (
                WriterNode::Record {
                    name,
                    fields,
                    declared,
                },
                Value::Record(record),
            ) if has_name(value, name) => {
                if let Some(extra) = record.field_names().find(|f| !declared.contains(*f)) {
                    return Err(SerializationError::UndeclaredField {
                        path: path.to_string(),
                        record: name.clone(),
                        field: extra.to_string(),
                    });
                }
                for (field_name, node) in fields {
                    let field_value = record.get(field_name).unwrap_or(&Value::Null);
                    node.write(field_value, ValuePath::Field(&path, field_name), enc)?;
                }
            }

            (WriterNode::Enum { name, ordinals }, Value::Enum(symbol)) if has_name(value, name) => {
                let ordinal = ordinals.get(symbol.symbol()).ok_or_else(|| {
                    SerializationError::UnknownSymbol {
                        path: path.to_string(),
                        name: name.clone(),
                        symbol: symbol.symbol().to_string(),
                    }
                })?;
                enc.write_enum(*ordinal);
            }

            (WriterNode::Fixed { name, size }, Value::Fixed(fixed)) if has_name(value, name) => {
                if fixed.bytes().len() != *size {
                    return Err(SerializationError::FixedSize {
                        path: path.to_string(),
                        name: name.clone(),
                        expected: *size,
                        actual: fixed.bytes().len(),
                    });
                }
                enc.write_fixed(fixed.bytes());
            }

            (WriterNode::Array(items), Value::Array(values)) => {
                if !values.is_empty() {
                    enc.write_block_count(values.len());
                    for (i, item) in values.iter().enumerate() {
                        items.write(item, ValuePath::Index(&path, i), enc)?;
                    }
                }
                enc.write_block_count(0);
            }

            (WriterNode::Map(node), Value::Map(entries)) => {
                if !entries.is_empty() {
                    enc.write_block_count(entries.len());
                    for (key, entry) in entries {
                        enc.write_string(key);
                        node.write(entry, ValuePath::Key(&path, key), enc)?;
                    }
                }
                enc.write_block_count(0);
            }

            (WriterNode::Union(branches), _) => {
                let index = branches
                    .iter()
                    .position(|b| b.accepts(value, true))
                    .or_else(|| branches.iter().position(|b| b.accepts(value, false)))
                    .ok_or_else(|| SerializationError::NoUnionBranch {
                        path: path.to_string(),
                        actual: describe_value(value),
                    })?;
                enc.write_union_index(index);
                branches[index].write(value, path, enc)?;
            }

            (node, _) => {
                return Err(SerializationError::type_mismatch(
                    &path.to_string(),
                    node.describe(),
                    describe_value(value),
                ));
            }
        }
        Ok(())
    }
}

fn has_name(value: &Value, name: &str) -> bool {
    value
        .schema()
        .and_then(Schema::full_name)
        .is_some_and(|n| n == name)
}

fn describe_value(value: &Value) -> String {
    match value.schema().and_then(Schema::full_name) {
        Some(name) => format!("{} {}", value.type_name(), name),
        None => value.type_name().to_string(),
    }
}

/// Location of a value inside the root value, rendered only on error.
#[derive(Clone, Copy)]
enum ValuePath<'a> {
    Root,
    Field(&'a ValuePath<'a>, &'a str),
    Index(&'a ValuePath<'a>, usize),
    Key(&'a ValuePath<'a>, &'a str),
}

impl fmt::Display for ValuePath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValuePath::Root => write!(f, "$"),
            ValuePath::Field(parent, name) => write!(f, "{}.{}", parent, name),
            ValuePath::Index(parent, i) => write!(f, "{}[{}]", parent, i),
            ValuePath::Key(parent, key) => write!(f, "{}{{{}}}", parent, key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use crate::value::{EnumSymbol, GenericFixed, GenericRecord};
    use std::collections::BTreeMap;

    fn write(schema: &Schema, value: impl Into<Value>) -> SerializationResult<Vec<u8>> {
        let mut out = Vec::new();
        DatumWriter::new(schema.clone()).write(&value.into(), &mut out)?;
        Ok(out)
    }

    fn point_schema() -> Schema {
        Schema::record(
            "geo.Point",
            vec![Field::new("x", Schema::int()), Field::new("label", Schema::string())],
        )
        .unwrap()
    }

    #[test]
    fn test_primitives() {
        assert_eq!(write(&Schema::int(), 42).unwrap(), vec![0x54]);
        assert_eq!(write(&Schema::string(), "hi").unwrap(), vec![0x04, b'h', b'i']);
        assert_eq!(write(&Schema::boolean(), true).unwrap(), vec![0x01]);
        assert_eq!(write(&Schema::null(), Value::Null).unwrap(), Vec::<u8>::new());
        assert_eq!(write(&Schema::bytes(), vec![9u8]).unwrap(), vec![0x02, 0x09]);
    }

    #[test]
    fn test_numeric_promotion() {
        assert_eq!(write(&Schema::long(), 42i32).unwrap(), vec![0x54]);
        assert_eq!(write(&Schema::double(), 1i32).unwrap(), 1.0f64.to_le_bytes().to_vec());
        assert_eq!(write(&Schema::float(), 2i64).unwrap(), 2.0f32.to_le_bytes().to_vec());
        assert!(write(&Schema::int(), 1i64).is_err());
        assert!(write(&Schema::float(), 1.0f64).is_err());
    }

    #[test]
    fn test_record_fields_in_schema_order() {
        let schema = point_schema();
        let record = GenericRecord::new(schema.clone())
            .with("label", "a")
            .with("x", 1);
        assert_eq!(write(&schema, record).unwrap(), vec![0x02, 0x02, b'a']);
    }

    #[test]
    fn test_record_missing_field_is_rejected() {
        let schema = point_schema();
        let err = write(&schema, GenericRecord::new(schema.clone()).with("x", 1)).unwrap_err();
        assert_eq!(err.path(), "$.label");
        assert!(matches!(err, SerializationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_record_undeclared_field_is_rejected() {
        let schema = point_schema();
        let record = GenericRecord::new(schema.clone())
            .with("x", 1)
            .with("label", "a")
            .with("z", 0);
        let err = write(&schema, record).unwrap_err();
        assert!(matches!(err, SerializationError::UndeclaredField { ref field, .. } if field == "z"));
    }

    #[test]
    fn test_record_name_must_match() {
        let other = Schema::record("geo.Other", vec![Field::new("x", Schema::int())]).unwrap();
        let err = write(&point_schema(), GenericRecord::new(other).with("x", 1)).unwrap_err();
        assert!(matches!(err, SerializationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_union_selects_branch() {
        let schema = Schema::union(vec![Schema::null(), Schema::string()]).unwrap();
        assert_eq!(write(&schema, Value::Null).unwrap(), vec![0x00]);
        assert_eq!(write(&schema, "a").unwrap(), vec![0x02, 0x02, b'a']);

        let err = write(&schema, 1).unwrap_err();
        assert!(matches!(err, SerializationError::NoUnionBranch { .. }));
    }

    #[test]
    fn test_union_prefers_exact_branch() {
        let schema = Schema::union(vec![Schema::long(), Schema::int()]).unwrap();
        assert_eq!(write(&schema, 1i32).unwrap(), vec![0x02, 0x02]);
        assert_eq!(write(&schema, 1i64).unwrap(), vec![0x00, 0x02]);

        let promoting = Schema::union(vec![Schema::null(), Schema::double()]).unwrap();
        let mut expected = vec![0x02];
        expected.extend_from_slice(&3.0f64.to_le_bytes());
        assert_eq!(write(&promoting, 3i32).unwrap(), expected);
    }

    #[test]
    fn test_array_and_map_blocks() {
        let array = Schema::array(Schema::int());
        assert_eq!(
            write(&array, Value::Array(vec![1.into(), 2.into()])).unwrap(),
            vec![0x04, 0x02, 0x04, 0x00]
        );
        assert_eq!(write(&array, Value::Array(vec![])).unwrap(), vec![0x00]);

        let map = Schema::map(Schema::boolean());
        let mut entries = BTreeMap::new();
        entries.insert("k".to_string(), Value::Boolean(true));
        assert_eq!(
            write(&map, Value::Map(entries)).unwrap(),
            vec![0x02, 0x02, b'k', 0x01, 0x00]
        );
    }

    #[test]
    fn test_nested_error_path() {
        let schema = Schema::array(Schema::map(Schema::int()));
        let mut entries = BTreeMap::new();
        entries.insert("bad".to_string(), Value::from("x"));
        let value = Value::Array(vec![Value::Map(BTreeMap::new()), Value::Map(entries)]);
        let err = write(&schema, value).unwrap_err();
        assert_eq!(err.path(), "$[1]{bad}");
    }

    #[test]
    fn test_enum_and_fixed() {
        let suit = Schema::enumeration("Suit", vec!["HEARTS".into(), "SPADES".into()]).unwrap();
        assert_eq!(write(&suit, EnumSymbol::new(suit.clone(), "SPADES")).unwrap(), vec![0x02]);
        assert!(matches!(
            write(&suit, EnumSymbol::new(suit.clone(), "CLUBS")),
            Err(SerializationError::UnknownSymbol { .. })
        ));

        let md5 = Schema::fixed("Md5", 2).unwrap();
        assert_eq!(write(&md5, GenericFixed::new(md5.clone(), vec![7, 8])).unwrap(), vec![7, 8]);
        assert!(matches!(
            write(&md5, GenericFixed::new(md5.clone(), vec![7])),
            Err(SerializationError::FixedSize { expected: 2, actual: 1, .. })
        ));
    }
}
