//! Schema type definitions
//!
//! Supported types:
//! - null, boolean, int (32-bit), long (64-bit), float, double, bytes, string
//! - record: named type with ordered fields
//! - enum: named type with ordered symbols
//! - array: homogeneous list of items
//! - map: string keys to homogeneous values
//! - union: ordered list of alternative branches
//! - fixed: named type with a fixed byte size
//!
//! A [`Schema`] is a cheap-to-clone handle to an immutable node. Equality and
//! hashing are structural; [`Schema::identity`] exposes the node's identity for
//! caches that must not conflate independently built schemas.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde_json::{json, Value as JsonValue};

use super::errors::{SchemaError, SchemaResult};

/// Kind tag of a schema, used in error messages and branch selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record,
    Enum,
    Array,
    Map,
    Union,
    Fixed,
}

impl SchemaType {
    /// Returns the type name as written in schema JSON
    pub fn name(&self) -> &'static str {
        match self {
            SchemaType::Null => "null",
            SchemaType::Boolean => "boolean",
            SchemaType::Int => "int",
            SchemaType::Long => "long",
            SchemaType::Float => "float",
            SchemaType::Double => "double",
            SchemaType::Bytes => "bytes",
            SchemaType::String => "string",
            SchemaType::Record => "record",
            SchemaType::Enum => "enum",
            SchemaType::Array => "array",
            SchemaType::Map => "map",
            SchemaType::Union => "union",
            SchemaType::Fixed => "fixed",
        }
    }

    /// Parses a primitive type name.
    pub fn primitive_from_name(name: &str) -> Option<SchemaType> {
        match name {
            "null" => Some(SchemaType::Null),
            "boolean" => Some(SchemaType::Boolean),
            "int" => Some(SchemaType::Int),
            "long" => Some(SchemaType::Long),
            "float" => Some(SchemaType::Float),
            "double" => Some(SchemaType::Double),
            "bytes" => Some(SchemaType::Bytes),
            "string" => Some(SchemaType::String),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            SchemaType::Null
                | SchemaType::Boolean
                | SchemaType::Int
                | SchemaType::Long
                | SchemaType::Float
                | SchemaType::Double
                | SchemaType::Bytes
                | SchemaType::String
        )
    }

    pub fn is_named(&self) -> bool {
        matches!(self, SchemaType::Record | SchemaType::Enum | SchemaType::Fixed)
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A record field: name plus field schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Structure of a schema node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record {
        /// Full name, including namespace
        name: String,
        fields: Vec<Field>,
    },
    Enum {
        name: String,
        symbols: Vec<String>,
    },
    Array {
        items: Schema,
    },
    Map {
        values: Schema,
    },
    Union {
        branches: Vec<Schema>,
    },
    Fixed {
        name: String,
        size: usize,
    },
}

impl SchemaKind {
    pub fn schema_type(&self) -> SchemaType {
        match self {
            SchemaKind::Null => SchemaType::Null,
            SchemaKind::Boolean => SchemaType::Boolean,
            SchemaKind::Int => SchemaType::Int,
            SchemaKind::Long => SchemaType::Long,
            SchemaKind::Float => SchemaType::Float,
            SchemaKind::Double => SchemaType::Double,
            SchemaKind::Bytes => SchemaType::Bytes,
            SchemaKind::String => SchemaType::String,
            SchemaKind::Record { .. } => SchemaType::Record,
            SchemaKind::Enum { .. } => SchemaType::Enum,
            SchemaKind::Array { .. } => SchemaType::Array,
            SchemaKind::Map { .. } => SchemaType::Map,
            SchemaKind::Union { .. } => SchemaType::Union,
            SchemaKind::Fixed { .. } => SchemaType::Fixed,
        }
    }
}

/// Identity of a schema node.
///
/// Two schemas share an identity only if one is a clone of the other.
/// Holders of a `SchemaIdentity` must also hold a clone of the schema so the
/// node cannot be freed and its address reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaIdentity(usize);

/// Immutable, shared schema handle.
#[derive(Clone)]
pub struct Schema {
    node: Arc<SchemaKind>,
}

impl Schema {
    /// Wraps a schema kind into a new node without validation.
    ///
    /// Primitive kinds are always valid; for complex kinds prefer the
    /// checked constructors below.
    fn from_kind(kind: SchemaKind) -> Self {
        Self {
            node: Arc::new(kind),
        }
    }

    /// Creates a fresh primitive schema.
    ///
    /// Returns `None` for complex types.
    pub fn primitive(ty: SchemaType) -> Option<Self> {
        let kind = match ty {
            SchemaType::Null => SchemaKind::Null,
            SchemaType::Boolean => SchemaKind::Boolean,
            SchemaType::Int => SchemaKind::Int,
            SchemaType::Long => SchemaKind::Long,
            SchemaType::Float => SchemaKind::Float,
            SchemaType::Double => SchemaKind::Double,
            SchemaType::Bytes => SchemaKind::Bytes,
            SchemaType::String => SchemaKind::String,
            _ => return None,
        };
        Some(Self::from_kind(kind))
    }

    pub fn null() -> Self {
        Self::from_kind(SchemaKind::Null)
    }

    pub fn boolean() -> Self {
        Self::from_kind(SchemaKind::Boolean)
    }

    pub fn int() -> Self {
        Self::from_kind(SchemaKind::Int)
    }

    pub fn long() -> Self {
        Self::from_kind(SchemaKind::Long)
    }

    pub fn float() -> Self {
        Self::from_kind(SchemaKind::Float)
    }

    pub fn double() -> Self {
        Self::from_kind(SchemaKind::Double)
    }

    pub fn bytes() -> Self {
        Self::from_kind(SchemaKind::Bytes)
    }

    pub fn string() -> Self {
        Self::from_kind(SchemaKind::String)
    }

    /// Creates a record schema.
    ///
    /// Field names must be unique and valid identifiers.
    pub fn record(name: impl Into<String>, fields: Vec<Field>) -> SchemaResult<Self> {
        let name = name.into();
        validate_full_name(&name)?;
        let mut seen = HashSet::new();
        for field in &fields {
            validate_simple_name(&field.name)?;
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    record: name,
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self::from_kind(SchemaKind::Record { name, fields }))
    }

    /// Creates an enum schema with at least one unique symbol.
    pub fn enumeration(name: impl Into<String>, symbols: Vec<String>) -> SchemaResult<Self> {
        let name = name.into();
        validate_full_name(&name)?;
        if symbols.is_empty() {
            return Err(SchemaError::InvalidAttribute {
                attribute: "symbols".into(),
                reason: format!("enum {} declares no symbols", name),
            });
        }
        let mut seen = HashSet::new();
        for symbol in &symbols {
            validate_simple_name(symbol)?;
            if !seen.insert(symbol.as_str()) {
                return Err(SchemaError::InvalidAttribute {
                    attribute: "symbols".into(),
                    reason: format!("duplicate symbol '{}' in enum {}", symbol, name),
                });
            }
        }
        Ok(Self::from_kind(SchemaKind::Enum { name, symbols }))
    }

    pub fn array(items: Schema) -> Self {
        Self::from_kind(SchemaKind::Array { items })
    }

    pub fn map(values: Schema) -> Self {
        Self::from_kind(SchemaKind::Map { values })
    }

    /// Creates a union schema.
    ///
    /// Unions may not directly contain unions, and may contain at most one
    /// branch per unnamed type and per named-type full name.
    pub fn union(branches: Vec<Schema>) -> SchemaResult<Self> {
        let mut unnamed = HashSet::new();
        let mut named = HashSet::new();
        for branch in &branches {
            let ty = branch.schema_type();
            if ty == SchemaType::Union {
                return Err(SchemaError::InvalidUnion("unions may not immediately contain other unions".into()));
            }
            let duplicate = match branch.full_name() {
                Some(name) => !named.insert(name.to_string()),
                None => !unnamed.insert(ty),
            };
            if duplicate {
                return Err(SchemaError::InvalidUnion(format!("duplicate branch {}", branch)));
            }
        }
        Ok(Self::from_kind(SchemaKind::Union { branches }))
    }

    pub fn fixed(name: impl Into<String>, size: usize) -> SchemaResult<Self> {
        let name = name.into();
        validate_full_name(&name)?;
        Ok(Self::from_kind(SchemaKind::Fixed { name, size }))
    }

    /// Returns the structure of this schema
    pub fn kind(&self) -> &SchemaKind {
        &self.node
    }

    pub fn schema_type(&self) -> SchemaType {
        self.node.schema_type()
    }

    /// Full name of a named type (record, enum, fixed).
    pub fn full_name(&self) -> Option<&str> {
        match &*self.node {
            SchemaKind::Record { name, .. }
            | SchemaKind::Enum { name, .. }
            | SchemaKind::Fixed { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Record fields, empty for non-record schemas.
    pub fn fields(&self) -> &[Field] {
        match &*self.node {
            SchemaKind::Record { fields, .. } => fields,
            _ => &[],
        }
    }

    /// Returns the identity of the underlying node.
    pub fn identity(&self) -> SchemaIdentity {
        SchemaIdentity(Arc::as_ptr(&self.node) as usize)
    }

    /// Returns true if both handles point at the same node.
    pub fn ptr_eq(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Builds the canonical JSON representation.
    ///
    /// Object keys are sorted, so the serialized form is deterministic. A
    /// named type is defined at its first occurrence and referenced by full
    /// name afterwards, so the output parses back to the same schema.
    pub fn to_json(&self) -> JsonValue {
        self.to_json_with(&mut HashSet::new())
    }

    fn to_json_with(&self, defined: &mut HashSet<String>) -> JsonValue {
        if let Some(name) = self.full_name() {
            if !defined.insert(name.to_string()) {
                return JsonValue::String(name.to_string());
            }
        }
        match &*self.node {
            SchemaKind::Record { name, fields } => {
                let fields: Vec<JsonValue> = fields
                    .iter()
                    .map(|f| json!({ "name": f.name, "type": f.schema.to_json_with(defined) }))
                    .collect();
                json!({ "type": "record", "name": name, "fields": fields })
            }
            SchemaKind::Enum { name, symbols } => {
                json!({ "type": "enum", "name": name, "symbols": symbols })
            }
            SchemaKind::Array { items } => {
                json!({ "type": "array", "items": items.to_json_with(defined) })
            }
            SchemaKind::Map { values } => {
                json!({ "type": "map", "values": values.to_json_with(defined) })
            }
            SchemaKind::Union { branches } => JsonValue::Array(
                branches.iter().map(|b| b.to_json_with(defined)).collect(),
            ),
            SchemaKind::Fixed { name, size } => {
                json!({ "type": "fixed", "name": name, "size": size })
            }
            other => JsonValue::String(other.schema_type().name().to_string()),
        }
    }

    /// Canonical single-line JSON form.
    pub fn to_canonical_json(&self) -> String {
        self.to_json().to_string()
    }

    /// Multi-line JSON form for diagnostics.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_else(|_| self.to_canonical_json())
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.node == *other.node
    }
}

impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state);
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema({})", self.to_canonical_json())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_json())
    }
}

/// Validates a possibly dotted full name.
pub(crate) fn validate_full_name(name: &str) -> SchemaResult<()> {
    if name.is_empty() {
        return Err(SchemaError::InvalidName(name.to_string()));
    }
    for part in name.split('.') {
        validate_simple_name(part).map_err(|_| SchemaError::InvalidName(name.to_string()))?;
    }
    Ok(())
}

/// Validates a single identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn validate_simple_name(name: &str) -> SchemaResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_schema() -> Schema {
        Schema::record(
            "org.example.User",
            vec![Field::new("name", Schema::string()), Field::new("age", Schema::int())],
        )
        .unwrap()
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(user_schema(), user_schema());
        assert_ne!(Schema::int(), Schema::long());
    }

    #[test]
    fn test_identity_differs_for_independent_schemas() {
        let a = user_schema();
        let b = user_schema();
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert_ne!(a.identity(), b.identity());

        let c = a.clone();
        assert!(a.ptr_eq(&c));
        assert_eq!(a.identity(), c.identity());
    }

    #[test]
    fn test_structural_hash_in_set() {
        let mut set = HashSet::new();
        set.insert(user_schema());
        assert!(set.contains(&user_schema()));
        assert!(!set.contains(&Schema::int()));
    }

    #[test]
    fn test_record_duplicate_field() {
        let result = Schema::record(
            "Dup",
            vec![Field::new("a", Schema::int()), Field::new("a", Schema::long())],
        );
        assert!(matches!(result, Err(SchemaError::DuplicateField { .. })));
    }

    #[test]
    fn test_invalid_names() {
        assert!(Schema::record("9lives", vec![]).is_err());
        assert!(Schema::record("a..b", vec![]).is_err());
        assert!(Schema::fixed("", 4).is_err());
        assert!(Schema::record("ok.Name_1", vec![]).is_ok());
    }

    #[test]
    fn test_enum_requires_symbols() {
        assert!(Schema::enumeration("Suit", vec![]).is_err());
        assert!(Schema::enumeration("Suit", vec!["A".into(), "A".into()]).is_err());
        assert!(Schema::enumeration("Suit", vec!["HEARTS".into(), "SPADES".into()]).is_ok());
    }

    #[test]
    fn test_union_rules() {
        assert!(Schema::union(vec![Schema::null(), Schema::string()]).is_ok());
        assert!(Schema::union(vec![Schema::int(), Schema::int()]).is_err());

        let inner = Schema::union(vec![Schema::null(), Schema::int()]).unwrap();
        assert!(Schema::union(vec![inner]).is_err());

        let a = Schema::fixed("A", 4).unwrap();
        let b = Schema::fixed("B", 4).unwrap();
        assert!(Schema::union(vec![a.clone(), b]).is_ok());
        assert!(Schema::union(vec![a.clone(), a]).is_err());
    }

    #[test]
    fn test_canonical_json_is_deterministic() {
        let json = user_schema().to_canonical_json();
        assert_eq!(json, user_schema().to_canonical_json());
        assert_eq!(
            json,
            r#"{"fields":[{"name":"name","type":"string"},{"name":"age","type":"int"}],"name":"org.example.User","type":"record"}"#
        );
        assert_eq!(Schema::int().to_canonical_json(), r#""int""#);
    }

    #[test]
    fn test_repeated_named_type_is_referenced() {
        let hash = Schema::fixed("md5", 16).unwrap();
        let schema = Schema::record(
            "Pair",
            vec![
                Field::new("a", hash.clone()),
                Field::new("b", Schema::array(hash)),
            ],
        )
        .unwrap();

        let json = schema.to_json();
        assert_eq!(json["fields"][0]["type"]["type"], "fixed");
        assert_eq!(json["fields"][1]["type"]["items"], "md5");
        assert_eq!(Schema::from_json_value(&json).unwrap(), schema);
    }

    #[test]
    fn test_primitive_constructor() {
        assert_eq!(Schema::primitive(SchemaType::Long).unwrap(), Schema::long());
        assert!(Schema::primitive(SchemaType::Record).is_none());
    }
}
