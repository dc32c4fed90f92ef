//! Schema JSON parser
//!
//! Accepts the usual JSON schema notation:
//! - `"int"` or `{"type": "int"}` for primitives
//! - `[...]` for unions
//! - `{"type": "record" | "enum" | "fixed" | "array" | "map", ...}` for complex types
//!
//! Named types may be referenced by name after their definition. Recursive
//! references to a type from inside its own definition are not supported.

use std::collections::HashMap;

use serde_json::{Map, Value as JsonValue};

use super::errors::{SchemaError, SchemaResult};
use super::types::{Field, Schema, SchemaType};

/// Parser holding the named types defined so far.
#[derive(Debug, Default)]
pub struct SchemaParser {
    names: HashMap<String, Schema>,
}

impl SchemaParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a schema from JSON text.
    pub fn parse_str(&mut self, json: &str) -> SchemaResult<Schema> {
        let value: JsonValue =
            serde_json::from_str(json).map_err(|e| SchemaError::InvalidJson(e.to_string()))?;
        self.parse_value(&value)
    }

    /// Parses a schema from an already decoded JSON value.
    pub fn parse_value(&mut self, json: &JsonValue) -> SchemaResult<Schema> {
        self.parse(json, None)
    }

    /// Looks up a named type defined by an earlier parse.
    pub fn named(&self, full_name: &str) -> Option<&Schema> {
        self.names.get(full_name)
    }

    fn parse(&mut self, json: &JsonValue, namespace: Option<&str>) -> SchemaResult<Schema> {
        match json {
            JsonValue::String(name) => self.parse_name(name, namespace),
            JsonValue::Array(branches) => {
                let branches = branches
                    .iter()
                    .map(|b| self.parse(b, namespace))
                    .collect::<SchemaResult<Vec<_>>>()?;
                Schema::union(branches)
            }
            JsonValue::Object(obj) => self.parse_object(obj, namespace),
            other => Err(SchemaError::InvalidJson(format!("not a schema: {}", other))),
        }
    }

    fn parse_name(&self, name: &str, namespace: Option<&str>) -> SchemaResult<Schema> {
        if let Some(ty) = SchemaType::primitive_from_name(name) {
            if let Some(schema) = Schema::primitive(ty) {
                return Ok(schema);
            }
        }
        if !name.contains('.') {
            if let Some(ns) = namespace {
                if let Some(schema) = self.names.get(&format!("{}.{}", ns, name)) {
                    return Ok(schema.clone());
                }
            }
        }
        self.names
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))
    }

    fn parse_object(
        &mut self,
        obj: &Map<String, JsonValue>,
        namespace: Option<&str>,
    ) -> SchemaResult<Schema> {
        let type_attr = obj
            .get("type")
            .ok_or_else(|| SchemaError::missing("type", "schema object"))?;

        let type_name = match type_attr {
            JsonValue::String(s) => s.as_str(),
            nested => return self.parse(nested, namespace),
        };

        match type_name {
            "record" | "error" => self.parse_record(obj, namespace),
            "enum" => self.parse_enum(obj, namespace),
            "fixed" => self.parse_fixed(obj, namespace),
            "array" => {
                let items = obj
                    .get("items")
                    .ok_or_else(|| SchemaError::missing("items", "array"))?;
                Ok(Schema::array(self.parse(items, namespace)?))
            }
            "map" => {
                let values = obj
                    .get("values")
                    .ok_or_else(|| SchemaError::missing("values", "map"))?;
                Ok(Schema::map(self.parse(values, namespace)?))
            }
            other => self.parse_name(other, namespace),
        }
    }

    fn parse_record(
        &mut self,
        obj: &Map<String, JsonValue>,
        namespace: Option<&str>,
    ) -> SchemaResult<Schema> {
        let full_name = full_name(obj, namespace, "record")?;
        self.check_undefined(&full_name)?;
        let inner_ns = namespace_of(&full_name);

        let fields_json = obj
            .get("fields")
            .ok_or_else(|| SchemaError::missing("fields", format!("record {}", full_name)))?
            .as_array()
            .ok_or_else(|| SchemaError::invalid("fields", "must be an array"))?;

        let mut fields = Vec::with_capacity(fields_json.len());
        for field_json in fields_json {
            let field_obj = field_json
                .as_object()
                .ok_or_else(|| SchemaError::invalid("fields", "each field must be an object"))?;
            let name = field_obj
                .get("name")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| SchemaError::missing("name", format!("field of {}", full_name)))?;
            let field_type = field_obj.get("type").ok_or_else(|| {
                SchemaError::missing("type", format!("field {}.{}", full_name, name))
            })?;
            let schema = self.parse(field_type, inner_ns.as_deref())?;
            fields.push(Field::new(name, schema));
        }

        let schema = Schema::record(full_name.clone(), fields)?;
        self.define(full_name, schema.clone())?;
        Ok(schema)
    }

    fn parse_enum(
        &mut self,
        obj: &Map<String, JsonValue>,
        namespace: Option<&str>,
    ) -> SchemaResult<Schema> {
        let full_name = full_name(obj, namespace, "enum")?;
        let symbols = obj
            .get("symbols")
            .ok_or_else(|| SchemaError::missing("symbols", format!("enum {}", full_name)))?
            .as_array()
            .ok_or_else(|| SchemaError::invalid("symbols", "must be an array"))?
            .iter()
            .map(|s| {
                s.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| SchemaError::invalid("symbols", "symbols must be strings"))
            })
            .collect::<SchemaResult<Vec<_>>>()?;

        let schema = Schema::enumeration(full_name.clone(), symbols)?;
        self.define(full_name, schema.clone())?;
        Ok(schema)
    }

    fn parse_fixed(
        &mut self,
        obj: &Map<String, JsonValue>,
        namespace: Option<&str>,
    ) -> SchemaResult<Schema> {
        let full_name = full_name(obj, namespace, "fixed")?;
        let size = obj
            .get("size")
            .ok_or_else(|| SchemaError::missing("size", format!("fixed {}", full_name)))?
            .as_u64()
            .ok_or_else(|| SchemaError::invalid("size", "must be a non-negative integer"))?;
        let size = usize::try_from(size)
            .map_err(|_| SchemaError::invalid("size", format!("{} is too large", size)))?;

        let schema = Schema::fixed(full_name.clone(), size)?;
        self.define(full_name, schema.clone())?;
        Ok(schema)
    }

    fn check_undefined(&self, full_name: &str) -> SchemaResult<()> {
        if self.names.contains_key(full_name) {
            return Err(SchemaError::DuplicateName(full_name.to_string()));
        }
        Ok(())
    }

    fn define(&mut self, full_name: String, schema: Schema) -> SchemaResult<()> {
        self.check_undefined(&full_name)?;
        self.names.insert(full_name, schema);
        Ok(())
    }
}

impl Schema {
    /// Parses a standalone schema from JSON text.
    pub fn parse(json: &str) -> SchemaResult<Schema> {
        SchemaParser::new().parse_str(json)
    }

    /// Parses a standalone schema from a JSON value.
    pub fn from_json_value(json: &JsonValue) -> SchemaResult<Schema> {
        SchemaParser::new().parse_value(json)
    }
}

/// Computes the full name of a named type definition.
fn full_name(
    obj: &Map<String, JsonValue>,
    enclosing: Option<&str>,
    kind: &str,
) -> SchemaResult<String> {
    let name = obj
        .get("name")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| SchemaError::missing("name", kind.to_string()))?;

    if name.contains('.') {
        return Ok(name.to_string());
    }

    let namespace = match obj.get("namespace") {
        Some(JsonValue::String(ns)) => Some(ns.as_str()),
        Some(JsonValue::Null) | None => enclosing,
        Some(_) => return Err(SchemaError::invalid("namespace", "must be a string")),
    };

    Ok(match namespace {
        Some(ns) if !ns.is_empty() => format!("{}.{}", ns, name),
        _ => name.to_string(),
    })
}

fn namespace_of(full_name: &str) -> Option<String> {
    full_name.rfind('.').map(|idx| full_name[..idx].to_string())
}
