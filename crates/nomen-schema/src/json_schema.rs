//! # JSON Schema Export
//!
//! Maps a [`RecordDefinition`] to a JSON Schema (draft 2020-12) document:
//!
//! ```json
//! {
//!   "$schema": "https://json-schema.org/draft/2020-12/schema",
//!   "title": "User",
//!   "type": "object",
//!   "properties": { "age": { "type": "number" }, "bio": { "type": ["string", "null"] } },
//!   "required": ["age"]
//! }
//! ```
//!
//! ## Mapping Rules
//!
//! - Base kinds keep their names; nullable fields become `[type, "null"]`.
//! - `required` lists exactly the non-optional fields, in schema order.
//! - Array `items` descriptors become an `items` sub-schema.
//! - Enum references become `{"type": "string", "enum": [...]}` with members
//!   in registration order (plus `null` when nullable).
//! - Primitive references take the primitive's base type, plus `format`
//!   when the primitive is string-based and its label is a
//!   [`WellKnownFormat`](nomen_core::WellKnownFormat).
//! - Record references become `object`.
//! - References that do not resolve become `string`.
//!
//! The exporter reads only the schema and the registry. It never fails.

use nomen_core::{FieldDescriptor, FieldType, RecordDefinition};
use serde_json::{json, Map, Value};

use crate::reference::{resolve, Resolved};

/// `$schema` URI emitted on every document.
pub const JSON_SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Export `definition` as a JSON Schema document.
pub fn to_json_schema(definition: &RecordDefinition) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for (name, descriptor) in definition.schema().iter() {
        properties.insert(name.to_string(), property_schema(definition, descriptor));
        if !descriptor.is_optional() {
            required.push(Value::String(name.to_string()));
        }
    }

    json!({
        "$schema": JSON_SCHEMA_DIALECT,
        "title": definition.label(),
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn property_schema(owner: &RecordDefinition, descriptor: &FieldDescriptor) -> Value {
    let field_type = descriptor.field_type();
    let nullable = descriptor.is_nullable();
    let mut property = Map::new();

    let base_type = match resolve(owner, field_type) {
        Resolved::Base => field_type.as_str(),
        Resolved::Enum(definition) => {
            let mut members: Vec<Value> = definition
                .members()
                .iter()
                .map(|m| Value::String(m.clone()))
                .collect();
            if nullable {
                members.push(Value::Null);
            }
            property.insert("enum".to_string(), Value::Array(members));
            "string"
        }
        Resolved::Primitive(definition, format) => {
            if let Some(format) = format {
                property.insert(
                    "format".to_string(),
                    Value::String(format.json_schema_format().to_string()),
                );
            }
            definition.base_type().as_str()
        }
        Resolved::Record(_) => "object",
        Resolved::Missing => "string",
    };

    let type_value = if nullable {
        json!([base_type, "null"])
    } else {
        json!(base_type)
    };
    property.insert("type".to_string(), type_value);

    if let (FieldType::Array, Some(items)) = (field_type, descriptor.items()) {
        property.insert("items".to_string(), property_schema(owner, items));
    }

    Value::Object(property)
}
