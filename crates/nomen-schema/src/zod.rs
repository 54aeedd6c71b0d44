//! # Zod-Style Export
//!
//! Describes a [`RecordDefinition`] as a per-field table of Zod type
//! expressions, for front ends that build their validators from it:
//!
//! ```json
//! {
//!   "interfaceId": "User",
//!   "version": 1,
//!   "fields": {
//!     "email": { "type": "z.string().email()", "optional": false, "nullable": false },
//!     "role":  { "type": "z.enum([\"admin\", \"user\"])", "optional": true, "nullable": false }
//!   }
//! }
//! ```
//!
//! ## Expression Invariant
//!
//! A field's `type` expression encodes nullability (trailing `.nullable()`)
//! but never optionality. Optionality is reported only through the
//! `optional` flag; [`ZodSchema::render`] is the one place that appends
//! `.optional()`.

use std::collections::BTreeMap;

use nomen_core::{FieldDescriptor, FieldType, RecordDefinition};
use serde::Serialize;

use crate::reference::{resolve, Resolved};

const UNKNOWN_OBJECT: &str = "z.record(z.string(), z.unknown())";

/// Zod-style description of a record definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZodSchema {
    /// The record's label.
    pub interface_id: String,
    /// The record's version.
    pub version: u32,
    /// One entry per schema field, keyed by field name.
    pub fields: BTreeMap<String, ZodField>,
}

/// One field of a [`ZodSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZodField {
    /// Zod type expression, e.g. `z.string().nullable()`.
    #[serde(rename = "type")]
    pub type_expr: String,
    /// Whether the field may be absent.
    pub optional: bool,
    /// Whether the field accepts `null`.
    pub nullable: bool,
}

impl ZodSchema {
    /// Name of the exported constant, `<Label>Schema`.
    pub fn const_name(&self) -> String {
        schema_const_name(&self.interface_id)
    }

    /// Render as a TypeScript module statement:
    ///
    /// ```text
    /// export const UserSchema = z.object({
    ///   "email": z.string().email(),
    ///   "role": z.enum(["admin", "user"]).optional(),
    /// });
    /// ```
    pub fn render(&self) -> String {
        let mut out = format!("export const {} = z.object({{\n", self.const_name());
        for (name, field) in &self.fields {
            let key = serde_json::Value::String(name.clone());
            out.push_str(&format!("  {key}: {}", field.type_expr));
            if field.optional {
                out.push_str(".optional()");
            }
            out.push_str(",\n");
        }
        out.push_str("});\n");
        out
    }
}

/// Export `definition` as a [`ZodSchema`].
pub fn to_zod_schema(definition: &RecordDefinition) -> ZodSchema {
    let fields = definition
        .schema()
        .iter()
        .map(|(name, descriptor)| {
            let field = ZodField {
                type_expr: type_expression(definition, descriptor),
                optional: descriptor.is_optional(),
                nullable: descriptor.is_nullable(),
            };
            (name.to_string(), field)
        })
        .collect();

    ZodSchema {
        interface_id: definition.label().to_string(),
        version: definition.version(),
        fields,
    }
}

fn type_expression(owner: &RecordDefinition, descriptor: &FieldDescriptor) -> String {
    let field_type = descriptor.field_type();
    let mut expr = match resolve(owner, field_type) {
        Resolved::Base => match field_type {
            FieldType::String => "z.string()".to_string(),
            FieldType::Number => "z.number()".to_string(),
            FieldType::Boolean => "z.boolean()".to_string(),
            FieldType::Array => match descriptor.items() {
                Some(items) => format!("z.array({})", type_expression(owner, items)),
                None => "z.array(z.unknown())".to_string(),
            },
            _ => UNKNOWN_OBJECT.to_string(),
        },
        Resolved::Enum(definition) => {
            let members: Vec<String> = definition
                .members()
                .iter()
                .map(|m| serde_json::Value::String(m.clone()).to_string())
                .collect();
            format!("z.enum([{}])", members.join(", "))
        }
        Resolved::Primitive(definition, format) => {
            let base = format!("z.{}()", definition.base_type().as_str());
            match format {
                Some(format) => format!("{base}.{}()", format.zod_method()),
                None => base,
            }
        }
        Resolved::Record(definition) => schema_const_name(definition.label()),
        Resolved::Missing => match field_type {
            FieldType::Record(_) => UNKNOWN_OBJECT.to_string(),
            _ => "z.string()".to_string(),
        },
    };
    if descriptor.is_nullable() {
        expr.push_str(".nullable()");
    }
    expr
}

/// `<Label>Schema`, with characters that cannot appear in a JavaScript
/// identifier replaced by `_`.
fn schema_const_name(label: &str) -> String {
    let mut name: String = label
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name.push_str("Schema");
    name
}
