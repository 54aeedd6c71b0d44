//! # Kinds — Definition Kinds, Base Types, Field Types
//!
//! The small closed vocabularies shared by every engine:
//!
//! - [`DefinitionKind`] partitions the registry. A label belongs to exactly
//!   one kind for the lifetime of the registry.
//! - [`BaseType`] is the scalar type a primitive refinement narrows.
//! - [`FieldType`] is what a record field holds: a JSON base kind or a
//!   cross-reference to another registered label.
//!
//! Every `match` over these enums is exhaustive; adding a variant forces
//! each engine and exporter to handle it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::error::NominalError;

/// Registry partition a label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    /// Structured record with a field schema.
    Record,
    /// Refinement over a scalar base type.
    Primitive,
    /// Enumerated set of string members.
    Enum,
    /// Opaque wrapper around an arbitrary value.
    Opaque,
}

impl DefinitionKind {
    /// Returns all kinds in canonical order.
    pub fn all() -> &'static [DefinitionKind] {
        &[Self::Record, Self::Primitive, Self::Enum, Self::Opaque]
    }

    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Primitive => "primitive",
            Self::Enum => "enum",
            Self::Opaque => "opaque",
        }
    }
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar type narrowed by a primitive refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseType {
    /// JSON string.
    String,
    /// JSON number (integer or float).
    Number,
    /// JSON boolean.
    Boolean,
}

impl BaseType {
    /// Returns the type name used in messages and exported schemas.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Whether `value` has this JSON type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

impl std::fmt::Display for BaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseType {
    type Err = NominalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            other => Err(NominalError::invalid_definition(
                other,
                format!("unknown base type: {other:?}"),
            )),
        }
    }
}

/// The type a record field holds.
///
/// Cross-reference variants carry the target label, so a reference field
/// without a target cannot be constructed. Targets are resolved against the
/// registry at validation time, which allows forward references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON object (arrays are not objects).
    Object,
    /// JSON array.
    Array,
    /// Member of a registered enumerated set.
    Enum(String),
    /// Object valid under a registered record definition.
    Record(String),
    /// Scalar valid under a registered primitive refinement.
    Primitive(String),
}

impl FieldType {
    /// Returns the base kind name (`"string"`, …, `"enum"`, `"record"`,
    /// `"primitive"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Enum(_) => "enum",
            Self::Record(_) => "record",
            Self::Primitive(_) => "primitive",
        }
    }

    /// The referenced label, for cross-reference fields.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Enum(target) | Self::Record(target) | Self::Primitive(target) => Some(target),
            Self::String | Self::Number | Self::Boolean | Self::Object | Self::Array => None,
        }
    }

    /// The registry kind a cross-reference must resolve to.
    pub fn reference_kind(&self) -> Option<DefinitionKind> {
        match self {
            Self::Enum(_) => Some(DefinitionKind::Enum),
            Self::Record(_) => Some(DefinitionKind::Record),
            Self::Primitive(_) => Some(DefinitionKind::Primitive),
            Self::String | Self::Number | Self::Boolean | Self::Object | Self::Array => None,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reference() {
            Some(target) => write!(f, "{}<{target}>", self.as_str()),
            None => f.write_str(self.as_str()),
        }
    }
}

/// JSON type name of a value, as reported in type-mismatch errors.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
