//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error type returned by every fallible operation in the
//! registry and the definition engines. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Registration errors name the label and both kinds involved.
//! - Field-level validation errors name the record label, the offending
//!   field, and for type mismatches the expected vs actual type.
//! - Value-level errors (primitives, enums, opaque wrappers) name the label
//!   and, for predicate failures, the predicate.
//!
//! Safe-parse never returns this type; it converts it into a
//! [`ParseError`](crate::guard::ParseError) instead.

use thiserror::Error;

use crate::kind::DefinitionKind;

/// Top-level error type for nominal definitions and validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NominalError {
    /// The label is already present in the registry.
    #[error("label {label:?} is already registered as a {existing} definition")]
    DuplicateLabel {
        /// The label that was being registered.
        label: String,
        /// Kind of the entry already holding the label.
        existing: DefinitionKind,
    },

    /// A `define` call asked for a kind different from the registered one.
    #[error(
        "label {label:?} is already registered as a {existing} definition \
         and cannot be redefined as a {requested} definition"
    )]
    LabelKindConflict {
        /// The conflicting label.
        label: String,
        /// Kind of the entry already holding the label.
        existing: DefinitionKind,
        /// Kind the caller tried to define.
        requested: DefinitionKind,
    },

    /// The definition itself is malformed.
    #[error("invalid definition for {label:?}: {reason}")]
    InvalidDefinition {
        /// Label of the rejected definition.
        label: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Record input was not a JSON object.
    #[error("invalid value for \"{label}\": expected an object, got \"{actual}\"")]
    NotAnObject {
        /// Record label.
        label: String,
        /// JSON type of the input.
        actual: String,
    },

    /// A required field is absent.
    #[error("invalid value for \"{label}\": missing required field \"{field}\"")]
    MissingField {
        /// Record label.
        label: String,
        /// Field name.
        field: String,
    },

    /// A non-nullable field is explicitly null.
    #[error("invalid value for \"{label}\": field \"{field}\" must not be null")]
    NullField {
        /// Record label.
        label: String,
        /// Field name.
        field: String,
    },

    /// A field value has the wrong type or fails its cross-reference.
    #[error(
        "invalid value for \"{label}\": field \"{field}\" expected type \"{expected}\", \
         got \"{actual}\""
    )]
    TypeMismatch {
        /// Record label.
        label: String,
        /// Field name.
        field: String,
        /// Expected base type name, or the referenced label.
        expected: String,
        /// JSON type of the value found.
        actual: String,
    },

    /// A field predicate returned false.
    #[error("invalid value for \"{label}\": field \"{field}\" failed predicate \"{predicate}\"")]
    PredicateFailed {
        /// Record label.
        label: String,
        /// Field name.
        field: String,
        /// Name of the predicate.
        predicate: String,
    },

    /// A cross-reference field names a label that is not registered
    /// under the kind the field requires.
    #[error(
        "invalid value for \"{label}\": field \"{field}\" references \"{target}\", \
         which is not a registered {expected} definition"
    )]
    UnresolvedReference {
        /// Record label.
        label: String,
        /// Field name.
        field: String,
        /// The referenced label.
        target: String,
        /// Kind the field expected the target to be.
        expected: DefinitionKind,
    },

    /// A scalar value has the wrong JSON type for a primitive, enum or
    /// opaque definition.
    #[error("invalid value for \"{label}\": expected type \"{expected}\", got \"{actual}\"")]
    ValueTypeMismatch {
        /// Definition label.
        label: String,
        /// Expected base type name.
        expected: String,
        /// JSON type of the value found.
        actual: String,
    },

    /// A primitive refinement predicate returned false.
    #[error("invalid value for \"{label}\": failed predicate \"{predicate}\"")]
    ValuePredicateFailed {
        /// Primitive label.
        label: String,
        /// Name of the predicate.
        predicate: String,
    },

    /// A string is not a member of an enumerated set.
    #[error("invalid value for \"{label}\": {value:?} is not one of {members:?}")]
    NotAMember {
        /// Enum label.
        label: String,
        /// The rejected string.
        value: String,
        /// Members in registration order.
        members: Vec<String>,
    },

    /// A guard assertion failed.
    #[error("value is not a branded \"{label}\" instance")]
    NotOfType {
        /// Label the value was asserted against.
        label: String,
    },
}

impl NominalError {
    /// The offending field name, for field-level errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field, .. }
            | Self::NullField { field, .. }
            | Self::TypeMismatch { field, .. }
            | Self::PredicateFailed { field, .. }
            | Self::UnresolvedReference { field, .. } => Some(field),
            _ => None,
        }
    }

    /// The label the error is about.
    pub fn label(&self) -> &str {
        match self {
            Self::DuplicateLabel { label, .. }
            | Self::LabelKindConflict { label, .. }
            | Self::InvalidDefinition { label, .. }
            | Self::NotAnObject { label, .. }
            | Self::MissingField { label, .. }
            | Self::NullField { label, .. }
            | Self::TypeMismatch { label, .. }
            | Self::PredicateFailed { label, .. }
            | Self::UnresolvedReference { label, .. }
            | Self::ValueTypeMismatch { label, .. }
            | Self::ValuePredicateFailed { label, .. }
            | Self::NotAMember { label, .. }
            | Self::NotOfType { label } => label,
        }
    }

    pub(crate) fn invalid_definition(label: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_names_field_and_types() {
        let err = NominalError::TypeMismatch {
            label: "User".to_string(),
            field: "age".to_string(),
            expected: "number".to_string(),
            actual: "string".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("User"));
        assert!(msg.contains("\"age\""));
        assert!(msg.contains("expected type \"number\""));
        assert!(msg.contains("got \"string\""));
        assert_eq!(err.field(), Some("age"));
    }

    #[test]
    fn test_value_errors_have_no_field() {
        let err = NominalError::ValuePredicateFailed {
            label: "PositiveNumber".to_string(),
            predicate: "is_positive".to_string(),
        };
        assert_eq!(err.field(), None);
        assert_eq!(err.label(), "PositiveNumber");
        assert!(err.to_string().contains("is_positive"));
    }

    #[test]
    fn test_conflict_message_names_both_kinds() {
        let err = NominalError::LabelKindConflict {
            label: "Shared".to_string(),
            existing: DefinitionKind::Record,
            requested: DefinitionKind::Primitive,
        };
        let msg = err.to_string();
        assert!(msg.contains("\"Shared\""));
        assert!(msg.contains("record"));
        assert!(msg.contains("primitive"));
    }
}
