//! Cross-reference resolution shared by both exporters.
//!
//! Exporters never fail: a reference that does not resolve to a definition
//! of the expected kind becomes [`Resolved::Missing`] and each exporter
//! degrades it to a generic type.

use nomen_core::{
    BaseType, Definition, EnumDefinition, FieldType, PrimitiveDefinition, RecordDefinition,
    WellKnownFormat,
};

/// What a field's type resolves to.
pub(crate) enum Resolved {
    /// A JSON base kind; no registry involved.
    Base,
    /// Enum reference with its definition.
    Enum(EnumDefinition),
    /// Primitive reference, with the format recognised from its label.
    /// Formats only apply to string primitives.
    Primitive(PrimitiveDefinition, Option<WellKnownFormat>),
    /// Record reference with its definition.
    Record(RecordDefinition),
    /// Reference target absent or of the wrong kind.
    Missing,
}

pub(crate) fn resolve(owner: &RecordDefinition, field_type: &FieldType) -> Resolved {
    let Some(target) = field_type.reference() else {
        return Resolved::Base;
    };
    let resolved = match (field_type, owner.resolve_reference(target)) {
        (FieldType::Enum(_), Some(Definition::Enum(definition))) => Resolved::Enum(definition),
        (FieldType::Primitive(_), Some(Definition::Primitive(definition))) => {
            let format = match definition.base_type() {
                BaseType::String => WellKnownFormat::from_label(definition.label()),
                _ => None,
            };
            Resolved::Primitive(definition, format)
        }
        (FieldType::Record(_), Some(Definition::Record(definition))) => Resolved::Record(definition),
        _ => Resolved::Missing,
    };
    if matches!(resolved, Resolved::Missing) {
        tracing::debug!(
            owner = owner.label(),
            target,
            kind = field_type.as_str(),
            "unresolved reference exported as generic type"
        );
    }
    resolved
}
