//! # Field Descriptors and Record Schemas
//!
//! A [`RecordSchema`] maps field names to [`FieldDescriptor`]s. It is backed
//! by a `BTreeMap`, so field names are unique by construction and
//! iteration is lexicographic. That iteration order is the "schema order"
//! in which record validation visits fields and reports the first failure.

use std::collections::BTreeMap;

use crate::error::NominalError;
use crate::kind::FieldType;
use crate::predicate::Predicate;

/// Describes one field of a record schema.
///
/// Built with the constructor for its type and refined with the builder
/// methods:
///
/// ```
/// use nomen_core::FieldDescriptor;
///
/// let email = FieldDescriptor::primitive_ref("Email").optional();
/// let tags = FieldDescriptor::array().with_items(FieldDescriptor::string());
/// assert!(email.is_optional());
/// assert!(tags.items().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    field_type: FieldType,
    optional: bool,
    nullable: bool,
    predicate: Option<Predicate>,
    items: Option<Box<FieldDescriptor>>,
}

impl FieldDescriptor {
    /// A required, non-nullable field of the given type.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            optional: false,
            nullable: false,
            predicate: None,
            items: None,
        }
    }

    /// A string field.
    pub fn string() -> Self {
        Self::new(FieldType::String)
    }

    /// A number field.
    pub fn number() -> Self {
        Self::new(FieldType::Number)
    }

    /// A boolean field.
    pub fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    /// An object field.
    pub fn object() -> Self {
        Self::new(FieldType::Object)
    }

    /// An array field.
    pub fn array() -> Self {
        Self::new(FieldType::Array)
    }

    /// A field holding a member of the enum registered under `label`.
    pub fn enum_ref(label: impl Into<String>) -> Self {
        Self::new(FieldType::Enum(label.into()))
    }

    /// A field holding an object valid under the record registered under `label`.
    pub fn record_ref(label: impl Into<String>) -> Self {
        Self::new(FieldType::Record(label.into()))
    }

    /// A field holding a scalar valid under the primitive registered under `label`.
    pub fn primitive_ref(label: impl Into<String>) -> Self {
        Self::new(FieldType::Primitive(label.into()))
    }

    /// Allow the field to be absent.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Allow the field to be explicitly null.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Run `predicate` after the type checks pass.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Describe the elements of an array field.
    pub fn with_items(mut self, items: FieldDescriptor) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    /// The field type.
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Whether the field may be absent.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the field may be null.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The predicate, if any.
    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    /// The element descriptor of an array field.
    pub fn items(&self) -> Option<&FieldDescriptor> {
        self.items.as_deref()
    }

    /// Reject empty reference targets, here and in nested `items`.
    pub(crate) fn check_structure(&self, label: &str, field: &str) -> Result<(), NominalError> {
        if let Some(target) = self.field_type.reference() {
            if target.trim().is_empty() {
                return Err(NominalError::invalid_definition(
                    label,
                    format!(
                        "field {field:?} is a {} reference with an empty target label",
                        self.field_type.as_str()
                    ),
                ));
            }
        }
        if let Some(items) = &self.items {
            if self.field_type != FieldType::Array {
                return Err(NominalError::invalid_definition(
                    label,
                    format!(
                        "field {field:?} declares items but has type {}",
                        self.field_type
                    ),
                ));
            }
            items.check_structure(label, &format!("{field}[]"))?;
        }
        Ok(())
    }
}

/// Mapping from field name to descriptor.
#[derive(Debug, Clone, Default)]
pub struct RecordSchema {
    fields: BTreeMap<String, FieldDescriptor>,
}

impl RecordSchema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn field(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.fields.insert(name.into(), descriptor);
        self
    }

    /// Add or replace a field, returning the previous descriptor.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        descriptor: FieldDescriptor,
    ) -> Option<FieldDescriptor> {
        self.fields.insert(name.into(), descriptor)
    }

    /// Look up a field descriptor.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Whether the schema declares `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Fields in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names in schema order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn check_structure(&self, label: &str) -> Result<(), NominalError> {
        for (name, descriptor) in &self.fields {
            if name.is_empty() {
                return Err(NominalError::invalid_definition(label, "empty field name"));
            }
            descriptor.check_structure(label, name)?;
        }
        Ok(())
    }
}

impl<K: Into<String>> FromIterator<(K, FieldDescriptor)> for RecordSchema {
    fn from_iter<I: IntoIterator<Item = (K, FieldDescriptor)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
