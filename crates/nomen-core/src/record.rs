//! # Structured Record Engine
//!
//! A [`RecordDefinition`] binds a label to a [`RecordSchema`] and turns
//! untrusted JSON objects into frozen, branded [`RecordInstance`]s.
//!
//! ## Validation Order
//!
//! Fields are visited in schema order (lexicographic). For each field:
//!
//! 1. absent → accepted if optional, else `MissingField`;
//! 2. `null` → accepted if nullable, else `NullField`;
//! 3. type check by JSON type, or for cross-reference fields by resolving
//!    the target label in the registry and delegating to its validation
//!    (`TypeMismatch` / `UnresolvedReference`);
//! 4. array `items`, element by element, reported as `field[i]`;
//! 5. the field predicate (`PredicateFailed`).
//!
//! [`RecordDefinition::create`] stops at the first failure.
//! [`RecordDefinition::check_all`] visits every field and reports each
//! failing one.
//!
//! Cross-references are resolved at validation time, so a field may name a
//! label that is registered after the record itself.
//!
//! ## Recursion
//!
//! A record field that references a record descends into the nested value,
//! one stack frame group per level of input nesting. A self-referencing
//! record therefore validates input of any depth the data carries. JSON
//! parsed by `serde_json` is capped at 128 levels; a `Value` built in code
//! has no such cap, and validating an extremely deep one can exhaust the
//! stack.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::NominalError;
use crate::field::{FieldDescriptor, RecordSchema};
use crate::instance::RecordInstance;
use crate::kind::{json_type_name, DefinitionKind, FieldType};
use crate::observe::ObservationEvent;
use crate::registry::{Definition, Registry, RegistryLink};

/// Options accepted by `define_record`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOptions {
    /// Schema version, at least 1.
    pub version: u32,
}

impl RecordOptions {
    /// Set the schema version.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self { version: 1 }
    }
}

/// One failing field, as reported by [`RecordDefinition::check_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Field name; empty when the input as a whole was rejected.
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

impl From<&NominalError> for FieldIssue {
    fn from(err: &NominalError) -> Self {
        Self {
            field: err.field().unwrap_or_default().to_string(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// A registered record definition. Cheap to clone; clones are the same
/// definition (see [`ptr_eq`](Self::ptr_eq)).
#[derive(Debug, Clone)]
pub struct RecordDefinition {
    inner: Arc<RecordInner>,
}

#[derive(Debug)]
struct RecordInner {
    label: Arc<str>,
    schema: RecordSchema,
    version: u32,
    registry: RegistryLink,
}

impl RecordDefinition {
    pub(crate) fn build(
        registry: RegistryLink,
        label: &str,
        schema: RecordSchema,
        options: RecordOptions,
    ) -> Result<Self, NominalError> {
        if options.version == 0 {
            return Err(NominalError::invalid_definition(
                label,
                "version must be at least 1",
            ));
        }
        schema.check_structure(label)?;
        Ok(Self {
            inner: Arc::new(RecordInner {
                label: label.into(),
                schema,
                version: options.version,
                registry,
            }),
        })
    }

    /// The label.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// The field schema.
    pub fn schema(&self) -> &RecordSchema {
        &self.inner.schema
    }

    /// The schema version.
    pub fn version(&self) -> u32 {
        self.inner.version
    }

    /// Descriptor of one field.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.inner.schema.get(name)
    }

    /// Field names in schema order.
    pub fn field_names(&self) -> Vec<&str> {
        self.inner.schema.names().collect()
    }

    /// Whether two handles are the same definition.
    pub fn ptr_eq(&self, other: &RecordDefinition) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Resolve a cross-reference target in the registry this record was
    /// defined in.
    pub fn resolve_reference(&self, label: &str) -> Option<Definition> {
        self.inner.registry.resolve(label)
    }

    /// The registry this record was defined in, while it is alive.
    pub fn registry(&self) -> Option<Registry> {
        self.inner.registry.registry()
    }

    /// Validate `data` and brand it.
    ///
    /// # Errors
    ///
    /// The first field failure in schema order, or `NotAnObject` if `data`
    /// is not a JSON object.
    pub fn create(&self, data: &Value) -> Result<RecordInstance, NominalError> {
        match self.check(data) {
            Ok(object) => {
                let fields: Map<String, Value> = self
                    .inner
                    .schema
                    .names()
                    .filter_map(|name| object.get(name).map(|v| (name.to_string(), v.clone())))
                    .collect();
                let instance = RecordInstance::new(Arc::clone(&self.inner.label), fields);
                self.inner.registry.notify(
                    self.label(),
                    DefinitionKind::Record,
                    ObservationEvent::Created,
                );
                Ok(instance)
            }
            Err(err) => {
                tracing::trace!(
                    label = self.label(),
                    field = err.field().unwrap_or_default(),
                    error = %err,
                    "record validation failed"
                );
                Err(err)
            }
        }
    }

    /// Whether `data` would be accepted by [`create`](Self::create).
    pub fn validate(&self, data: &Value) -> bool {
        let valid = self.accepts(data);
        self.inner.registry.notify(
            self.label(),
            DefinitionKind::Record,
            ObservationEvent::Validated { valid },
        );
        valid
    }

    /// Every failing field. Empty iff [`validate`](Self::validate) is true.
    pub fn check_all(&self, data: &Value) -> Vec<FieldIssue> {
        let Some(object) = data.as_object() else {
            return vec![FieldIssue::from(&self.not_an_object(data))];
        };
        self.inner
            .schema
            .iter()
            .filter_map(|(name, descriptor)| self.check_field(object, name, descriptor).err())
            .map(|err| FieldIssue::from(&err))
            .collect()
    }

    pub(crate) fn accepts(&self, data: &Value) -> bool {
        self.check(data).is_ok()
    }

    fn check<'a>(&self, data: &'a Value) -> Result<&'a Map<String, Value>, NominalError> {
        let object = data.as_object().ok_or_else(|| self.not_an_object(data))?;
        for (name, descriptor) in self.inner.schema.iter() {
            self.check_field(object, name, descriptor)?;
        }
        Ok(object)
    }

    fn check_field(
        &self,
        object: &Map<String, Value>,
        name: &str,
        descriptor: &FieldDescriptor,
    ) -> Result<(), NominalError> {
        match object.get(name) {
            None if descriptor.is_optional() => Ok(()),
            None => Err(NominalError::MissingField {
                label: self.label().to_string(),
                field: name.to_string(),
            }),
            Some(value) => check_value(&self.inner.registry, self.label(), name, descriptor, value),
        }
    }

    fn not_an_object(&self, data: &Value) -> NominalError {
        NominalError::NotAnObject {
            label: self.label().to_string(),
            actual: json_type_name(data).to_string(),
        }
    }
}

fn check_value(
    registry: &RegistryLink,
    label: &str,
    field: &str,
    descriptor: &FieldDescriptor,
    value: &Value,
) -> Result<(), NominalError> {
    if value.is_null() {
        return if descriptor.is_nullable() {
            Ok(())
        } else {
            Err(NominalError::NullField {
                label: label.to_string(),
                field: field.to_string(),
            })
        };
    }

    check_type(registry, label, field, descriptor.field_type(), value)?;

    if let (Some(items), Some(elements)) = (descriptor.items(), value.as_array()) {
        for (index, element) in elements.iter().enumerate() {
            check_value(registry, label, &format!("{field}[{index}]"), items, element)?;
        }
    }

    if let Some(predicate) = descriptor.predicate() {
        if !predicate.test(value) {
            return Err(NominalError::PredicateFailed {
                label: label.to_string(),
                field: field.to_string(),
                predicate: predicate.name().to_string(),
            });
        }
    }
    Ok(())
}

fn check_type(
    registry: &RegistryLink,
    label: &str,
    field: &str,
    field_type: &FieldType,
    value: &Value,
) -> Result<(), NominalError> {
    let unresolved = |target: &str, expected: DefinitionKind| NominalError::UnresolvedReference {
        label: label.to_string(),
        field: field.to_string(),
        target: target.to_string(),
        expected,
    };

    let accepted = match field_type {
        FieldType::String => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Object => value.is_object(),
        FieldType::Array => value.is_array(),
        FieldType::Enum(target) => match registry.resolve(target) {
            Some(Definition::Enum(definition)) => definition.accepts(value),
            _ => return Err(unresolved(target, DefinitionKind::Enum)),
        },
        FieldType::Record(target) => match registry.resolve(target) {
            Some(Definition::Record(definition)) => definition.accepts(value),
            _ => return Err(unresolved(target, DefinitionKind::Record)),
        },
        FieldType::Primitive(target) => match registry.resolve(target) {
            Some(Definition::Primitive(definition)) => definition.accepts(value),
            _ => return Err(unresolved(target, DefinitionKind::Primitive)),
        },
    };

    if accepted {
        Ok(())
    } else {
        Err(NominalError::TypeMismatch {
            label: label.to_string(),
            field: field.to_string(),
            expected: field_type
                .reference()
                .unwrap_or(field_type.as_str())
                .to_string(),
            actual: json_type_name(value).to_string(),
        })
    }
}
