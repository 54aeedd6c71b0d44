//! # Opaque Wrappers
//!
//! An [`OpaqueDefinition`] brands a value without a field schema. Unlike a
//! primitive refinement, the brand is retained: [`OpaqueDefinition::wrap`]
//! returns an [`OpaqueValue`] that carries the label next to the value.
//! Serialization emits the inner value only.

use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::NominalError;
use crate::kind::{json_type_name, BaseType, DefinitionKind};
use crate::observe::ObservationEvent;
use crate::registry::RegistryLink;

/// A registered opaque wrapper. Clones are the same definition.
#[derive(Debug, Clone)]
pub struct OpaqueDefinition {
    inner: Arc<OpaqueInner>,
}

#[derive(Debug)]
struct OpaqueInner {
    label: Arc<str>,
    base_type: Option<BaseType>,
    registry: RegistryLink,
}

impl OpaqueDefinition {
    pub(crate) fn build(registry: RegistryLink, label: &str, base_type: Option<BaseType>) -> Self {
        Self {
            inner: Arc::new(OpaqueInner {
                label: label.into(),
                base_type,
                registry,
            }),
        }
    }

    /// The label.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// The required base type, if any.
    pub fn base_type(&self) -> Option<BaseType> {
        self.inner.base_type
    }

    /// Whether two handles are the same definition.
    pub fn ptr_eq(&self, other: &OpaqueDefinition) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Brand `value`.
    ///
    /// # Errors
    ///
    /// `ValueTypeMismatch` if a base type is set and `value` does not have it.
    pub fn wrap(&self, value: Value) -> Result<OpaqueValue, NominalError> {
        self.check(&value)?;
        self.inner
            .registry
            .notify(self.label(), DefinitionKind::Opaque, ObservationEvent::Created);
        Ok(OpaqueValue {
            label: Arc::clone(&self.inner.label),
            value,
        })
    }

    /// Whether [`wrap`](Self::wrap) would accept `value`.
    pub fn validate(&self, value: &Value) -> bool {
        let valid = self.check(value).is_ok();
        self.inner.registry.notify(
            self.label(),
            DefinitionKind::Opaque,
            ObservationEvent::Validated { valid },
        );
        valid
    }

    fn check(&self, value: &Value) -> Result<(), NominalError> {
        match self.inner.base_type {
            Some(base) if !base.matches(value) => Err(NominalError::ValueTypeMismatch {
                label: self.label().to_string(),
                expected: base.as_str().to_string(),
                actual: json_type_name(value).to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// A value branded by an [`OpaqueDefinition`].
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueValue {
    label: Arc<str>,
    value: Value,
}

impl OpaqueValue {
    /// The label this value was wrapped under.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The wrapped value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Unwrap, dropping the brand.
    pub fn into_inner(self) -> Value {
        self.value
    }
}

impl Serialize for OpaqueValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use serde_json::json;

    #[test]
    fn test_wrap_and_unwrap() {
        let registry = Registry::new();
        let user_id = registry
            .define_opaque("UserId", Some(BaseType::String))
            .unwrap();
        let id = user_id.wrap(json!("u-123")).unwrap();
        assert_eq!(id.label(), "UserId");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""u-123""#);
        assert_eq!(id.into_inner(), json!("u-123"));
    }

    #[test]
    fn test_base_type_enforced() {
        let registry = Registry::new();
        let cents = registry
            .define_opaque("Cents", Some(BaseType::Number))
            .unwrap();
        assert!(cents.wrap(json!("12")).is_err());
        assert!(!cents.validate(&json!("12")));
        assert!(cents.validate(&json!(12)));
    }

    #[test]
    fn test_untyped_wrapper_accepts_anything() {
        let registry = Registry::new();
        let blob = registry.define_opaque("Blob", None).unwrap();
        assert!(blob.wrap(json!({"a": [1, 2]})).is_ok());
        assert!(blob.wrap(Value::Null).is_ok());
    }
}
