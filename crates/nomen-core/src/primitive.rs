//! # Primitive Refinement Engine
//!
//! A [`PrimitiveDefinition`] names a check over a scalar: a [`BaseType`]
//! plus an optional [`Predicate`].
//!
//! Branding a primitive is validation-only. `create` returns the value
//! unchanged and attaches nothing to it; it proves the value passed the
//! named check once. Identity is not retained on the scalar afterwards.

use std::sync::Arc;

use serde_json::Value;

use crate::error::NominalError;
use crate::kind::{json_type_name, BaseType, DefinitionKind};
use crate::observe::ObservationEvent;
use crate::predicate::Predicate;
use crate::registry::RegistryLink;

/// A registered primitive refinement. Clones are the same definition.
#[derive(Debug, Clone)]
pub struct PrimitiveDefinition {
    inner: Arc<PrimitiveInner>,
}

#[derive(Debug)]
struct PrimitiveInner {
    label: String,
    base_type: BaseType,
    predicate: Option<Predicate>,
    registry: RegistryLink,
}

impl PrimitiveDefinition {
    pub(crate) fn build(
        registry: RegistryLink,
        label: &str,
        base_type: BaseType,
        predicate: Option<Predicate>,
    ) -> Self {
        Self {
            inner: Arc::new(PrimitiveInner {
                label: label.to_string(),
                base_type,
                predicate,
                registry,
            }),
        }
    }

    /// The label.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// The scalar type being refined.
    pub fn base_type(&self) -> BaseType {
        self.inner.base_type
    }

    /// The refinement predicate, if any.
    pub fn predicate(&self) -> Option<&Predicate> {
        self.inner.predicate.as_ref()
    }

    /// Whether two handles are the same definition.
    pub fn ptr_eq(&self, other: &PrimitiveDefinition) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Check `value` and hand it back unchanged.
    ///
    /// # Errors
    ///
    /// `ValueTypeMismatch` if the JSON type differs from the base type;
    /// `ValuePredicateFailed` (naming the predicate) if the refinement
    /// rejects it.
    pub fn create(&self, value: &Value) -> Result<Value, NominalError> {
        match self.check(value) {
            Ok(()) => {
                self.inner.registry.notify(
                    self.label(),
                    DefinitionKind::Primitive,
                    ObservationEvent::Created,
                );
                Ok(value.clone())
            }
            Err(err) => {
                tracing::trace!(label = self.label(), error = %err, "primitive validation failed");
                Err(err)
            }
        }
    }

    /// Whether `value` would be accepted by [`create`](Self::create).
    pub fn validate(&self, value: &Value) -> bool {
        let valid = self.accepts(value);
        self.inner.registry.notify(
            self.label(),
            DefinitionKind::Primitive,
            ObservationEvent::Validated { valid },
        );
        valid
    }

    pub(crate) fn accepts(&self, value: &Value) -> bool {
        self.check(value).is_ok()
    }

    fn check(&self, value: &Value) -> Result<(), NominalError> {
        if !self.inner.base_type.matches(value) {
            return Err(NominalError::ValueTypeMismatch {
                label: self.label().to_string(),
                expected: self.inner.base_type.as_str().to_string(),
                actual: json_type_name(value).to_string(),
            });
        }
        match &self.inner.predicate {
            Some(predicate) if !predicate.test(value) => Err(NominalError::ValuePredicateFailed {
                label: self.label().to_string(),
                predicate: predicate.name().to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use serde_json::json;

    fn is_positive(value: &Value) -> bool {
        value.as_f64().is_some_and(|n| n > 0.0)
    }

    #[test]
    fn test_positive_number_refinement() {
        let registry = Registry::new();
        let def = registry
            .define_primitive("PositiveNumber", BaseType::Number, Some(Predicate::new(is_positive)))
            .unwrap();

        assert_eq!(def.create(&json!(5)).unwrap(), json!(5));

        let err = def.create(&json!(-1)).unwrap_err();
        assert!(err.to_string().contains("is_positive"), "{err}");

        let err = def.create(&json!("5")).unwrap_err();
        assert!(err.to_string().contains("expected type \"number\""), "{err}");
    }

    #[test]
    fn test_no_predicate_checks_type_only() {
        let registry = Registry::new();
        let def = registry
            .define_primitive("Flag", BaseType::Boolean, None)
            .unwrap();
        assert!(def.validate(&json!(true)));
        assert!(!def.validate(&json!(1)));
        assert!(!def.validate(&Value::Null));
    }

    #[test]
    fn test_anonymous_predicate_message() {
        let registry = Registry::new();
        let def = registry
            .define_primitive(
                "Short",
                BaseType::String,
                Some(Predicate::new(|v: &Value| v.as_str().is_some_and(|s| s.len() < 4))),
            )
            .unwrap();
        let err = def.create(&json!("too long")).unwrap_err();
        assert_eq!(
            err,
            NominalError::ValuePredicateFailed {
                label: "Short".to_string(),
                predicate: "anonymous".to_string(),
            }
        );
    }

    #[test]
    fn test_redefine_returns_same_definition() {
        let registry = Registry::new();
        let a = registry
            .define_primitive("Name", BaseType::String, None)
            .unwrap();
        let b = registry
            .define_primitive("Name", BaseType::Number, None)
            .unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(b.base_type(), BaseType::String);
    }
}
