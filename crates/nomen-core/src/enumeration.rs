//! # Enumerated Sets
//!
//! An [`EnumDefinition`] is a named, closed set of string members. It is
//! the target of `enum` cross-reference fields and is exported as an
//! `enum` constraint. Members keep their registration order.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::error::NominalError;
use crate::kind::{json_type_name, BaseType, DefinitionKind};
use crate::observe::ObservationEvent;
use crate::registry::RegistryLink;

/// A registered enumerated set. Clones are the same definition.
#[derive(Debug, Clone)]
pub struct EnumDefinition {
    inner: Arc<EnumInner>,
}

#[derive(Debug)]
struct EnumInner {
    label: String,
    members: Vec<String>,
    registry: RegistryLink,
}

impl EnumDefinition {
    pub(crate) fn build<I, S>(
        registry: RegistryLink,
        label: &str,
        members: I,
    ) -> Result<Self, NominalError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        if members.is_empty() {
            return Err(NominalError::invalid_definition(label, "enum has no members"));
        }
        let mut seen = HashSet::new();
        for member in &members {
            if member.is_empty() {
                return Err(NominalError::invalid_definition(label, "empty enum member"));
            }
            if !seen.insert(member.as_str()) {
                return Err(NominalError::invalid_definition(
                    label,
                    format!("duplicate enum member {member:?}"),
                ));
            }
        }
        Ok(Self {
            inner: Arc::new(EnumInner {
                label: label.to_string(),
                members,
                registry,
            }),
        })
    }

    /// The label.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Members in registration order.
    pub fn members(&self) -> &[String] {
        &self.inner.members
    }

    /// Whether `member` belongs to the set.
    pub fn contains(&self, member: &str) -> bool {
        self.inner.members.iter().any(|m| m == member)
    }

    /// Whether two handles are the same definition.
    pub fn ptr_eq(&self, other: &EnumDefinition) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Check `value` and return the member it names.
    ///
    /// # Errors
    ///
    /// `ValueTypeMismatch` for non-strings, `NotAMember` for unknown strings.
    pub fn create(&self, value: &Value) -> Result<String, NominalError> {
        match self.check(value) {
            Ok(member) => {
                self.inner.registry.notify(
                    self.label(),
                    DefinitionKind::Enum,
                    ObservationEvent::Created,
                );
                Ok(member.to_string())
            }
            Err(err) => {
                tracing::trace!(label = self.label(), error = %err, "enum validation failed");
                Err(err)
            }
        }
    }

    /// Whether `value` is a member.
    pub fn validate(&self, value: &Value) -> bool {
        let valid = self.accepts(value);
        self.inner.registry.notify(
            self.label(),
            DefinitionKind::Enum,
            ObservationEvent::Validated { valid },
        );
        valid
    }

    pub(crate) fn accepts(&self, value: &Value) -> bool {
        self.check(value).is_ok()
    }

    fn check<'a>(&self, value: &'a Value) -> Result<&'a str, NominalError> {
        let Some(member) = value.as_str() else {
            return Err(NominalError::ValueTypeMismatch {
                label: self.label().to_string(),
                expected: BaseType::String.as_str().to_string(),
                actual: json_type_name(value).to_string(),
            });
        };
        if self.contains(member) {
            Ok(member)
        } else {
            Err(NominalError::NotAMember {
                label: self.label().to_string(),
                value: member.to_string(),
                members: self.inner.members.clone(),
            })
        }
    }
}
