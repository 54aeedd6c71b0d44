//! # Branded Record Instances
//!
//! A [`RecordInstance`] is the frozen output of
//! [`RecordDefinition::create`](crate::RecordDefinition::create): the
//! schema's fields copied out of the input plus the label it was created
//! under.
//!
//! ## Invisibility Invariant
//!
//! The label is a private field. It is not part of `Serialize` output, of
//! [`keys`](RecordInstance::keys), or of equality against plain JSON, so a
//! serialized instance is byte-for-byte the serialized field object. The
//! only ways to observe it are [`RecordInstance::label`] and the guards in
//! [`crate::guard`].
//!
//! Instances expose no mutable access. Clones share one allocation, so a
//! clone is the same instance ([`RecordInstance::ptr_eq`]).

use std::ops::Index;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

static NULL: Value = Value::Null;

/// A validated, immutable, label-branded record.
#[derive(Debug, Clone)]
pub struct RecordInstance {
    inner: Arc<InstanceInner>,
}

#[derive(Debug)]
struct InstanceInner {
    label: Arc<str>,
    fields: Map<String, Value>,
}

impl RecordInstance {
    pub(crate) fn new(label: Arc<str>, fields: Map<String, Value>) -> Self {
        Self {
            inner: Arc::new(InstanceInner { label, fields }),
        }
    }

    /// The label this instance was created under.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// A field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.inner.fields.get(field)
    }

    /// Whether the instance holds `field`.
    pub fn contains_key(&self, field: &str) -> bool {
        self.inner.fields.contains_key(field)
    }

    /// Field names present on the instance.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.fields.keys().map(String::as_str)
    }

    /// The field map.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.inner.fields
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.inner.fields.len()
    }

    /// Whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.inner.fields.is_empty()
    }

    /// A plain JSON copy of the fields, without the label.
    pub fn to_value(&self) -> Value {
        Value::Object(self.inner.fields.clone())
    }

    /// Deserialize the fields into a host type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_value())
    }

    /// Whether two handles are the same instance.
    pub fn ptr_eq(&self, other: &RecordInstance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Serialize for RecordInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.fields.serialize(serializer)
    }
}

impl Index<&str> for RecordInstance {
    type Output = Value;

    /// Missing fields index as `null`, like `serde_json::Value`.
    fn index(&self, field: &str) -> &Value {
        self.inner.fields.get(field).unwrap_or(&NULL)
    }
}

/// Same label and same fields.
impl PartialEq for RecordInstance {
    fn eq(&self, other: &Self) -> bool {
        self.inner.label == other.inner.label && self.inner.fields == other.inner.fields
    }
}

/// Structural comparison against plain JSON; the label is ignored.
impl PartialEq<Value> for RecordInstance {
    fn eq(&self, other: &Value) -> bool {
        other.as_object() == Some(&self.inner.fields)
    }
}

impl From<RecordInstance> for Value {
    fn from(instance: RecordInstance) -> Self {
        instance.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instance() -> RecordInstance {
        let fields = json!({"name": "Alice", "age": 30});
        RecordInstance::new(
            "User".into(),
            fields.as_object().cloned().unwrap_or_default(),
        )
    }

    #[test]
    fn test_serialization_carries_no_label() {
        let inst = instance();
        let json = serde_json::to_string(&inst).unwrap();
        assert_eq!(json, r#"{"age":30,"name":"Alice"}"#);
        assert!(!json.contains("User"));
    }

    #[test]
    fn test_structural_equality_ignores_label() {
        let inst = instance();
        assert_eq!(inst, json!({"name": "Alice", "age": 30}));
        assert_ne!(inst, json!({"name": "Alice"}));
        let other = RecordInstance::new("Person".into(), inst.fields().clone());
        assert_ne!(inst, other);
    }

    #[test]
    fn test_index_missing_is_null() {
        let inst = instance();
        assert_eq!(inst["name"], "Alice");
        assert_eq!(inst["missing"], Value::Null);
    }

    #[test]
    fn test_clone_is_same_instance() {
        let a = instance();
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&instance()));
    }

    #[test]
    fn test_decode_into_host_type() {
        #[derive(serde::Deserialize)]
        struct User {
            name: String,
            age: u32,
        }
        let user: User = instance().decode().unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(user.age, 30);
    }
}
