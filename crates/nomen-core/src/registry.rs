//! # Registry — Process-Wide Label Table
//!
//! Maps each label to exactly one definition, across all
//! [`DefinitionKind`]s at once: a label used for a record can never be
//! reused for a primitive, enum or opaque wrapper, and vice versa.
//!
//! ## Global Registry
//!
//! [`Registry::global`] is the single acquisition point for the
//! process-wide registry. Every crate, plugin or embedded copy of this
//! library in the process that routes through it observes the same set of
//! labels. The free functions at the bottom of this module
//! ([`define_record`], [`lookup`], …) all use it.
//!
//! [`Registry::new`] builds an isolated registry with identical semantics.
//! Tests use isolated registries so that parallel test threads and
//! [`Registry::reset`] never interfere with one another.
//!
//! ## Concurrency Invariant
//!
//! `define_*` performs check-and-insert under one write lock. Under a race
//! the first registration wins and every other caller receives that same
//! definition; there is no last-writer-wins. No lock is held while
//! validating data or notifying observers.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::RwLock;

use crate::enumeration::EnumDefinition;
use crate::error::NominalError;
use crate::field::RecordSchema;
use crate::kind::{BaseType, DefinitionKind};
use crate::observe::{Observation, ObservationEvent, ObserverId, Observers};
use crate::opaque::OpaqueDefinition;
use crate::predicate::Predicate;
use crate::primitive::PrimitiveDefinition;
use crate::record::{RecordDefinition, RecordOptions};

/// A registered definition of any kind.
#[derive(Debug, Clone)]
pub enum Definition {
    /// Structured record.
    Record(RecordDefinition),
    /// Primitive refinement.
    Primitive(PrimitiveDefinition),
    /// Enumerated set.
    Enum(EnumDefinition),
    /// Opaque wrapper.
    Opaque(OpaqueDefinition),
}

impl Definition {
    /// The definition's label.
    pub fn label(&self) -> &str {
        match self {
            Self::Record(d) => d.label(),
            Self::Primitive(d) => d.label(),
            Self::Enum(d) => d.label(),
            Self::Opaque(d) => d.label(),
        }
    }

    /// The registry partition it belongs to.
    pub fn kind(&self) -> DefinitionKind {
        match self {
            Self::Record(_) => DefinitionKind::Record,
            Self::Primitive(_) => DefinitionKind::Primitive,
            Self::Enum(_) => DefinitionKind::Enum,
            Self::Opaque(_) => DefinitionKind::Opaque,
        }
    }

    /// The record definition, if this is one.
    pub fn as_record(&self) -> Option<&RecordDefinition> {
        match self {
            Self::Record(d) => Some(d),
            _ => None,
        }
    }

    /// The primitive definition, if this is one.
    pub fn as_primitive(&self) -> Option<&PrimitiveDefinition> {
        match self {
            Self::Primitive(d) => Some(d),
            _ => None,
        }
    }

    /// The enum definition, if this is one.
    pub fn as_enum(&self) -> Option<&EnumDefinition> {
        match self {
            Self::Enum(d) => Some(d),
            _ => None,
        }
    }

    /// The opaque definition, if this is one.
    pub fn as_opaque(&self) -> Option<&OpaqueDefinition> {
        match self {
            Self::Opaque(d) => Some(d),
            _ => None,
        }
    }
}

/// One row of the registry: `{label, kind, definition}`.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    label: String,
    kind: DefinitionKind,
    definition: Definition,
}

impl RegistryEntry {
    fn new(definition: Definition) -> Self {
        Self {
            label: definition.label().to_string(),
            kind: definition.kind(),
            definition,
        }
    }

    /// The label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The kind.
    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    /// The definition.
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Consume the entry and return the definition.
    pub fn into_definition(self) -> Definition {
        self.definition
    }
}

/// Conversion between a concrete definition type and [`Definition`].
pub(crate) trait Registrable: Clone {
    const KIND: DefinitionKind;

    fn from_definition(definition: &Definition) -> Option<&Self>;

    fn into_definition(self) -> Definition;
}

impl Registrable for RecordDefinition {
    const KIND: DefinitionKind = DefinitionKind::Record;

    fn from_definition(definition: &Definition) -> Option<&Self> {
        definition.as_record()
    }

    fn into_definition(self) -> Definition {
        Definition::Record(self)
    }
}

impl Registrable for PrimitiveDefinition {
    const KIND: DefinitionKind = DefinitionKind::Primitive;

    fn from_definition(definition: &Definition) -> Option<&Self> {
        definition.as_primitive()
    }

    fn into_definition(self) -> Definition {
        Definition::Primitive(self)
    }
}

impl Registrable for EnumDefinition {
    const KIND: DefinitionKind = DefinitionKind::Enum;

    fn from_definition(definition: &Definition) -> Option<&Self> {
        definition.as_enum()
    }

    fn into_definition(self) -> Definition {
        Definition::Enum(self)
    }
}

impl Registrable for OpaqueDefinition {
    const KIND: DefinitionKind = DefinitionKind::Opaque;

    fn from_definition(definition: &Definition) -> Option<&Self> {
        definition.as_opaque()
    }

    fn into_definition(self) -> Definition {
        Definition::Opaque(self)
    }
}

#[derive(Debug, Default)]
pub(crate) struct RegistryInner {
    entries: RwLock<HashMap<String, RegistryEntry>>,
    observers: Observers,
}

/// Back-reference from a definition to the registry it was defined in.
///
/// Weak, because the registry owns its definitions.
#[derive(Clone)]
pub(crate) struct RegistryLink(Weak<RegistryInner>);

impl RegistryLink {
    /// Look up `label`, cloning the definition out of the map.
    pub(crate) fn resolve(&self, label: &str) -> Option<Definition> {
        let inner = self.0.upgrade()?;
        let entries = inner.entries.read();
        entries.get(label).map(|e| e.definition.clone())
    }

    pub(crate) fn notify(&self, label: &str, kind: DefinitionKind, event: ObservationEvent) {
        if let Some(inner) = self.0.upgrade() {
            inner.observers.notify(&Observation {
                label: label.to_string(),
                kind,
                event,
            });
        }
    }

    pub(crate) fn registry(&self) -> Option<Registry> {
        self.0.upgrade().map(|inner| Registry { inner })
    }
}

impl std::fmt::Debug for RegistryLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.0.strong_count() > 0 {
            "RegistryLink(live)"
        } else {
            "RegistryLink(dropped)"
        })
    }
}

/// Handle to a label registry. Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

impl Registry {
    /// The process-wide registry, created on first use.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    /// An isolated, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether two handles refer to the same registry.
    pub fn ptr_eq(&self, other: &Registry) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn link(&self) -> RegistryLink {
        RegistryLink(Arc::downgrade(&self.inner))
    }

    /// Define a structured record, or return the existing record under `label`.
    ///
    /// # Errors
    ///
    /// `LabelKindConflict` if `label` is registered under another kind;
    /// `InvalidDefinition` if the label, schema or options are malformed.
    pub fn define_record(
        &self,
        label: &str,
        schema: RecordSchema,
        options: RecordOptions,
    ) -> Result<RecordDefinition, NominalError> {
        self.define(label, |link| {
            RecordDefinition::build(link, label, schema, options)
        })
    }

    /// Define a primitive refinement, or return the existing one under `label`.
    ///
    /// # Errors
    ///
    /// `LabelKindConflict` if `label` is registered under another kind;
    /// `InvalidDefinition` if the label is empty.
    pub fn define_primitive(
        &self,
        label: &str,
        base_type: BaseType,
        predicate: Option<Predicate>,
    ) -> Result<PrimitiveDefinition, NominalError> {
        self.define(label, |link| {
            Ok(PrimitiveDefinition::build(link, label, base_type, predicate))
        })
    }

    /// Define an enumerated set, or return the existing one under `label`.
    ///
    /// # Errors
    ///
    /// `LabelKindConflict` if `label` is registered under another kind;
    /// `InvalidDefinition` if the member list is empty or has empty or
    /// duplicate members.
    pub fn define_enum<I, S>(&self, label: &str, members: I) -> Result<EnumDefinition, NominalError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.define(label, |link| EnumDefinition::build(link, label, members))
    }

    /// Define an opaque wrapper, or return the existing one under `label`.
    ///
    /// # Errors
    ///
    /// `LabelKindConflict` if `label` is registered under another kind;
    /// `InvalidDefinition` if the label is empty.
    pub fn define_opaque(
        &self,
        label: &str,
        base_type: Option<BaseType>,
    ) -> Result<OpaqueDefinition, NominalError> {
        self.define(label, |link| Ok(OpaqueDefinition::build(link, label, base_type)))
    }

    fn define<D, F>(&self, label: &str, build: F) -> Result<D, NominalError>
    where
        D: Registrable,
        F: FnOnce(RegistryLink) -> Result<D, NominalError>,
    {
        if label.trim().is_empty() {
            return Err(NominalError::invalid_definition(label, "label must not be empty"));
        }

        let mut entries = self.inner.entries.write();
        if let Some(entry) = entries.get(label) {
            return match D::from_definition(&entry.definition) {
                Some(existing) => {
                    tracing::debug!(label, kind = %D::KIND, "label already defined, returning existing definition");
                    Ok(existing.clone())
                }
                None => {
                    tracing::warn!(
                        label,
                        existing = %entry.kind,
                        requested = %D::KIND,
                        "label kind conflict"
                    );
                    Err(NominalError::LabelKindConflict {
                        label: label.to_string(),
                        existing: entry.kind,
                        requested: D::KIND,
                    })
                }
            };
        }

        let definition = build(self.link())?;
        entries.insert(
            label.to_string(),
            RegistryEntry::new(definition.clone().into_definition()),
        );
        tracing::debug!(label, kind = %D::KIND, "registered definition");
        Ok(definition)
    }

    /// Insert an already-built definition under its own label.
    ///
    /// Unlike `define_*`, this is not idempotent: callers must check
    /// [`contains`](Self::contains) first and treat "already present" as
    /// success. The definition keeps resolving cross-references against
    /// the registry it was originally defined in.
    ///
    /// # Errors
    ///
    /// `DuplicateLabel` if the label is present under any kind.
    pub fn register(&self, definition: Definition) -> Result<(), NominalError> {
        let mut entries = self.inner.entries.write();
        if let Some(existing) = entries.get(definition.label()) {
            return Err(NominalError::DuplicateLabel {
                label: definition.label().to_string(),
                existing: existing.kind,
            });
        }
        let entry = RegistryEntry::new(definition);
        tracing::debug!(label = entry.label(), kind = %entry.kind(), "registered definition");
        entries.insert(entry.label.clone(), entry);
        Ok(())
    }

    /// Look up a label.
    pub fn lookup(&self, label: &str) -> Option<RegistryEntry> {
        self.inner.entries.read().get(label).cloned()
    }

    /// Whether `label` is registered under any kind.
    pub fn contains(&self, label: &str) -> bool {
        self.inner.entries.read().contains_key(label)
    }

    /// The record registered under `label`.
    pub fn record(&self, label: &str) -> Option<RecordDefinition> {
        self.lookup(label)
            .and_then(|e| e.definition.as_record().cloned())
    }

    /// The primitive registered under `label`.
    pub fn primitive(&self, label: &str) -> Option<PrimitiveDefinition> {
        self.lookup(label)
            .and_then(|e| e.definition.as_primitive().cloned())
    }

    /// The enum registered under `label`.
    pub fn enumeration(&self, label: &str) -> Option<EnumDefinition> {
        self.lookup(label).and_then(|e| e.definition.as_enum().cloned())
    }

    /// The opaque wrapper registered under `label`.
    pub fn opaque(&self, label: &str) -> Option<OpaqueDefinition> {
        self.lookup(label)
            .and_then(|e| e.definition.as_opaque().cloned())
    }

    /// All registered labels, sorted.
    pub fn all_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.inner.entries.read().keys().cloned().collect();
        labels.sort();
        labels
    }

    /// Snapshot of every entry, sorted by label.
    pub fn entries(&self) -> Vec<RegistryEntry> {
        let mut entries: Vec<RegistryEntry> =
            self.inner.entries.read().values().cloned().collect();
        entries.sort_by(|a, b| a.label.cmp(&b.label));
        entries
    }

    /// Number of registered labels.
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry. Intended for tests only.
    ///
    /// Definitions handed out before the reset keep working, but their
    /// cross-references resolve against the now-empty table.
    pub fn reset(&self) {
        let mut entries = self.inner.entries.write();
        tracing::debug!(cleared = entries.len(), "registry reset");
        entries.clear();
    }

    /// Subscribe to `create`/`validate` observations on this registry's
    /// definitions.
    pub fn subscribe<F>(&self, listener: F) -> ObserverId
    where
        F: Fn(&Observation) + Send + Sync + 'static,
    {
        self.inner.observers.subscribe(Arc::new(listener))
    }

    /// Remove a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.inner.observers.unsubscribe(id)
    }
}

// -- Process-wide shortcuts ---------------------------------------------------

/// [`Registry::define_record`] on the global registry.
pub fn define_record(
    label: &str,
    schema: RecordSchema,
    options: RecordOptions,
) -> Result<RecordDefinition, NominalError> {
    Registry::global().define_record(label, schema, options)
}

/// [`Registry::define_primitive`] on the global registry.
pub fn define_primitive(
    label: &str,
    base_type: BaseType,
    predicate: Option<Predicate>,
) -> Result<PrimitiveDefinition, NominalError> {
    Registry::global().define_primitive(label, base_type, predicate)
}

/// [`Registry::define_enum`] on the global registry.
pub fn define_enum<I, S>(label: &str, members: I) -> Result<EnumDefinition, NominalError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Registry::global().define_enum(label, members)
}

/// [`Registry::define_opaque`] on the global registry.
pub fn define_opaque(
    label: &str,
    base_type: Option<BaseType>,
) -> Result<OpaqueDefinition, NominalError> {
    Registry::global().define_opaque(label, base_type)
}

/// [`Registry::lookup`] on the global registry.
pub fn lookup(label: &str) -> Option<RegistryEntry> {
    Registry::global().lookup(label)
}

/// [`Registry::all_labels`] on the global registry.
pub fn all_labels() -> Vec<String> {
    Registry::global().all_labels()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDescriptor;

    fn user_schema() -> RecordSchema {
        RecordSchema::new()
            .field("name", FieldDescriptor::string())
            .field("age", FieldDescriptor::number())
    }

    #[test]
    fn test_define_is_idempotent_per_label() {
        let registry = Registry::new();
        let first = registry
            .define_record("User", user_schema(), RecordOptions::default())
            .unwrap();
        let second = registry
            .define_record("User", RecordSchema::new(), RecordOptions::default().with_version(7))
            .unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(second.version(), 1);
        assert_eq!(second.schema().len(), 2);
    }

    #[test]
    fn test_kind_conflict_either_order() {
        let registry = Registry::new();
        registry
            .define_record("Shared", user_schema(), RecordOptions::default())
            .unwrap();
        let err = registry
            .define_primitive("Shared", BaseType::String, None)
            .unwrap_err();
        assert!(matches!(
            err,
            NominalError::LabelKindConflict {
                existing: DefinitionKind::Record,
                requested: DefinitionKind::Primitive,
                ..
            }
        ));

        let registry = Registry::new();
        registry
            .define_primitive("Shared", BaseType::String, None)
            .unwrap();
        let err = registry
            .define_record("Shared", user_schema(), RecordOptions::default())
            .unwrap_err();
        assert!(matches!(err, NominalError::LabelKindConflict { .. }));
        assert_eq!(
            registry.lookup("Shared").unwrap().kind(),
            DefinitionKind::Primitive
        );
    }

    #[test]
    fn test_empty_label_rejected() {
        let registry = Registry::new();
        let err = registry.define_enum("  ", ["a"]).unwrap_err();
        assert!(matches!(err, NominalError::InvalidDefinition { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failed_define_registers_nothing() {
        let registry = Registry::new();
        let schema = RecordSchema::new().field("status", FieldDescriptor::enum_ref(""));
        assert!(registry
            .define_record("Order", schema, RecordOptions::default())
            .is_err());
        assert!(!registry.contains("Order"));
    }

    #[test]
    fn test_register_rejects_duplicates_of_any_kind() {
        let source = Registry::new();
        let status = source.define_enum("Status", ["open", "closed"]).unwrap();

        let target = Registry::new();
        target.register(Definition::Enum(status.clone())).unwrap();
        let err = target.register(Definition::Enum(status)).unwrap_err();
        assert_eq!(
            err,
            NominalError::DuplicateLabel {
                label: "Status".to_string(),
                existing: DefinitionKind::Enum,
            }
        );
    }

    #[test]
    fn test_lookup_and_labels() {
        let registry = Registry::new();
        registry.define_opaque("Token", None).unwrap();
        registry.define_enum("Color", ["red"]).unwrap();
        registry
            .define_primitive("Age", BaseType::Number, None)
            .unwrap();

        assert_eq!(registry.all_labels(), vec!["Age", "Color", "Token"]);
        assert!(registry.lookup("Missing").is_none());
        let entry = registry.lookup("Color").unwrap();
        assert_eq!(entry.label(), "Color");
        assert_eq!(entry.kind(), DefinitionKind::Enum);
        assert!(registry.enumeration("Color").is_some());
        assert!(registry.record("Color").is_none());
        let kinds: Vec<DefinitionKind> = registry.entries().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![DefinitionKind::Primitive, DefinitionKind::Enum, DefinitionKind::Opaque]
        );
    }

    #[test]
    fn test_reset_clears_entries() {
        let registry = Registry::new();
        registry.define_enum("Color", ["red"]).unwrap();
        assert_eq!(registry.len(), 1);
        registry.reset();
        assert!(registry.is_empty());
        // The label is free again, under any kind.
        registry
            .define_primitive("Color", BaseType::String, None)
            .unwrap();
    }

    #[test]
    fn test_global_is_a_single_instance() {
        assert!(Registry::global().ptr_eq(Registry::global()));
        let isolated = Registry::new();
        assert!(!isolated.ptr_eq(Registry::global()));
    }

    #[test]
    fn test_global_shortcuts() {
        let def = define_enum("registry.tests.GlobalShortcutColor", ["red", "green"]).unwrap();
        let entry = lookup("registry.tests.GlobalShortcutColor").unwrap();
        assert_eq!(entry.kind(), DefinitionKind::Enum);
        assert!(all_labels().contains(&def.label().to_string()));
    }
}
