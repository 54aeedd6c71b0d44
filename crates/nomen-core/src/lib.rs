//! # nomen-core — Runtime Nominal Typing for JSON Data
//!
//! Two JSON objects with the same shape are structurally identical. This
//! crate lets a program tell, at runtime, "values produced under label A"
//! from "values produced under label B" anyway: a label names a definition,
//! a definition validates untrusted input, and a successful validation
//! produces a branded, immutable instance that guards can recognise.
//!
//! ## Key Design Principles
//!
//! 1. **One label, one definition.** The [`Registry`] maps each label to
//!    exactly one definition across every kind (record, primitive, enum,
//!    opaque). `define_*` is idempotent per label and fails on kind
//!    conflicts. [`Registry::global`] is the single process-wide table.
//!
//! 2. **Validate, then brand.** [`RecordDefinition::create`] checks every
//!    schema field in a fixed order, resolves cross-references through the
//!    registry, and returns a frozen [`RecordInstance`]. Nothing partial is
//!    ever returned or registered.
//!
//! 3. **Invisible brand.** The label lives in a private field. Serializing
//!    an instance yields exactly its field data; only [`is_of_record`] and
//!    friends can see the brand.
//!
//! 4. **Primitives are checked, not tagged.** A [`PrimitiveDefinition`]
//!    proves a scalar passed a named check; the scalar is returned as is.
//!
//! 5. **Total entry points.** `validate`, `is_of_*` and `safe_parse_*`
//!    never fail; safe-parse returns a structured [`ParseError`].
//!
//! ## Example
//!
//! ```
//! use nomen_core::{is_of_record, FieldDescriptor, RecordOptions, RecordSchema, Registry};
//! use serde_json::json;
//!
//! let registry = Registry::new();
//! let user = registry
//!     .define_record(
//!         "User",
//!         RecordSchema::new()
//!             .field("name", FieldDescriptor::string())
//!             .field("age", FieldDescriptor::number()),
//!         RecordOptions::default(),
//!     )
//!     .unwrap();
//!
//! let alice = user.create(&json!({"name": "Alice", "age": 30})).unwrap();
//! assert!(is_of_record(&alice, &user));
//! assert_eq!(serde_json::to_value(&alice).unwrap(), json!({"name": "Alice", "age": 30}));
//! ```
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Logging through `tracing` only; the crate never installs a subscriber.

pub mod builtin;
pub mod enumeration;
pub mod error;
pub mod field;
pub mod guard;
pub mod instance;
pub mod kind;
pub mod observe;
pub mod opaque;
pub mod predicate;
pub mod primitive;
pub mod record;
pub mod registry;

// Re-export primary types for ergonomic imports.
pub use builtin::{register_builtins, WellKnownFormat};
pub use enumeration::EnumDefinition;
pub use error::NominalError;
pub use field::{FieldDescriptor, RecordSchema};
pub use guard::{
    assert_of_primitive, assert_of_record, is_of_enum, is_of_opaque, is_of_primitive,
    is_of_record, safe_parse_enum, safe_parse_label, safe_parse_primitive, safe_parse_record,
    Candidate, ParseError, ParseErrorCode,
};
pub use instance::RecordInstance;
pub use kind::{json_type_name, BaseType, DefinitionKind, FieldType};
pub use observe::{Observation, ObservationEvent, ObserverId};
pub use opaque::{OpaqueDefinition, OpaqueValue};
pub use predicate::Predicate;
pub use primitive::PrimitiveDefinition;
pub use record::{FieldIssue, RecordDefinition, RecordOptions};
pub use registry::{
    all_labels, define_enum, define_opaque, define_primitive, define_record, lookup, Definition,
    Registry, RegistryEntry,
};
