//! # nomen-schema — Schema Export for Record Definitions
//!
//! Turns a [`RecordDefinition`](nomen_core::RecordDefinition) into a
//! description other tools can consume. Exporters read the static schema
//! and resolve cross-references through the definition's registry; they
//! never touch instances and never fail.
//!
//! ## JSON Schema (`json_schema`)
//!
//! [`to_json_schema`] emits a draft 2020-12 document with `properties`,
//! `required`, `enum` members for enum references and `format` annotations
//! for well-known primitive labels (`Email`, `Url`, `Uuid`, `DateTime`,
//! `Date`).
//!
//! ## Zod (`zod`)
//!
//! [`to_zod_schema`] emits `{interfaceId, version, fields}` with one Zod
//! type expression per field. [`ZodSchema::render`] produces the matching
//! `export const <Label>Schema = z.object({...});` statement.
//!
//! ## Crate Policy
//!
//! - Depends only on `nomen-core` internally.
//! - Output is a function of the schema and registry contents only; field
//!   declaration order never changes it.
//! - Unresolved references degrade to a generic type and are logged at
//!   `debug` level.

pub mod json_schema;
mod reference;
pub mod zod;

pub use json_schema::{to_json_schema, JSON_SCHEMA_DIALECT};
pub use zod::{to_zod_schema, ZodField, ZodSchema};
