//! # Type Guards & Safe-Parse
//!
//! Guards answer "was this value produced under label L?" by reading the
//! brand, never by re-validating fields. Safe-parse is the non-failing
//! entry point: it passes already-branded instances through and brands
//! plain data that validates, returning a structured [`ParseError`]
//! otherwise.
//!
//! ## Totality Invariant
//!
//! `is_of_*` return `bool` and `safe_parse_*` return
//! `Result<_, ParseError>` for every input, including `null`, scalars,
//! arrays and labels that are not registered. A panicking field or
//! primitive predicate counts as a failed check (see
//! [`Predicate::test`](crate::predicate::Predicate::test)).

use serde::Serialize;
use serde_json::Value;

use crate::enumeration::EnumDefinition;
use crate::error::NominalError;
use crate::instance::RecordInstance;
use crate::kind::{json_type_name, DefinitionKind};
use crate::opaque::{OpaqueDefinition, OpaqueValue};
use crate::primitive::PrimitiveDefinition;
use crate::record::{FieldIssue, RecordDefinition};
use crate::registry::Registry;

/// Input to a guard: plain data or a branded value.
///
/// Plain JSON never carries a brand.
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'a> {
    /// Unbranded JSON.
    Plain(&'a Value),
    /// A branded record instance.
    Record(&'a RecordInstance),
    /// A branded opaque value.
    Opaque(&'a OpaqueValue),
}

impl<'a> From<&'a Value> for Candidate<'a> {
    fn from(value: &'a Value) -> Self {
        Self::Plain(value)
    }
}

impl<'a> From<&'a RecordInstance> for Candidate<'a> {
    fn from(instance: &'a RecordInstance) -> Self {
        Self::Record(instance)
    }
}

impl<'a> From<&'a OpaqueValue> for Candidate<'a> {
    fn from(value: &'a OpaqueValue) -> Self {
        Self::Opaque(value)
    }
}

impl Candidate<'_> {
    /// The record label this candidate is branded with.
    pub fn record_label(&self) -> Option<&str> {
        match self {
            Self::Record(instance) => Some(instance.label()),
            Self::Plain(_) | Self::Opaque(_) => None,
        }
    }

    /// Plain JSON view of the candidate's data.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Plain(value) => (*value).clone(),
            Self::Record(instance) => instance.to_value(),
            Self::Opaque(value) => value.value().clone(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Plain(value) => json_type_name(value),
            Self::Record(_) => "object",
            Self::Opaque(value) => json_type_name(value.value()),
        }
    }
}

/// Failure category of a safe-parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParseErrorCode {
    /// The label is not registered as the requested kind.
    InvalidDefinition,
    /// The input has the wrong overall shape (not an object for records,
    /// wrong base type for primitives and enums).
    InvalidValueType,
    /// At least one record field failed validation.
    FieldValidationFailed,
    /// A scalar had the right type but failed its refinement or
    /// membership check.
    RefinementFailed,
}

impl ParseErrorCode {
    /// The wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidDefinition => "INVALID_DEFINITION",
            Self::InvalidValueType => "INVALID_VALUE_TYPE",
            Self::FieldValidationFailed => "FIELD_VALIDATION_FAILED",
            Self::RefinementFailed => "REFINEMENT_FAILED",
        }
    }
}

impl std::fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured safe-parse failure. Returned, never raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseError {
    /// Human-readable description.
    pub message: String,
    /// Failure category.
    pub code: ParseErrorCode,
    /// The rejected input, as plain JSON.
    pub input: Value,
    /// The label parsed against, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Every failing field, for record failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<Vec<FieldIssue>>,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    fn new(code: ParseErrorCode, message: impl Into<String>, input: Value, label: Option<&str>) -> Self {
        Self {
            message: message.into(),
            code,
            input,
            label: label.map(str::to_string),
            field_errors: None,
        }
    }

    fn from_value_error(err: NominalError, input: &Value) -> Self {
        let code = match err {
            NominalError::ValueTypeMismatch { .. } => ParseErrorCode::InvalidValueType,
            _ => ParseErrorCode::RefinementFailed,
        };
        Self::new(code, err.to_string(), input.clone(), Some(err.label()))
    }
}

// -- Records ------------------------------------------------------------------

/// Whether `candidate` is an instance branded with `definition`'s label.
pub fn is_of_record<'a>(candidate: impl Into<Candidate<'a>>, definition: &RecordDefinition) -> bool {
    candidate.into().record_label() == Some(definition.label())
}

/// The instance, if `candidate` is branded with `definition`'s label.
///
/// # Errors
///
/// `NotOfType` naming the label, exactly when [`is_of_record`] is false.
pub fn assert_of_record<'a>(
    candidate: impl Into<Candidate<'a>>,
    definition: &RecordDefinition,
) -> Result<RecordInstance, NominalError> {
    match candidate.into() {
        Candidate::Record(instance) if instance.label() == definition.label() => {
            Ok(instance.clone())
        }
        _ => Err(NominalError::NotOfType {
            label: definition.label().to_string(),
        }),
    }
}

/// Brand `candidate` under `definition` without failing.
///
/// An instance already branded with the label is returned as is (same
/// allocation). Any other object-like input is validated as plain data.
pub fn safe_parse_record<'a>(
    candidate: impl Into<Candidate<'a>>,
    definition: &RecordDefinition,
) -> Result<RecordInstance, ParseError> {
    let candidate = candidate.into();
    if let Candidate::Record(instance) = candidate {
        if instance.label() == definition.label() {
            return Ok(instance.clone());
        }
    }

    let data = candidate.to_value();
    if !data.is_object() {
        return Err(ParseError::new(
            ParseErrorCode::InvalidValueType,
            format!(
                "expected an object for \"{}\", got \"{}\"",
                definition.label(),
                candidate.type_name()
            ),
            data,
            Some(definition.label()),
        ));
    }

    match definition.create(&data) {
        Ok(instance) => Ok(instance),
        Err(err) => {
            // Headline is the fail-fast error; the list covers every field.
            let field_errors = definition.check_all(&data);
            Err(ParseError {
                field_errors: Some(field_errors),
                ..ParseError::new(
                    ParseErrorCode::FieldValidationFailed,
                    err.to_string(),
                    data,
                    Some(definition.label()),
                )
            })
        }
    }
}

impl Registry {
    /// [`safe_parse_record`] against the record registered under `label`.
    ///
    /// Fails with `INVALID_DEFINITION` if `label` is not registered, or is
    /// registered under another kind.
    pub fn safe_parse_label<'a>(
        &self,
        candidate: impl Into<Candidate<'a>>,
        label: &str,
    ) -> Result<RecordInstance, ParseError> {
        let candidate = candidate.into();
        let Some(entry) = self.lookup(label) else {
            return Err(ParseError::new(
                ParseErrorCode::InvalidDefinition,
                format!("no definition is registered under \"{label}\""),
                candidate.to_value(),
                Some(label),
            ));
        };
        match entry.definition().as_record() {
            Some(definition) => safe_parse_record(candidate, definition),
            None => Err(ParseError::new(
                ParseErrorCode::InvalidDefinition,
                format!(
                    "\"{label}\" is registered as a {} definition, not a {}",
                    entry.kind(),
                    DefinitionKind::Record
                ),
                candidate.to_value(),
                Some(label),
            )),
        }
    }
}

/// [`Registry::safe_parse_label`] on the global registry.
pub fn safe_parse_label<'a>(
    candidate: impl Into<Candidate<'a>>,
    label: &str,
) -> Result<RecordInstance, ParseError> {
    Registry::global().safe_parse_label(candidate, label)
}

// -- Primitives, enums, opaque values -----------------------------------------

/// Same as `definition.validate(value)`.
pub fn is_of_primitive(value: &Value, definition: &PrimitiveDefinition) -> bool {
    definition.validate(value)
}

/// The value, if it passes the refinement.
///
/// # Errors
///
/// The refinement error, exactly when [`is_of_primitive`] is false.
pub fn assert_of_primitive(value: &Value, definition: &PrimitiveDefinition) -> Result<Value, NominalError> {
    definition.create(value)
}

/// [`PrimitiveDefinition::create`] with a structured failure.
pub fn safe_parse_primitive(value: &Value, definition: &PrimitiveDefinition) -> Result<Value, ParseError> {
    definition
        .create(value)
        .map_err(|err| ParseError::from_value_error(err, value))
}

/// Same as `definition.validate(value)`.
pub fn is_of_enum(value: &Value, definition: &EnumDefinition) -> bool {
    definition.validate(value)
}

/// [`EnumDefinition::create`] with a structured failure.
pub fn safe_parse_enum(value: &Value, definition: &EnumDefinition) -> Result<String, ParseError> {
    definition
        .create(value)
        .map_err(|err| ParseError::from_value_error(err, value))
}

/// Whether `candidate` is an opaque value wrapped under `definition`'s label.
pub fn is_of_opaque<'a>(candidate: impl Into<Candidate<'a>>, definition: &OpaqueDefinition) -> bool {
    matches!(candidate.into(), Candidate::Opaque(value) if value.label() == definition.label())
}
