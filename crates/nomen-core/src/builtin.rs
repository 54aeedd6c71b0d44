//! # Well-Known Refinements
//!
//! String refinements common enough to ship with the engine, and the label
//! recognition the schema exporters use to attach `format` annotations.
//!
//! | Label       | Check                                   | JSON Schema `format` |
//! |-------------|-----------------------------------------|----------------------|
//! | `Email`     | `local@domain.tld`, no whitespace       | `email`              |
//! | `Url`       | parses as an absolute URL (`url` crate) | `uri`                |
//! | `Uuid`      | parses as a UUID (`uuid` crate)         | `uuid`               |
//! | `DateTime`  | RFC 3339 timestamp (`chrono`)           | `date-time`          |
//! | `Date`      | `YYYY-MM-DD` calendar date (`chrono`)   | `date`               |
//!
//! Recognition is by label, case-insensitive, ignoring `-`, `_` and spaces,
//! so a caller's own `email` or `URI` primitive exports the same way.

use serde_json::Value;

use crate::error::NominalError;
use crate::kind::BaseType;
use crate::predicate::Predicate;
use crate::primitive::PrimitiveDefinition;
use crate::registry::Registry;

/// A string format recognised from a primitive's label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownFormat {
    /// E-mail address.
    Email,
    /// Absolute URL.
    Uri,
    /// UUID in any standard textual form.
    Uuid,
    /// RFC 3339 date-time.
    DateTime,
    /// ISO 8601 calendar date.
    Date,
}

impl WellKnownFormat {
    /// All formats, in the order they are registered by [`register_builtins`].
    pub fn all() -> &'static [WellKnownFormat] {
        &[Self::Email, Self::Uri, Self::Uuid, Self::DateTime, Self::Date]
    }

    /// Recognise a primitive label.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "email" | "emailaddress" => Some(Self::Email),
            "url" | "uri" => Some(Self::Uri),
            "uuid" | "guid" => Some(Self::Uuid),
            "datetime" | "isodatetime" | "timestamp" => Some(Self::DateTime),
            "date" | "isodate" => Some(Self::Date),
            _ => None,
        }
    }

    /// Label used by [`register_builtins`].
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Uri => "Url",
            Self::Uuid => "Uuid",
            Self::DateTime => "DateTime",
            Self::Date => "Date",
        }
    }

    /// JSON Schema `format` keyword value.
    pub fn json_schema_format(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Uri => "uri",
            Self::Uuid => "uuid",
            Self::DateTime => "date-time",
            Self::Date => "date",
        }
    }

    /// Zod string refinement method.
    pub fn zod_method(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Uri => "url",
            Self::Uuid => "uuid",
            Self::DateTime => "datetime",
            Self::Date => "date",
        }
    }

    /// Whether `s` is in this format.
    pub fn matches(&self, s: &str) -> bool {
        match self {
            Self::Email => is_email(s),
            Self::Uri => url::Url::parse(s).is_ok(),
            Self::Uuid => uuid::Uuid::parse_str(s).is_ok(),
            Self::DateTime => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
            Self::Date => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
        }
    }

    /// Predicate form of [`matches`](Self::matches), named `is_<format>`.
    pub fn predicate(self) -> Predicate {
        let name = format!("is_{}", self.json_schema_format().replace('-', "_"));
        Predicate::named(name, move |value: &Value| {
            value.as_str().is_some_and(|s| self.matches(s))
        })
    }
}

fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Define the well-known string refinements in `registry`.
///
/// Idempotent. Fails only if one of the labels is taken by another kind.
pub fn register_builtins(registry: &Registry) -> Result<Vec<PrimitiveDefinition>, NominalError> {
    WellKnownFormat::all()
        .iter()
        .map(|format| {
            registry.define_primitive(format.label(), BaseType::String, Some(format.predicate()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_recognition() {
        assert_eq!(WellKnownFormat::from_label("Email"), Some(WellKnownFormat::Email));
        assert_eq!(WellKnownFormat::from_label("email_address"), Some(WellKnownFormat::Email));
        assert_eq!(WellKnownFormat::from_label("URL"), Some(WellKnownFormat::Uri));
        assert_eq!(WellKnownFormat::from_label("UUID"), Some(WellKnownFormat::Uuid));
        assert_eq!(WellKnownFormat::from_label("date-time"), Some(WellKnownFormat::DateTime));
        assert_eq!(WellKnownFormat::from_label("PositiveNumber"), None);
    }

    #[test]
    fn test_builtin_labels_round_trip() {
        for format in WellKnownFormat::all() {
            assert_eq!(WellKnownFormat::from_label(format.label()), Some(*format));
        }
    }

    #[test]
    fn test_format_checks() {
        assert!(WellKnownFormat::Email.matches("a@b.io"));
        assert!(!WellKnownFormat::Email.matches("a@b"));
        assert!(!WellKnownFormat::Email.matches("a b@c.io"));
        assert!(WellKnownFormat::Uri.matches("https://example.com/x?y=1"));
        assert!(!WellKnownFormat::Uri.matches("example.com"));
        assert!(WellKnownFormat::Uuid.matches("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(!WellKnownFormat::Uuid.matches("67e55044"));
        assert!(WellKnownFormat::DateTime.matches("2024-01-15T12:00:00Z"));
        assert!(!WellKnownFormat::DateTime.matches("2024-01-15"));
        assert!(WellKnownFormat::Date.matches("2024-02-29"));
        assert!(!WellKnownFormat::Date.matches("2023-02-29"));
    }

    #[test]
    fn test_register_builtins() {
        let registry = Registry::new();
        let defs = register_builtins(&registry).unwrap();
        assert_eq!(defs.len(), WellKnownFormat::all().len());
        let again = register_builtins(&registry).unwrap();
        assert!(defs[0].ptr_eq(&again[0]));

        let email = registry.primitive("Email").unwrap();
        assert!(email.validate(&json!("x@y.org")));
        let err = email.create(&json!("nope")).unwrap_err();
        assert!(err.to_string().contains("is_email"));
        assert!(!email.validate(&json!(42)));
    }
}
