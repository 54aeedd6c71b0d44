//! # Named Predicates
//!
//! A [`Predicate`] is a boolean test over a JSON value that carries a name,
//! so that a failed refinement can say *which* check rejected the value.
//!
//! Names are either given explicitly with [`Predicate::named`] or derived
//! from the function item passed to [`Predicate::new`]: `is_positive`
//! yields `"is_positive"`. Closures and coerced `fn` pointers have no
//! usable name and get [`ANONYMOUS`]. Derived names come from
//! `std::any::type_name` and are best-effort.
//!
//! ## Panic Invariant
//!
//! [`Predicate::test`] never unwinds into the caller. A panicking test
//! counts as a failed check and is logged at `warn`, so `validate`,
//! `is_of_*` and `safe_parse_*` stay total whatever the predicate does.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;

/// Name reported for predicates built from closures.
pub const ANONYMOUS: &str = "anonymous";

type TestFn = dyn Fn(&Value) -> bool + Send + Sync;

/// A named, shareable boolean test over a JSON value.
#[derive(Clone)]
pub struct Predicate {
    name: Arc<str>,
    test: Arc<TestFn>,
}

impl Predicate {
    /// Wrap a function, deriving the name from its type.
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            name: derive_name::<F>().into(),
            test: Arc::new(test),
        }
    }

    /// Wrap a function under an explicit name.
    pub fn named<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            name: if name.is_empty() { ANONYMOUS.into() } else { name.into() },
            test: Arc::new(test),
        }
    }

    /// The predicate name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the test. A panic inside the test yields `false`.
    pub fn test(&self, value: &Value) -> bool {
        match catch_unwind(AssertUnwindSafe(|| (self.test)(value))) {
            Ok(passed) => passed,
            Err(_) => {
                tracing::warn!(predicate = %self.name, "predicate panicked, treating as failed");
                false
            }
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.name).finish()
    }
}

fn derive_name<F>() -> String {
    let full = std::any::type_name::<F>();
    if full.contains("{{closure}}") || full.starts_with("fn(") || full.starts_with("for<") {
        return ANONYMOUS.to_string();
    }
    // Drop generic arguments, then the module path.
    let base = full.split('<').next().unwrap_or(full);
    if base.contains(|c: char| matches!(c, '(' | ')' | '&') || c.is_whitespace()) {
        return ANONYMOUS.to_string();
    }
    match base.rsplit("::").next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => ANONYMOUS.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn is_positive(value: &Value) -> bool {
        value.as_f64().is_some_and(|n| n > 0.0)
    }

    #[test]
    fn test_name_derived_from_fn_item() {
        let p = Predicate::new(is_positive);
        assert_eq!(p.name(), "is_positive");
        assert!(p.test(&json!(5)));
        assert!(!p.test(&json!(-1)));
    }

    #[test]
    fn test_closure_is_anonymous() {
        let p = Predicate::new(|v: &Value| v.is_string());
        assert_eq!(p.name(), ANONYMOUS);
    }

    #[test]
    fn test_fn_pointer_is_anonymous() {
        let f: fn(&Value) -> bool = is_positive;
        let p = Predicate::new(f);
        assert_eq!(p.name(), ANONYMOUS);
        assert!(p.test(&json!(2)));
    }

    #[test]
    fn test_panicking_predicate_fails_closed() {
        let p = Predicate::named("explodes", |v: &Value| {
            if v.is_null() {
                panic!("null reached the predicate");
            }
            true
        });
        assert!(!p.test(&Value::Null));
        assert!(p.test(&json!(1)));
    }

    #[test]
    fn test_explicit_name() {
        let p = Predicate::named("non_empty", |v: &Value| {
            v.as_str().is_some_and(|s| !s.is_empty())
        });
        assert_eq!(p.name(), "non_empty");
        assert!(!p.test(&json!("")));
        assert_eq!(format!("{p:?}"), "Predicate(\"non_empty\")");
    }

    #[test]
    fn test_empty_explicit_name_falls_back() {
        let p = Predicate::named("", |_: &Value| true);
        assert_eq!(p.name(), ANONYMOUS);
    }
}
