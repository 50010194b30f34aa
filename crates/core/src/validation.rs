//! Field-level validation results.
//!
//! Validators never fail or panic: they return a [`ValidationErrors`] map from
//! field name to a user-facing message, empty when every rule passes. Callers
//! decide whether to block the mutation.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Field name to error message. Ordered by field name for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, &'static str>);

impl ValidationErrors {
    /// An empty error map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Record an error for `field`. A later error for the same field replaces
    /// the earlier one.
    pub fn add(&mut self, field: &'static str, message: &'static str) {
        self.0.insert(field, message);
    }

    /// Run `check` and record its error under `field`, returning the parsed
    /// value on success.
    pub fn check<T>(
        &mut self,
        field: &'static str,
        check: Result<T, &'static str>,
    ) -> Option<T> {
        match check {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    /// Whether every rule passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    /// Whether `field` failed.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Failing fields with their messages, ordered by field name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Require non-blank text, returning it trimmed.
pub(crate) fn required_text(value: &str, message: &'static str) -> Result<String, &'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(message)
    } else {
        Ok(trimmed.to_owned())
    }
}
