//! Phone number type.

use core::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use regex::Regex;

/// Optional leading `+`, then 7-15 ASCII digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("Invalid regex"));

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone cannot be empty")]
    Empty,
    /// The input is not 7-15 digits with an optional leading +.
    #[error("phone must be 7-15 digits with an optional leading +")]
    Malformed,
}

/// A customer phone number, stored exactly as entered.
///
/// ```
/// use salesdesk_core::Phone;
///
/// assert!(Phone::parse("+15551234567").is_ok());
/// assert!(Phone::parse("5551234").is_ok());
/// assert!(Phone::parse("123").is_err());
/// assert!(Phone::parse("555-1234").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or does not match the pattern.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }
        if !PHONE_RE.is_match(s) {
            return Err(PhoneError::Malformed);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of digits, ignoring the leading `+`.
    #[must_use]
    pub fn digit_count(&self) -> usize {
        self.0.trim_start_matches('+').len()
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
