//! Stored login credentials.
//!
//! The `users` slot holds `{username, password}` records. The `password` field
//! normally carries an Argon2 PHC string, but records written by older clients
//! hold the password itself. [`PasswordDigest`] keeps both forms readable and
//! lets callers tell them apart without exposing the value in `Debug` output.

use serde::{Deserialize, Serialize};

/// Prefix shared by all PHC-format password hashes.
const PHC_PREFIX: char = '$';

/// A persisted user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    /// Login name. Not required to be unique.
    pub username: String,
    /// Password hash (or legacy plaintext).
    pub password: PasswordDigest,
}

/// The persisted form of a password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a PHC hash string produced by a password hasher.
    #[must_use]
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Whether this record holds a PHC hash rather than a plaintext password.
    #[must_use]
    pub fn is_hashed(&self) -> bool {
        self.0.starts_with(PHC_PREFIX)
    }

    /// Raw stored value, for verification only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_hashed() {
            f.write_str("PasswordDigest([HASHED])")
        } else {
            f.write_str("PasswordDigest([PLAINTEXT REDACTED])")
        }
    }
}
