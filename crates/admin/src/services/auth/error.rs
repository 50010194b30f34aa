//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
///
/// A wrong username or password is not an error: `login` returns `Ok(false)`.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A sign-up field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository error.
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}
