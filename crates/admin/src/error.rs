//! Unified error handling for admin.

use thiserror::Error;

use salesdesk_core::ValidationErrors;

use crate::config::ConfigError;
use crate::db::{RepositoryError, StorageError};
use crate::models::UnknownSetting;
use crate::services::{AuthError, SeedError};

/// Application-level error type for front ends.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed field validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Storage backend could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Seeding failed.
    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A settings change could not be applied.
    #[error("Bad request: {0}")]
    Settings(#[from] UnknownSetting),

    /// A protected operation was attempted without logging in.
    #[error("Unauthorized: log in first")]
    NotAuthenticated,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Whether the error was caused by the caller's input rather than the
    /// system, so it can be reported without a stack of context.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Settings(_) | Self::NotAuthenticated | Self::NotFound(_)
        )
    }
}
