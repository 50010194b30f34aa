//! Subcommand implementations.
//!
//! Each command writes its result to the `out` writer it is given and
//! reports progress through `tracing`.

pub mod catalog;
pub mod dashboard;
pub mod session;
pub mod settings;
pub mod watch;

use std::io;

use salesdesk_admin::error::AppError;
use thiserror::Error;

/// Errors raised by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    App(#[from] AppError),

    /// Writing to the terminal failed.
    #[error("output error: {0}")]
    Output(#[from] io::Error),

    /// Login was refused.
    #[error("Invalid username or password")]
    LoginFailed,
}

impl CommandError {
    /// Whether the command failed because of what the user asked for, as
    /// opposed to a storage or terminal failure.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        match self {
            Self::App(e) => e.is_user_error(),
            Self::LoginFailed => true,
            Self::Output(_) => false,
        }
    }
}

/// Convert any error the admin library knows about into a `CommandError`.
pub(crate) fn app_err(err: impl Into<AppError>) -> CommandError {
    CommandError::App(err.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use salesdesk_admin::config::AdminConfig;
    use salesdesk_admin::db::MemoryStorage;
    use salesdesk_admin::state::AppState;

    /// Fresh in-memory state with the default account logged in.
    pub fn logged_in_state(seed_on_init: bool) -> AppState {
        let state = AppState::new(
            AdminConfig {
                seed_on_init,
                ..AdminConfig::default()
            },
            Arc::new(MemoryStorage::new()),
        );
        state.bootstrap().unwrap();
        let password = secrecy::SecretString::from("12345".to_owned());
        assert!(state.auth().login("waseem", &password).unwrap());
        state
    }

    pub fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use salesdesk_admin::db::RepositoryError;

    use super::*;

    #[test]
    fn test_user_errors() {
        assert!(CommandError::LoginFailed.is_user_error());
        assert!(CommandError::App(AppError::NotAuthenticated).is_user_error());
        assert!(CommandError::App(AppError::NotFound("product p1".to_owned())).is_user_error());
    }

    #[test]
    fn test_system_errors() {
        let corrupt = app_err(RepositoryError::DataCorruption("products".to_owned()));
        assert!(!corrupt.is_user_error());
        assert!(!CommandError::Output(io::Error::other("closed")).is_user_error());
    }
}
