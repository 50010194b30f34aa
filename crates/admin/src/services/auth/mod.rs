//! Authentication service.
//!
//! A single persisted flag gates the protected commands. It is process-wide,
//! not per user: whoever logged in last turned it on, and `logout` turns it
//! off for everyone sharing the data directory.
//!
//! Passwords are stored as Argon2id PHC strings. Records written before
//! hashing was introduced hold the password itself; those still verify, with
//! a warning.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use salesdesk_core::{PasswordDigest, StoredUser};

use crate::db::{Storage, UserRepository};

/// Username of the account created on first run.
pub const DEFAULT_USERNAME: &str = "waseem";
/// Password of the account created on first run.
pub const DEFAULT_PASSWORD: &str = "12345";

/// Whether protected commands are currently allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

impl AuthState {
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(storage: &'a dyn Storage) -> Self {
        Self {
            users: UserRepository::new(storage),
        }
    }

    /// Create the default account if no user list exists yet.
    ///
    /// Returns `true` if the account was created by this call.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails, or a repository
    /// error.
    #[instrument(skip(self))]
    pub fn initialize(&self) -> Result<bool, AuthError> {
        if self.users.exists()? {
            return Ok(false);
        }
        let default_user = StoredUser {
            username: DEFAULT_USERNAME.to_owned(),
            password: hash_password(DEFAULT_PASSWORD)?,
        };
        let created = self.users.ensure_default(&default_user)?;
        if created {
            info!(username = DEFAULT_USERNAME, "created default user");
        }
        Ok(created)
    }

    /// Check credentials and, on success, set the authentication flag.
    ///
    /// Usernames need not be unique, so every record with a matching
    /// username is tried. A failed login leaves the flag as it was and
    /// returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the user list cannot be read or the flag
    /// cannot be written.
    #[instrument(skip(self, password))]
    pub fn login(&self, username: &str, password: &SecretString) -> Result<bool, AuthError> {
        let verified = self
            .users
            .users()?
            .iter()
            .filter(|user| user.username == username)
            .any(|user| verify_password(password.expose_secret(), &user.password));
        if !verified {
            info!("login failed");
            return Ok(false);
        }
        self.users.set_auth_flag(true)?;
        info!("logged in");
        Ok(true)
    }

    /// Clear the authentication flag.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the flag cannot be written.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), AuthError> {
        self.users.set_auth_flag(false)?;
        info!("logged out");
        Ok(())
    }

    /// Whether the authentication flag is set.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the flag cannot be read.
    pub fn is_authenticated(&self) -> Result<bool, AuthError> {
        Ok(self.users.auth_flag()?)
    }

    /// The current authentication state.
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::is_authenticated`].
    pub fn state(&self) -> Result<AuthState, AuthError> {
        Ok(if self.is_authenticated()? {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        })
    }

    /// Register a new user. Usernames are not required to be unique and no
    /// password strength rules apply; blank fields are rejected.
    ///
    /// Registration does not log the user in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` for a blank username or password,
    /// `AuthError::PasswordHash` if hashing fails, or a repository error.
    #[instrument(skip(self, password))]
    pub fn register_user(&self, username: &str, password: &SecretString) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        if password.expose_secret().is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        self.users.append(StoredUser {
            username: username.to_owned(),
            password: hash_password(password.expose_secret())?,
        })?;
        info!("registered user");
        Ok(())
    }

    /// Every registered username, in registration order.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the user list cannot be read.
    pub fn users(&self) -> Result<Vec<String>, AuthError> {
        Ok(self
            .users
            .users()?
            .into_iter()
            .map(|user| user.username)
            .collect())
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<PasswordDigest, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| PasswordDigest::from_phc(hash.to_string()))
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored digest.
fn verify_password(password: &str, stored: &PasswordDigest) -> bool {
    if !stored.is_hashed() {
        warn!("verifying against a plaintext password record");
        return stored.expose() == password;
    }
    let Ok(parsed_hash) = PasswordHash::new(stored.expose()) else {
        warn!("stored password hash is malformed");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{MemoryStorage, Precondition};

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let storage = MemoryStorage::new();
        let auth = AuthService::new(&storage);
        assert!(auth.initialize().unwrap());
        assert!(!auth.initialize().unwrap());
        assert_eq!(auth.users().unwrap(), vec![DEFAULT_USERNAME.to_owned()]);
    }

    #[test]
    fn test_initialize_keeps_existing_users() {
        let storage = MemoryStorage::new();
        storage.write("users", "[]", Precondition::Any).unwrap();
        let auth = AuthService::new(&storage);
        assert!(!auth.initialize().unwrap());
        assert!(auth.users().unwrap().is_empty());
    }

    #[test]
    fn test_default_login_flow() {
        let storage = MemoryStorage::new();
        let auth = AuthService::new(&storage);
        auth.initialize().unwrap();
        assert_eq!(auth.state().unwrap(), AuthState::Unauthenticated);

        assert!(auth.login("waseem", &secret("12345")).unwrap());
        assert_eq!(auth.state().unwrap(), AuthState::Authenticated);

        auth.logout().unwrap();
        assert!(!auth.is_authenticated().unwrap());
    }

    #[test]
    fn test_failed_login_leaves_state() {
        let storage = MemoryStorage::new();
        let auth = AuthService::new(&storage);
        auth.initialize().unwrap();

        assert!(!auth.login("waseem", &secret("wrong")).unwrap());
        assert!(!auth.login("nobody", &secret("12345")).unwrap());
        assert!(!auth.login("Waseem", &secret("12345")).unwrap());
        assert!(!auth.is_authenticated().unwrap());

        auth.login("waseem", &secret("12345")).unwrap();
        assert!(!auth.login("waseem", &secret("wrong")).unwrap());
        assert!(auth.is_authenticated().unwrap());
    }

    #[test]
    fn test_register_then_login() {
        let storage = MemoryStorage::new();
        let auth = AuthService::new(&storage);
        auth.register_user("amy", &secret("hunter2")).unwrap();
        assert!(!auth.is_authenticated().unwrap());
        assert!(auth.login("amy", &secret("hunter2")).unwrap());

        let raw = storage.read("users").unwrap().unwrap().value;
        assert!(!raw.contains("hunter2"));
        assert!(raw.contains("$argon2"));
    }

    #[test]
    fn test_register_rejects_blank_fields() {
        let storage = MemoryStorage::new();
        let auth = AuthService::new(&storage);
        assert!(matches!(
            auth.register_user("  ", &secret("x")),
            Err(AuthError::MissingField("username"))
        ));
        assert!(matches!(
            auth.register_user("amy", &secret("")),
            Err(AuthError::MissingField("password"))
        ));
        assert!(storage.read("users").unwrap().is_none());
    }

    #[test]
    fn test_plaintext_record_still_logs_in() {
        let storage = MemoryStorage::new();
        storage
            .write(
                "users",
                r#"[{"username":"waseem","password":"12345"}]"#,
                Precondition::Any,
            )
            .unwrap();
        let auth = AuthService::new(&storage);
        assert!(auth.login("waseem", &secret("12345")).unwrap());
    }

    #[test]
    fn test_duplicate_usernames_each_password_works() {
        let storage = MemoryStorage::new();
        let auth = AuthService::new(&storage);
        auth.register_user("amy", &secret("first")).unwrap();
        auth.register_user("amy", &secret("second")).unwrap();
        assert_eq!(auth.users().unwrap().len(), 2);
        assert!(auth.login("amy", &secret("first")).unwrap());
        auth.logout().unwrap();
        assert!(auth.login("amy", &secret("second")).unwrap());
        auth.logout().unwrap();
        assert!(!auth.login("amy", &secret("third")).unwrap());
    }
}
