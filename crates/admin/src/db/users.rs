//! User records and the authentication flag.

use tracing::instrument;

use salesdesk_core::StoredUser;

use super::{Precondition, RepositoryError, Revision, Storage, StorageError, compare_and_swap};

const USERS_SLOT: &str = "users";
const AUTH_FLAG_SLOT: &str = "isAuthenticated";

/// Repository for the `users` and `isAuthenticated` slots.
pub struct UserRepository<'a> {
    storage: &'a dyn Storage,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }

    /// Every registered user, in registration order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the slot is unreadable.
    pub fn users(&self) -> Result<Vec<StoredUser>, RepositoryError> {
        match self.storage.read(USERS_SLOT)? {
            Some(slot) => decode(&slot.value),
            None => Ok(Vec::new()),
        }
    }

    /// Whether the `users` slot has ever been written.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the slot cannot be read.
    pub fn exists(&self) -> Result<bool, RepositoryError> {
        Ok(self.storage.read(USERS_SLOT)?.is_some())
    }

    /// Append a user. Duplicate usernames are allowed.
    ///
    /// # Errors
    ///
    /// Returns a storage, corruption, or conflict error.
    #[instrument(skip_all, fields(username = %user.username))]
    pub fn append(&self, user: StoredUser) -> Result<(), RepositoryError> {
        compare_and_swap::<_, RepositoryError>(self.storage, USERS_SLOT, |slot| {
            let mut users = match slot {
                Some(slot) => decode(&slot.value)?,
                None => Vec::new(),
            };
            users.push(user.clone());
            Ok(Some((serde_json::to_string(&users)?, ())))
        })?;
        Ok(())
    }

    /// Create the `users` slot holding only `user`, unless the slot exists.
    ///
    /// Returns `true` if this call created it.
    ///
    /// # Errors
    ///
    /// Returns a storage or serialization error.
    pub fn ensure_default(&self, user: &StoredUser) -> Result<bool, RepositoryError> {
        let encoded = serde_json::to_string(std::slice::from_ref(user))?;
        match self
            .storage
            .write(USERS_SLOT, &encoded, Precondition::Revision(Revision::NONE))
        {
            Ok(_) => Ok(true),
            Err(StorageError::Conflict { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the persisted authentication flag. Only the literal `true` counts.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the slot cannot be read.
    pub fn auth_flag(&self) -> Result<bool, RepositoryError> {
        Ok(self
            .storage
            .read(AUTH_FLAG_SLOT)?
            .is_some_and(|slot| slot.value == "true"))
    }

    /// Persist the authentication flag.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the slot cannot be written.
    pub fn set_auth_flag(&self, authenticated: bool) -> Result<(), RepositoryError> {
        let value = if authenticated { "true" } else { "false" };
        self.storage
            .write(AUTH_FLAG_SLOT, value, Precondition::Any)?;
        Ok(())
    }
}

fn decode(text: &str) -> Result<Vec<StoredUser>, RepositoryError> {
    serde_json::from_str(text).map_err(|e| {
        RepositoryError::DataCorruption(format!("{USERS_SLOT} slot is unreadable: {e}"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use salesdesk_core::PasswordDigest;

    use super::*;
    use crate::db::MemoryStorage;

    fn user(name: &str, password: &str) -> StoredUser {
        StoredUser {
            username: name.to_owned(),
            password: PasswordDigest::from_phc(password),
        }
    }

    #[test]
    fn test_ensure_default_only_once() {
        let storage = MemoryStorage::new();
        let repo = UserRepository::new(&storage);
        assert!(!repo.exists().unwrap());

        assert!(repo.ensure_default(&user("waseem", "12345")).unwrap());
        assert!(!repo.ensure_default(&user("other", "x")).unwrap());

        let users = repo.users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "waseem");
    }

    #[test]
    fn test_append_allows_duplicates() {
        let storage = MemoryStorage::new();
        let repo = UserRepository::new(&storage);
        repo.append(user("amy", "a")).unwrap();
        repo.append(user("amy", "b")).unwrap();
        let users = repo.users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].password.expose(), "a");
        assert_eq!(users[1].password.expose(), "b");
    }

    #[test]
    fn test_plaintext_layout_is_readable() {
        let storage = MemoryStorage::new();
        storage
            .write(
                "users",
                r#"[{"username":"waseem","password":"12345"}]"#,
                Precondition::Any,
            )
            .unwrap();
        let users = UserRepository::new(&storage).users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "waseem");
        assert!(!users[0].password.is_hashed());
    }

    #[test]
    fn test_auth_flag() {
        let storage = MemoryStorage::new();
        let repo = UserRepository::new(&storage);
        assert!(!repo.auth_flag().unwrap());

        repo.set_auth_flag(true).unwrap();
        assert_eq!(storage.read("isAuthenticated").unwrap().unwrap().value, "true");
        assert!(repo.auth_flag().unwrap());

        repo.set_auth_flag(false).unwrap();
        assert!(!repo.auth_flag().unwrap());

        storage
            .write("isAuthenticated", "TRUE", Precondition::Any)
            .unwrap();
        assert!(!repo.auth_flag().unwrap());
    }

    #[test]
    fn test_corrupt_users_slot() {
        let storage = MemoryStorage::new();
        storage.write("users", "oops", Precondition::Any).unwrap();
        assert!(matches!(
            UserRepository::new(&storage).users(),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
