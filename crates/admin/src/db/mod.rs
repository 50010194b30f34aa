//! Persistence for SalesDesk.
//!
//! All state lives in one key-value namespace. Each key ("slot") holds a
//! serialized text value and a [`Revision`] that increases on every write.
//!
//! ## Slots
//!
//! - `products` - JSON array of products
//! - `customers` - JSON array of customers
//! - `users` - JSON array of `{username, password}`
//! - `isAuthenticated` - literal `true` or `false`
//! - `settings` - JSON object
//!
//! # Backends
//!
//! - [`MemoryStorage`] - process-local map, used by tests and ephemeral runs
//! - [`FileStorage`] - one JSON envelope per slot in a data directory
//!
//! Stores never reach for a global: a `&dyn Storage` is injected into every
//! store constructor.

pub mod collection;
pub mod file;
pub mod memory;
pub mod settings;
pub mod users;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

pub use collection::{CollectionStore, CustomerStore, ProductStore};
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use settings::SettingsStore;
pub use users::UserRepository;

/// Capacity of each backend's change-notification channel.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 64;

/// How many times a read-modify-write is re-applied after losing a write race.
pub const MAX_WRITE_ATTEMPTS: usize = 10;

/// Per-slot write counter. [`Revision::NONE`] means the slot does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(u64);

impl Revision {
    /// The revision of a slot that has never been written.
    pub const NONE: Self = Self(0);

    /// Wrap a raw counter value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The revision following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Raw counter value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A slot's current value and revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub value: String,
    pub revision: Revision,
}

/// Condition a write must satisfy to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Overwrite unconditionally (last writer wins).
    Any,
    /// Only write if the slot is still at this revision.
    /// `Revision::NONE` requires the slot to be absent.
    Revision(Revision),
}

impl Precondition {
    /// Whether a slot currently at `current` satisfies this condition.
    #[must_use]
    pub fn admits(self, current: Revision) -> bool {
        match self {
            Self::Any => true,
            Self::Revision(expected) => expected == current,
        }
    }

    /// Like [`Precondition::admits`], but as a `Conflict` error for `key`.
    pub(crate) fn check(self, key: &str, current: Revision) -> Result<(), StorageError> {
        match self {
            Self::Revision(expected) if expected != current => Err(StorageError::Conflict {
                key: key.to_owned(),
                expected,
                actual: current,
            }),
            _ => Ok(()),
        }
    }
}

/// Where a change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Written through this storage handle.
    Local,
    /// Written by another process sharing the same backing store.
    External,
}

/// Notification that a slot changed and should be re-read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub revision: Revision,
    pub origin: ChangeOrigin,
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Slot keys are limited to ASCII letters, digits, `_` and `-`.
    #[error("invalid slot key: {0:?}")]
    InvalidKey(String),

    /// A slot's on-disk envelope could not be decoded.
    #[error("unreadable envelope for slot {key}: {source}")]
    Envelope {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The slot moved on since it was read.
    #[error("revision conflict on slot {key}: expected {expected}, found {actual}")]
    Conflict {
        key: String,
        expected: Revision,
        actual: Revision,
    },
}

/// Key-value storage for serialized collection slots.
///
/// Implementations must apply each `write` atomically with respect to its
/// precondition check, and broadcast a [`StorageEvent`] after every write.
pub trait Storage: Send + Sync {
    /// Read a slot. `Ok(None)` if it has never been written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<Slot>, StorageError>;

    /// Write a slot if `precondition` holds, returning the new revision.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the precondition fails, or a
    /// backend error if the value cannot be stored.
    fn write(
        &self,
        key: &str,
        value: &str,
        precondition: Precondition,
    ) -> Result<Revision, StorageError>;

    /// Subscribe to change notifications for writes made through this handle.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;

    /// Report slots changed outside this handle since the last call, also
    /// broadcasting them to subscribers. Backends that cannot be shared
    /// report nothing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be inspected.
    fn poll_external(&self) -> Result<Vec<StorageEvent>, StorageError> {
        Ok(Vec::new())
    }
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Data in a slot is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A value could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Concurrent writers kept winning the race for a slot.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Read-modify-write one slot, conditioned on the revision that was read.
///
/// `change` sees the current slot (`None` if absent) and returns the text to
/// store along with an outcome, or `Ok(None)` to abandon without writing. If
/// another writer moves the slot first, `change` runs again against the fresh
/// value, up to [`MAX_WRITE_ATTEMPTS`] times.
///
/// # Errors
///
/// Returns the error from `change`, a storage error, or
/// `RepositoryError::Conflict` once every attempt has lost the race.
pub(crate) fn compare_and_swap<T, E>(
    storage: &dyn Storage,
    key: &str,
    mut change: impl FnMut(Option<&Slot>) -> Result<Option<(String, T)>, E>,
) -> Result<Option<T>, E>
where
    E: From<RepositoryError>,
{
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let current = storage.read(key).map_err(RepositoryError::from)?;
        let read = current.as_ref().map_or(Revision::NONE, |slot| slot.revision);
        let Some((encoded, outcome)) = change(current.as_ref())? else {
            return Ok(None);
        };
        match storage.write(key, &encoded, Precondition::Revision(read)) {
            Ok(written) => {
                debug!(slot = key, revision = %written, "slot written");
                return Ok(Some(outcome));
            }
            Err(StorageError::Conflict { actual, .. }) => {
                warn!(
                    slot = key,
                    attempt,
                    read = %read,
                    found = %actual,
                    "concurrent write detected, re-applying"
                );
            }
            Err(e) => return Err(RepositoryError::from(e).into()),
        }
    }
    Err(RepositoryError::Conflict(format!(
        "{key} slot still contended after {MAX_WRITE_ATTEMPTS} attempts"
    ))
    .into())
}

/// Reject keys that are not safe as file names.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}
