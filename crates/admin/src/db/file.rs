//! File-backed storage backend.
//!
//! Layout of the data directory:
//!
//! ```text
//! <data_dir>/
//!   .lock            exclusive lock taken for every write
//!   products.json    {"revision": 3, "updated_at": "...", "value": "[...]"}
//!   customers.json
//!   users.json
//!   isAuthenticated.json
//!   settings.json
//! ```
//!
//! Writes are staged in a temp file in the same directory and renamed over the
//! slot file, so readers never observe a partially written slot and do not
//! need the lock. Several processes may share one directory; the revision
//! check under the lock makes their writes compare-and-swap.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use super::{
    ChangeOrigin, EVENT_CHANNEL_CAPACITY, Precondition, Revision, Slot, Storage, StorageError,
    StorageEvent, validate_key,
};

const LOCK_FILE: &str = ".lock";
const SLOT_EXTENSION: &str = "json";

/// On-disk form of one slot.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    revision: Revision,
    updated_at: DateTime<Utc>,
    value: String,
}

/// A [`Storage`] that keeps each slot in its own file under a data directory.
pub struct FileStorage {
    dir: PathBuf,
    /// Last revision this handle saw per slot, for external change detection.
    seen: Mutex<HashMap<String, Revision>>,
    events: broadcast::Sender<StorageEvent>,
}

impl FileStorage {
    /// Open (creating if needed) a data directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created or
    /// scanned, or `StorageError::Envelope` if an existing slot is unreadable.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let storage = Self {
            dir,
            seen: Mutex::new(HashMap::new()),
            events,
        };
        let current = storage.scan()?;
        debug!(dir = %storage.dir.display(), slots = current.len(), "opened data directory");
        *storage.seen.lock() = current;
        Ok(storage)
    }

    /// The data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Detect slots written by other processes since this handle last looked.
    ///
    /// Every change found is broadcast to subscribers with
    /// [`ChangeOrigin::External`] and also returned, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the directory cannot be scanned.
    pub fn poll_external_changes(&self) -> Result<Vec<StorageEvent>, StorageError> {
        let current = self.scan()?;
        let mut changes: Vec<StorageEvent> = {
            let mut seen = self.seen.lock();
            let mut changes: Vec<StorageEvent> = current
                .iter()
                .filter(|(key, revision)| seen.get(*key) != Some(*revision))
                .map(|(key, revision)| StorageEvent {
                    key: key.clone(),
                    revision: *revision,
                    origin: ChangeOrigin::External,
                })
                .collect();
            changes.extend(
                seen.keys()
                    .filter(|key| !current.contains_key(*key))
                    .map(|key| StorageEvent {
                        key: key.clone(),
                        revision: Revision::NONE,
                        origin: ChangeOrigin::External,
                    }),
            );
            *seen = current;
            changes
        };
        changes.sort_by(|a, b| a.key.cmp(&b.key));

        for event in &changes {
            debug!(slot = %event.key, revision = %event.revision, "external change");
            let _ = self.events.send(event.clone());
        }
        Ok(changes)
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{SLOT_EXTENSION}"))
    }

    fn read_envelope(&self, key: &str) -> Result<Option<Envelope>, StorageError> {
        let text = match fs::read_to_string(self.slot_path(key)) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| StorageError::Envelope {
                key: key.to_owned(),
                source,
            })
    }

    /// Current revision of every slot file in the directory.
    fn scan(&self) -> Result<HashMap<String, Revision>, StorageError> {
        let mut revisions = HashMap::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SLOT_EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_key(key).is_err() {
                continue;
            }
            if let Some(envelope) = self.read_envelope(key)? {
                revisions.insert(key.to_owned(), envelope.revision);
            }
        }
        Ok(revisions)
    }
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<Slot>, StorageError> {
        validate_key(key)?;
        Ok(self.read_envelope(key)?.map(|envelope| Slot {
            value: envelope.value,
            revision: envelope.revision,
        }))
    }

    fn write(
        &self,
        key: &str,
        value: &str,
        precondition: Precondition,
    ) -> Result<Revision, StorageError> {
        validate_key(key)?;
        let revision = {
            let _lock = DirLock::acquire(&self.dir)?;
            let current = self
                .read_envelope(key)?
                .map_or(Revision::NONE, |envelope| envelope.revision);
            precondition.check(key, current)?;

            let envelope = Envelope {
                revision: current.next(),
                updated_at: Utc::now(),
                value: value.to_owned(),
            };
            let bytes = serde_json::to_vec(&envelope).map_err(|source| StorageError::Envelope {
                key: key.to_owned(),
                source,
            })?;

            let mut staged = tempfile::NamedTempFile::new_in(&self.dir)?;
            staged.write_all(&bytes)?;
            staged.as_file().sync_all()?;
            staged
                .persist(self.slot_path(key))
                .map_err(|e| StorageError::Io(e.error))?;

            self.seen.lock().insert(key.to_owned(), envelope.revision);
            envelope.revision
        };

        let _ = self.events.send(StorageEvent {
            key: key.to_owned(),
            revision,
            origin: ChangeOrigin::Local,
        });
        Ok(revision)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }

    fn poll_external(&self) -> Result<Vec<StorageEvent>, StorageError> {
        self.poll_external_changes()
    }
}

/// Exclusive advisory lock on the data directory, released on drop.
struct DirLock {
    file: File,
}

impl DirLock {
    fn acquire(dir: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(LOCK_FILE))?;
        file.lock()?;
        Ok(Self { file })
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert!(storage.read("products").unwrap().is_none());
        let revision = storage.write("products", "[]", Precondition::Any).unwrap();
        let slot = storage.read("products").unwrap().unwrap();
        assert_eq!(slot.value, "[]");
        assert_eq!(slot.revision, revision);
        assert!(dir.path().join("products.json").exists());
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = FileStorage::open(dir.path()).unwrap();
            storage.write("isAuthenticated", "true", Precondition::Any).unwrap();
        }
        let storage = FileStorage::open(dir.path()).unwrap();
        let slot = storage.read("isAuthenticated").unwrap().unwrap();
        assert_eq!(slot.value, "true");
        assert_eq!(slot.revision, Revision::new(1));
    }

    #[test]
    fn test_conflict_between_handles() {
        let dir = tempfile::tempdir().unwrap();
        let a = FileStorage::open(dir.path()).unwrap();
        let b = FileStorage::open(dir.path()).unwrap();

        let r1 = a.write("customers", "[1]", Precondition::Any).unwrap();
        b.write("customers", "[2]", Precondition::Revision(r1)).unwrap();
        let err = a
            .write("customers", "[3]", Precondition::Revision(r1))
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
        assert_eq!(a.read("customers").unwrap().unwrap().value, "[2]");
    }

    #[test]
    fn test_poll_detects_other_handle() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = FileStorage::open(dir.path()).unwrap();
        let writer = FileStorage::open(dir.path()).unwrap();
        let mut rx = watcher.subscribe();

        assert!(watcher.poll_external_changes().unwrap().is_empty());
        writer.write("products", "[]", Precondition::Any).unwrap();

        let changes = watcher.poll_external_changes().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].key, "products");
        assert_eq!(changes[0].origin, ChangeOrigin::External);
        assert_eq!(rx.try_recv().unwrap().key, "products");

        // Already reported.
        assert!(watcher.poll_external_changes().unwrap().is_empty());
    }

    #[test]
    fn test_own_writes_are_not_external() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.write("settings", "{}", Precondition::Any).unwrap();
        assert!(storage.poll_external_changes().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_envelope() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("products.json"), "not json").unwrap();
        let err = FileStorage::open(dir.path()).unwrap_err();
        assert!(matches!(err, StorageError::Envelope { .. }));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        assert!(matches!(
            storage.write("../escape", "x", Precondition::Any),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
