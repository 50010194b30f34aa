//! In-process storage backend.

use std::collections::HashMap;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use super::{
    ChangeOrigin, EVENT_CHANNEL_CAPACITY, Precondition, Revision, Slot, Storage, StorageError,
    StorageEvent, validate_key,
};

/// A [`Storage`] backed by a process-local map.
///
/// Share one instance (by reference or `Arc`) between stores that should see
/// each other's writes.
pub struct MemoryStorage {
    slots: RwLock<HashMap<String, Slot>>,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryStorage {
    /// Create an empty storage namespace.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            slots: RwLock::new(HashMap::new()),
            events,
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("slots", &self.slots.read().len())
            .finish_non_exhaustive()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<Slot>, StorageError> {
        validate_key(key)?;
        Ok(self.slots.read().get(key).cloned())
    }

    fn write(
        &self,
        key: &str,
        value: &str,
        precondition: Precondition,
    ) -> Result<Revision, StorageError> {
        validate_key(key)?;
        let revision = {
            let mut slots = self.slots.write();
            let current = slots.get(key).map_or(Revision::NONE, |slot| slot.revision);
            precondition.check(key, current)?;
            let revision = current.next();
            slots.insert(
                key.to_owned(),
                Slot {
                    value: value.to_owned(),
                    revision,
                },
            );
            revision
        };

        // No subscribers is fine.
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
}
