//! Settings storage.
//!
//! Preferences are one JSON object in the `settings` slot. A missing slot
//! means nothing has been changed yet and reads as the defaults.

use tracing::instrument;

use crate::models::Settings;

use super::{Precondition, RepositoryError, Storage, compare_and_swap};

const SETTINGS_SLOT: &str = "settings";

/// Repository for the `settings` slot.
pub struct SettingsStore<'a> {
    storage: &'a dyn Storage,
}

impl<'a> SettingsStore<'a> {
    /// Create a new settings store.
    #[must_use]
    pub const fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }

    /// Current settings, or the defaults if none were saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the slot is unreadable.
    pub fn load(&self) -> Result<Settings, RepositoryError> {
        match self.storage.read(SETTINGS_SLOT)? {
            Some(slot) => decode(&slot.value),
            None => Ok(Settings::default()),
        }
    }

    /// Overwrite the saved settings.
    ///
    /// # Errors
    ///
    /// Returns a storage or serialization error.
    #[instrument(skip_all)]
    pub fn save(&self, settings: &Settings) -> Result<(), RepositoryError> {
        let encoded = serde_json::to_string(settings)?;
        self.storage
            .write(SETTINGS_SLOT, &encoded, Precondition::Any)?;
        Ok(())
    }

    /// Read-modify-write the settings, returning the saved result.
    ///
    /// `change` may run again against fresh settings if another writer saved
    /// in between.
    ///
    /// # Errors
    ///
    /// Returns the error from `change` wrapped as `E`, or a repository error.
    #[instrument(skip_all)]
    pub fn update<E>(
        &self,
        mut change: impl FnMut(&mut Settings) -> Result<(), E>,
    ) -> Result<Settings, E>
    where
        E: From<RepositoryError>,
    {
        let saved = compare_and_swap::<_, E>(self.storage, SETTINGS_SLOT, |slot| {
            let mut settings = match slot {
                Some(slot) => decode(&slot.value)?,
                None => Settings::default(),
            };
            change(&mut settings)?;
            let encoded = serde_json::to_string(&settings).map_err(RepositoryError::from)?;
            Ok(Some((encoded, settings)))
        })?;
        // `change` never abandons the write, so an outcome is always present.
        Ok(saved.unwrap_or_default())
    }
}

fn decode(text: &str) -> Result<Settings, RepositoryError> {
    serde_json::from_str(text).map_err(|e| {
        RepositoryError::DataCorruption(format!("{SETTINGS_SLOT} slot is unreadable: {e}"))
    })
}
