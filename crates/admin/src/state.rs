//! Application state shared by front ends.

use std::sync::Arc;

use tracing::info;

use crate::config::AdminConfig;
use crate::db::{CustomerStore, FileStorage, ProductStore, SettingsStore, Storage};
use crate::error::AppError;
use crate::services::{AuthService, DashboardSummary, SeedOutcome, seed_if_empty};

/// Application state: configuration plus one storage handle.
///
/// Cloning is cheap; every clone shares the same storage.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    storage: Arc<dyn Storage>,
}

/// What first-run setup did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bootstrap {
    /// The default account was created.
    pub default_user_created: bool,
    /// Product seeding result, if seeding is enabled.
    pub products: Option<SeedOutcome>,
    /// Customer seeding result, if seeding is enabled.
    pub customers: Option<SeedOutcome>,
}

impl AppState {
    /// Open the data directory named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the directory cannot be opened.
    pub fn open(config: AdminConfig) -> Result<Self, AppError> {
        let storage = FileStorage::open(&config.data_dir)?;
        Ok(Self::new(config, Arc::new(storage)))
    }

    /// Build state over an existing storage backend.
    #[must_use]
    pub fn new(config: AdminConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, storage }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn storage(&self) -> &dyn Storage {
        self.inner.storage.as_ref()
    }

    #[must_use]
    pub fn products(&self) -> ProductStore<'_> {
        ProductStore::new(self.storage())
    }

    #[must_use]
    pub fn customers(&self) -> CustomerStore<'_> {
        CustomerStore::new(self.storage())
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.storage())
    }

    #[must_use]
    pub fn settings(&self) -> SettingsStore<'_> {
        SettingsStore::new(self.storage())
    }

    /// Fail with `AppError::NotAuthenticated` unless the login flag is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotAuthenticated`, or `AppError::Auth` if the flag
    /// cannot be read.
    pub fn require_auth(&self) -> Result<(), AppError> {
        if self.auth().is_authenticated()? {
            Ok(())
        } else {
            Err(AppError::NotAuthenticated)
        }
    }

    /// Dashboard figures over the current catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if either collection cannot be read.
    pub fn summary(&self) -> Result<DashboardSummary, AppError> {
        let products = self.products().list()?;
        let customers = self.customers().list()?;
        Ok(DashboardSummary::compute(
            &products,
            &customers,
            self.config().low_stock_threshold,
        ))
    }

    /// Seed demo data into whichever collections are empty.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Seed` if either collection cannot be seeded.
    pub fn seed(&self) -> Result<(SeedOutcome, SeedOutcome), AppError> {
        let mut rng = rand::rng();
        let products = seed_if_empty(&self.products(), &mut rng)?;
        let customers = seed_if_empty(&self.customers(), &mut rng)?;
        Ok((products, customers))
    }

    /// First-run setup: create the default account and, if enabled, seed
    /// empty collections. Safe to run repeatedly.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` or `AppError::Seed` if a step fails.
    pub fn bootstrap(&self) -> Result<Bootstrap, AppError> {
        let default_user_created = self.auth().initialize()?;
        let (products, customers) = if self.config().seed_on_init {
            let (products, customers) = self.seed()?;
            (Some(products), Some(customers))
        } else {
            (None, None)
        };
        info!(default_user_created, seeded = self.config().seed_on_init, "bootstrap complete");
        Ok(Bootstrap {
            default_user_created,
            products,
            customers,
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;
    use crate::services::SEED_BATCH_SIZE;

    fn memory_state(seed_on_init: bool) -> AppState {
        let config = AdminConfig {
            seed_on_init,
            ..AdminConfig::default()
        };
        AppState::new(config, Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let state = memory_state(true);
        let first = state.bootstrap().unwrap();
        assert!(first.default_user_created);
        assert_eq!(first.products, Some(SeedOutcome::Seeded(SEED_BATCH_SIZE)));
        assert_eq!(first.customers, Some(SeedOutcome::Seeded(SEED_BATCH_SIZE)));

        let second = state.bootstrap().unwrap();
        assert!(!second.default_user_created);
        assert_eq!(
            second.products,
            Some(SeedOutcome::Skipped {
                existing: SEED_BATCH_SIZE
            })
        );
    }

    #[test]
    fn test_bootstrap_without_seeding() {
        let state = memory_state(false);
        let report = state.bootstrap().unwrap();
        assert_eq!(report.products, None);
        assert_eq!(state.products().count().unwrap(), 0);
    }

    #[test]
    fn test_require_auth() {
        let state = memory_state(false);
        state.bootstrap().unwrap();
        assert!(matches!(state.require_auth(), Err(AppError::NotAuthenticated)));

        let password = secrecy::SecretString::from("12345".to_owned());
        assert!(state.auth().login("waseem", &password).unwrap());
        assert!(state.require_auth().is_ok());
    }

    #[test]
    fn test_summary_counts_seeded_catalog() {
        let state = memory_state(true);
        state.bootstrap().unwrap();
        let summary = state.summary().unwrap();
        assert_eq!(summary.product_count, SEED_BATCH_SIZE);
        assert_eq!(summary.customer_count, SEED_BATCH_SIZE);
    }
}
