//! Integration tests for SalesDesk.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p salesdesk-integration-tests
//! ```
//!
//! Every test works against a fresh data directory under the system temp
//! directory, so no setup is needed.
//!
//! # Test Categories
//!
//! - `catalog` - Product and customer lifecycle through file storage
//! - `concurrency` - Several handles sharing one data directory
//! - `session` - First-run setup, login, and settings persistence

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use tempfile::TempDir;

use salesdesk_admin::config::AdminConfig;
use salesdesk_admin::db::FileStorage;
use salesdesk_admin::state::AppState;

/// A scratch data directory, removed when dropped.
pub struct TestContext {
    pub dir: TempDir,
}

impl TestContext {
    /// Create an empty data directory.
    ///
    /// # Panics
    ///
    /// Panics if the temp directory cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Configuration pointing at this directory, with seeding as given.
    #[must_use]
    pub fn config(&self, seed_on_init: bool) -> AdminConfig {
        AdminConfig {
            data_dir: self.dir.path().to_path_buf(),
            seed_on_init,
            ..AdminConfig::default()
        }
    }

    /// Open a new, independent handle on the directory, as a separate
    /// process would.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be opened.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn open(&self, seed_on_init: bool) -> AppState {
        AppState::open(self.config(seed_on_init)).expect("Failed to open data directory")
    }

    /// Open a raw storage handle on the directory.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be opened.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn storage(&self) -> Arc<FileStorage> {
        Arc::new(FileStorage::open(self.dir.path()).expect("Failed to open storage"))
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
