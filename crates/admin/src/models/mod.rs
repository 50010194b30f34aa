//! Domain models for the admin library.
//!
//! Catalog records live in `salesdesk-core`; this module holds state that only
//! the admin side owns.

pub mod settings;

pub use settings::{Notifications, Profile, Settings, SettingsField, Theme, UnknownSetting};
