//! SalesDesk admin library.
//!
//! Everything behind the front end: storage backends, the product and
//! customer stores, authentication, settings, first-run seeding, and
//! dashboard analytics. Front ends hold an [`state::AppState`] and call into
//! it; nothing here performs terminal or network I/O.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
