//! Core types for SalesDesk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credential;
pub mod email;
pub mod id;
pub mod page;
pub mod phone;
pub mod price;
pub mod status;

pub use credential::{PasswordDigest, StoredUser};
pub use email::{Email, EmailError};
pub use id::*;
pub use page::{Page, PageRequest};
pub use phone::{Phone, PhoneError};
pub use price::{Price, PriceError};
pub use status::*;
