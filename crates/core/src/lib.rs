//! SalesDesk Core - Shared types library.
//!
//! This crate provides the domain types used across all SalesDesk components:
//! - `admin` - Storage, collection stores, seeding, auth, settings, analytics
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access.
//! Validation lives here too: it is a pure function of form input and can run
//! anywhere a form is filled in.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, phones, statuses, pages
//! - [`entity`] - The [`Entity`] trait that collection stores are generic over
//! - [`product`] / [`customer`] - Records, patches, and validated input forms
//! - [`validation`] - The field-to-message error map returned by validators

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod customer;
pub mod entity;
pub mod product;
pub mod types;
pub mod validation;

pub use customer::{
    Customer, CustomerForm, CustomerPatch, CustomerPatchForm, NewCustomer, validate_customer,
};
pub use entity::Entity;
pub use product::{
    NewProduct, Product, ProductForm, ProductPatch, ProductPatchForm, validate_product,
};
pub use types::*;
pub use validation::ValidationErrors;
