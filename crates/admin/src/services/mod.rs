//! Business logic services for the admin library.
//!
//! # Services
//!
//! - `analytics` - Dashboard figures over the catalog
//! - `auth` - Login flag, default account, and sign-up
//! - `seed` - First-run demo data

pub mod analytics;
pub mod auth;
pub mod seed;

pub use analytics::{DEFAULT_LOW_STOCK_THRESHOLD, DashboardSummary, LowStockItem};
pub use auth::{AuthError, AuthService, AuthState};
pub use seed::{SEED_BATCH_SIZE, Seed, SeedError, SeedOutcome, seed_if_empty};
