//! First-run demo data.
//!
//! Each collection is populated with a fixed-size batch of synthetic records
//! the first time it is found empty. The batch goes out in a single write
//! conditioned on the empty revision that was read, so when two processes seed
//! at once exactly one batch lands and the loser reports `Skipped`.

use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;
use tracing::{info, instrument};

use salesdesk_core::{
    Customer, CustomerForm, CustomerStatus, Entity, NewProduct, Price, Product, ProductStatus,
    ValidationErrors,
};

use crate::db::{CollectionStore, RepositoryError};

/// Records generated per collection.
pub const SEED_BATCH_SIZE: usize = 40;

const PRODUCT_NAMES: [&str; 40] = [
    "Laptop",
    "Smartphone",
    "Tablet",
    "Monitor",
    "Keyboard",
    "Mouse",
    "Printer",
    "Camera",
    "Speaker",
    "Headphones",
    "Router",
    "Smartwatch",
    "TV",
    "Projector",
    "Microphone",
    "Webcam",
    "SSD",
    "HDD",
    "RAM",
    "GPU",
    "CPU",
    "Motherboard",
    "Power Supply",
    "Case",
    "Fan",
    "Charger",
    "Cable",
    "Adapter",
    "Dock",
    "Switch",
    "Light",
    "Thermostat",
    "Sensor",
    "Drone",
    "VR Headset",
    "Gamepad",
    "E-reader",
    "Fitness Tracker",
    "Smart Plug",
    "Alarm",
];

const PRODUCT_CATEGORIES: [&str; 7] = [
    "Electronics",
    "Computers",
    "Accessories",
    "Audio",
    "Networking",
    "Smart Home",
    "Gaming",
];

const CUSTOMER_NAMES: [&str; 40] = [
    "Alice Johnson",
    "Bob Smith",
    "Charlie Lee",
    "Diana Prince",
    "Ethan Clark",
    "Fiona Adams",
    "George Brown",
    "Hannah Davis",
    "Ian Miller",
    "Julia Wilson",
    "Kevin Moore",
    "Laura Taylor",
    "Mike Anderson",
    "Nina Thomas",
    "Oscar Harris",
    "Paula Martin",
    "Quentin Lewis",
    "Rachel Young",
    "Sam Walker",
    "Tina Hall",
    "Uma King",
    "Victor Allen",
    "Wendy Scott",
    "Xander Evans",
    "Yara Turner",
    "Zane Baker",
    "Amber Reed",
    "Brian Cox",
    "Cathy Ward",
    "Derek Gray",
    "Eva Price",
    "Frank Bell",
    "Grace Wood",
    "Henry Stone",
    "Isabel Fox",
    "Jack Knight",
    "Kara Lane",
    "Liam Hunt",
    "Mona Page",
    "Noah Ray",
];

const CUSTOMER_COMPANIES: [&str; 10] = [
    "Globex",
    "Initech",
    "Umbrella",
    "Wayne Enterprises",
    "Stark Industries",
    "Wonka Inc",
    "Acme Corp",
    "Hooli",
    "Massive Dynamic",
    "Cyberdyne",
];

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),

    /// A generated record failed validation.
    #[error("generated record is invalid: {0}")]
    InvalidRecord(ValidationErrors),
}

/// What a seeding attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The collection was empty and this many records were written.
    Seeded(usize),
    /// The collection already held records; nothing was written.
    Skipped { existing: usize },
}

/// An entity that can generate its own demo data.
pub trait Seed: Entity {
    /// Generate [`SEED_BATCH_SIZE`] records, ready for id assignment.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::InvalidRecord` if a generated record fails
    /// validation.
    fn seed_batch<R: Rng + ?Sized>(rng: &mut R) -> Result<Vec<Self::New>, SeedError>;
}

impl Seed for Product {
    fn seed_batch<R: Rng + ?Sized>(rng: &mut R) -> Result<Vec<NewProduct>, SeedError> {
        Ok(PRODUCT_NAMES
            .iter()
            .cycle()
            .take(SEED_BATCH_SIZE)
            .enumerate()
            .map(|(i, name)| NewProduct {
                name: format!("{name} {}", i + 1),
                category: pick(&mut *rng, &PRODUCT_CATEGORIES).to_owned(),
                price: Price::from_cents(rng.random_range(2_000..=50_000)),
                stock: rng.random_range(0..200),
                status: if rng.random_bool(0.85) {
                    ProductStatus::Available
                } else {
                    ProductStatus::OutOfStock
                },
            })
            .collect())
    }
}

impl Seed for Customer {
    fn seed_batch<R: Rng + ?Sized>(rng: &mut R) -> Result<Vec<Self::New>, SeedError> {
        CUSTOMER_NAMES
            .iter()
            .cycle()
            .take(SEED_BATCH_SIZE)
            .map(|name| {
                let status = if rng.random_bool(0.8) {
                    CustomerStatus::Active
                } else {
                    CustomerStatus::Inactive
                };
                CustomerForm {
                    name: (*name).to_owned(),
                    email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
                    phone: format!("+1{}", rng.random_range(1_000_000_000_u64..10_000_000_000)),
                    company: pick(&mut *rng, &CUSTOMER_COMPANIES).to_owned(),
                    status: status.to_string(),
                }
                .parse()
                .map_err(SeedError::InvalidRecord)
            })
            .collect()
    }
}

/// Populate the collection with demo data if it is empty.
///
/// # Errors
///
/// Returns `SeedError::Repository` if the collection cannot be read or
/// written, or `SeedError::InvalidRecord` if generation goes wrong.
#[instrument(skip_all, fields(slot = E::SLOT))]
pub fn seed_if_empty<E: Seed, R: Rng + ?Sized>(
    store: &CollectionStore<'_, E>,
    rng: &mut R,
) -> Result<SeedOutcome, SeedError> {
    let records: Vec<E> = E::seed_batch(rng)?
        .into_iter()
        .map(|new| E::from_new(E::generate_id(), new))
        .collect();

    let mut existing = 0;
    let written = store.mutate(|items| {
        if !items.is_empty() {
            existing = items.len();
            return None;
        }
        items.clone_from(&records);
        Some(items.len())
    })?;

    let outcome = written.map_or(SeedOutcome::Skipped { existing }, SeedOutcome::Seeded);
    match outcome {
        SeedOutcome::Seeded(count) => info!(count, "seeded collection"),
        SeedOutcome::Skipped { existing } => {
            info!(existing, "collection not empty, skipping seed");
        }
    }
    Ok(outcome)
}

fn pick<'p, R: Rng + ?Sized>(rng: &mut R, pool: &[&'p str]) -> &'p str {
    pool.choose(rng).copied().unwrap_or_default()
}
