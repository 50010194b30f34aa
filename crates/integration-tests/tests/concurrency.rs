//! Several handles sharing one data directory.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::thread;

use rand::SeedableRng;
use rand::rngs::StdRng;

use salesdesk_admin::db::{ChangeOrigin, Precondition, ProductStore, Storage, StorageError};
use salesdesk_admin::services::{SEED_BATCH_SIZE, SeedOutcome, seed_if_empty};
use salesdesk_core::{NewProduct, Price, ProductStatus};
use salesdesk_integration_tests::TestContext;

fn product(name: &str) -> NewProduct {
    NewProduct {
        name: name.to_owned(),
        category: "Gaming".to_owned(),
        price: Price::from_cents(4_999),
        stock: 3,
        status: ProductStatus::Available,
    }
}

#[test]
fn test_concurrent_creates_are_all_kept() {
    let ctx = TestContext::new();
    let writers = 3;
    let per_writer = 4;

    thread::scope(|scope| {
        for w in 0..writers {
            let storage = ctx.storage();
            scope.spawn(move || {
                let store = ProductStore::new(storage.as_ref());
                for i in 0..per_writer {
                    store.create(product(&format!("w{w}-{i}"))).unwrap();
                }
            });
        }
    });

    let storage = ctx.storage();
    let products = ProductStore::new(storage.as_ref()).list().unwrap();
    assert_eq!(products.len(), writers * per_writer);
}

#[test]
fn test_stale_write_is_rejected() {
    let ctx = TestContext::new();
    let a = ctx.storage();
    let b = ctx.storage();

    let seen = a.write("products", "[]", Precondition::Any).unwrap();
    b.write("products", "[]", Precondition::Revision(seen)).unwrap();
    let err = a
        .write("products", "[]", Precondition::Revision(seen))
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict { .. }));
}

#[test]
fn test_only_one_seeder_wins() {
    let ctx = TestContext::new();
    let outcomes: Vec<SeedOutcome> = thread::scope(|scope| {
        let handles: Vec<_> = (0..3_u64)
            .map(|n| {
                let storage = ctx.storage();
                scope.spawn(move || {
                    let store = ProductStore::new(storage.as_ref());
                    seed_if_empty(&store, &mut StdRng::seed_from_u64(n)).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let seeded = outcomes
        .iter()
        .filter(|o| matches!(o, SeedOutcome::Seeded(_)))
        .count();
    assert_eq!(seeded, 1);

    let storage = ctx.storage();
    assert_eq!(
        ProductStore::new(storage.as_ref()).count().unwrap(),
        SEED_BATCH_SIZE
    );
}

#[test]
fn test_external_changes_are_broadcast() {
    let ctx = TestContext::new();
    let watcher = ctx.storage();
    let writer = ctx.storage();
    let mut events = watcher.subscribe();

    ProductStore::new(writer.as_ref()).create(product("Gamepad")).unwrap();
    let changes = watcher.poll_external_changes().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].key, "products");

    let event = events.try_recv().unwrap();
    assert_eq!(event.origin, ChangeOrigin::External);
    assert_eq!(event.revision, changes[0].revision);
}
