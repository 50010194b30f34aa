//! Whole-collection stores for products and customers.
//!
//! A collection is persisted as one JSON array in one slot. Every mutation
//! reads the array, changes it in memory, and writes the whole array back,
//! conditioned on the revision it read. If another writer got there first the
//! mutation is re-applied to the fresh collection, so concurrent writers never
//! silently discard each other's changes.

use std::marker::PhantomData;

use tracing::{debug, instrument};

use salesdesk_core::{Customer, Entity, Page, PageRequest, Product};

use super::{RepositoryError, Revision, Storage, compare_and_swap};

/// Store for the `products` slot.
pub type ProductStore<'a> = CollectionStore<'a, Product>;

/// Store for the `customers` slot.
pub type CustomerStore<'a> = CollectionStore<'a, Customer>;

/// CRUD and query operations over one entity collection.
pub struct CollectionStore<'a, E> {
    storage: &'a dyn Storage,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E: Entity> CollectionStore<'a, E> {
    /// Create a store over the given storage.
    #[must_use]
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self {
            storage,
            _entity: PhantomData,
        }
    }

    /// Every record, in insertion order. An absent slot is an empty collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the slot holds text that
    /// is not a valid collection, or a storage error.
    pub fn list(&self) -> Result<Vec<E>, RepositoryError> {
        self.load().map(|(items, _)| items)
    }

    /// Look up a record by id.
    ///
    /// # Errors
    ///
    /// Same as [`CollectionStore::list`].
    pub fn get(&self, id: &E::Id) -> Result<Option<E>, RepositoryError> {
        Ok(self.list()?.into_iter().find(|item| item.id() == id))
    }

    /// Number of records.
    ///
    /// # Errors
    ///
    /// Same as [`CollectionStore::list`].
    pub fn count(&self) -> Result<usize, RepositoryError> {
        self.list().map(|items| items.len())
    }

    /// Current revision of the slot ([`Revision::NONE`] if never written).
    ///
    /// # Errors
    ///
    /// Returns a storage error if the slot cannot be read.
    pub fn revision(&self) -> Result<Revision, RepositoryError> {
        Ok(self
            .storage
            .read(E::SLOT)?
            .map_or(Revision::NONE, |slot| slot.revision))
    }

    /// Case-insensitive free-text search, paginated.
    ///
    /// # Errors
    ///
    /// Same as [`CollectionStore::list`].
    pub fn search(&self, query: &str, page: PageRequest) -> Result<Page<E>, RepositoryError> {
        let matches: Vec<E> = self
            .list()?
            .into_iter()
            .filter(|item| item.matches(query))
            .collect();
        Ok(Page::paginate(matches, page))
    }

    /// Append a new record with a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns a storage, corruption, or conflict error; nothing is written
    /// in that case.
    #[instrument(skip_all, fields(slot = E::SLOT))]
    pub fn create(&self, new: E::New) -> Result<E, RepositoryError> {
        let entity = E::from_new(E::generate_id(), new);
        self.mutate(|items| {
            items.push(entity.clone());
            Some(())
        })?;
        debug!(id = %entity.id(), "created {}", E::KIND);
        Ok(entity)
    }

    /// Apply a partial update. Returns the updated record, or `None` (and
    /// writes nothing) if no record has this id.
    ///
    /// # Errors
    ///
    /// Returns a storage, corruption, or conflict error.
    #[instrument(skip_all, fields(slot = E::SLOT, id = %id))]
    pub fn update(&self, id: &E::Id, patch: E::Patch) -> Result<Option<E>, RepositoryError> {
        let updated = self.mutate(|items| {
            let item = items.iter_mut().find(|item| item.id() == id)?;
            item.apply(patch.clone());
            Some(item.clone())
        })?;
        if updated.is_none() {
            debug!("update of missing {} ignored", E::KIND);
        }
        Ok(updated)
    }

    /// Remove a record. Returns whether it existed; a missing id writes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns a storage, corruption, or conflict error.
    #[instrument(skip_all, fields(slot = E::SLOT, id = %id))]
    pub fn delete(&self, id: &E::Id) -> Result<bool, RepositoryError> {
        let removed = self.mutate(|items| {
            let index = items.iter().position(|item| item.id() == id)?;
            Some(items.remove(index))
        })?;
        Ok(removed.is_some())
    }

    /// Read-modify-write the collection.
    ///
    /// `change` returns `None` to abandon the write (nothing is persisted).
    /// It may run more than once if a concurrent writer wins the race, each
    /// time against the freshly read collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` after
    /// [`MAX_WRITE_ATTEMPTS`](super::MAX_WRITE_ATTEMPTS) lost races, or any
    /// storage or corruption error.
    pub fn mutate<T>(
        &self,
        mut change: impl FnMut(&mut Vec<E>) -> Option<T>,
    ) -> Result<Option<T>, RepositoryError> {
        compare_and_swap::<_, RepositoryError>(self.storage, E::SLOT, |slot| {
            let mut items = match slot {
                Some(slot) => Self::decode(&slot.value)?,
                None => Vec::new(),
            };
            let Some(outcome) = change(&mut items) else {
                return Ok(None);
            };
            debug!(slot = E::SLOT, count = items.len(), "writing collection");
            Ok(Some((Self::encode(&items)?, outcome)))
        })
    }

    /// Serialize a collection to its persisted text form.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Serialization` if a record cannot be encoded.
    pub fn encode(items: &[E]) -> Result<String, RepositoryError> {
        Ok(serde_json::to_string(items)?)
    }

    /// Parse a collection from its persisted text form.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the text is not a valid
    /// collection.
    pub fn decode(text: &str) -> Result<Vec<E>, RepositoryError> {
        serde_json::from_str(text).map_err(|e| {
            RepositoryError::DataCorruption(format!("{} slot is unreadable: {e}", E::SLOT))
        })
    }

    fn load(&self) -> Result<(Vec<E>, Revision), RepositoryError> {
        match self.storage.read(E::SLOT)? {
            Some(slot) => Ok((Self::decode(&slot.value)?, slot.revision)),
            None => Ok((Vec::new(), Revision::NONE)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use salesdesk_core::{
        CustomerForm, CustomerId, NewProduct, Price, ProductId, ProductPatch, ProductStatus,
    };

    use super::*;
    use crate::db::{MemoryStorage, Precondition};

    fn laptop() -> NewProduct {
        NewProduct {
            name: "Laptop".to_owned(),
            category: "Computers".to_owned(),
            price: Price::from_cents(99_999),
            stock: 5,
            status: ProductStatus::Available,
        }
    }

    fn mouse() -> NewProduct {
        NewProduct {
            name: "Mouse".to_owned(),
            category: "Accessories".to_owned(),
            price: Price::from_cents(1_999),
            stock: 0,
            status: ProductStatus::OutOfStock,
        }
    }

    #[test]
    fn test_absent_slot_is_empty() {
        let storage = MemoryStorage::new();
        let store = ProductStore::new(&storage);
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.revision().unwrap(), Revision::NONE);
    }

    #[test]
    fn test_create_then_get() {
        let storage = MemoryStorage::new();
        let store = ProductStore::new(&storage);

        let created = store.create(laptop()).unwrap();
        let fetched = store.get(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched, Product::from_new(created.id.clone(), laptop()));
    }

    #[test]
    fn test_create_then_get_keeps_exact_price() {
        let storage = MemoryStorage::new();
        let store = ProductStore::new(&storage);

        for price in [
            "79228162514264337593543950335",
            "0.1234567890123456789",
            "0.0000000000000000000000000001",
            "19.999",
            "20.00",
        ] {
            let new = NewProduct {
                price: Price::parse(price).unwrap(),
                ..laptop()
            };
            let created = store.create(new).unwrap();
            let fetched = store.get(&created.id).unwrap().unwrap();
            assert_eq!(fetched, created, "price {price}");
            assert_eq!(fetched.price.to_string(), price);
        }
        assert_eq!(store.count().unwrap(), 5);
    }

    #[test]
    fn test_create_appends_in_order() {
        let storage = MemoryStorage::new();
        let store = ProductStore::new(&storage);
        let a = store.create(laptop()).unwrap();
        let b = store.create(mouse()).unwrap();
        assert_ne!(a.id, b.id);
        let ids: Vec<_> = store.list().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_update_merges_named_fields() {
        let storage = MemoryStorage::new();
        let store = ProductStore::new(&storage);
        let created = store.create(laptop()).unwrap();

        let updated = store
            .update(
                &created.id,
                ProductPatch {
                    stock: Some(0),
                    status: Some(ProductStatus::OutOfStock),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.price, created.price);
        assert_eq!(updated.stock, 0);
        assert_eq!(updated.status, ProductStatus::OutOfStock);
        assert_eq!(store.get(&created.id).unwrap().unwrap(), updated);
    }

    #[test]
    fn test_update_missing_is_noop() {
        let storage = MemoryStorage::new();
        let store = ProductStore::new(&storage);
        store.create(laptop()).unwrap();
        let before = store.revision().unwrap();

        let result = store
            .update(&ProductId::new("missing"), ProductPatch::default())
            .unwrap();
        assert!(result.is_none());
        assert_eq!(store.revision().unwrap(), before);
    }

    #[test]
    fn test_delete() {
        let storage = MemoryStorage::new();
        let store = ProductStore::new(&storage);
        let a = store.create(laptop()).unwrap();
        let b = store.create(mouse()).unwrap();

        assert!(store.delete(&a.id).unwrap());
        assert!(store.get(&a.id).unwrap().is_none());
        assert_eq!(store.count().unwrap(), 1);
        assert!(store.get(&b.id).unwrap().is_some());

        let before = store.revision().unwrap();
        assert!(!store.delete(&a.id).unwrap());
        assert_eq!(store.revision().unwrap(), before);
    }

    #[test]
    fn test_corrupted_slot_is_an_error() {
        let storage = MemoryStorage::new();
        storage
            .write("products", "{not json", Precondition::Any)
            .unwrap();
        let store = ProductStore::new(&storage);
        assert!(matches!(
            store.list(),
            Err(RepositoryError::DataCorruption(_))
        ));
        assert!(store.create(laptop()).is_err());
        assert_eq!(storage.read("products").unwrap().unwrap().value, "{not json");
    }

    #[test]
    fn test_search_and_paginate() {
        let storage = MemoryStorage::new();
        let store = ProductStore::new(&storage);
        for _ in 0..12 {
            store.create(laptop()).unwrap();
        }
        store.create(mouse()).unwrap();

        let page = store.search("LAPTOP", PageRequest::new(2, 5)).unwrap();
        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 5);

        let page = store.search("out of stock", PageRequest::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Mouse");

        let page = store.search("", PageRequest::all()).unwrap();
        assert_eq!(page.total, 13);
    }

    #[test]
    fn test_mutation_reapplied_after_conflict() {
        let storage = MemoryStorage::new();
        let store = ProductStore::new(&storage);
        let existing = store.create(laptop()).unwrap();

        // A second writer sneaks in between our read and our write.
        let mut interfered = false;
        store
            .mutate(|items| {
                if !interfered {
                    interfered = true;
                    ProductStore::new(&storage).create(mouse()).unwrap();
                }
                items.retain(|p| p.id != existing.id);
                Some(())
            })
            .unwrap();

        let names: Vec<_> = store.list().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Mouse".to_owned()]);
    }

    #[test]
    fn test_gives_up_when_always_contended() {
        let storage = MemoryStorage::new();
        let store = ProductStore::new(&storage);
        let result = store.mutate(|items| {
            ProductStore::new(&storage).create(mouse()).unwrap();
            items.clear();
            Some(())
        });
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let storage = MemoryStorage::new();
        let store = ProductStore::new(&storage);
        store.create(laptop()).unwrap();
        store.create(mouse()).unwrap();

        let first = storage.read("products").unwrap().unwrap().value;
        let decoded = ProductStore::decode(&first).unwrap();
        let second = ProductStore::encode(&decoded).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_customer_store_uses_own_slot() {
        let storage = MemoryStorage::new();
        let customers = CustomerStore::new(&storage);
        let new = CustomerForm {
            name: "Bob Smith".to_owned(),
            email: "bob.smith@example.com".to_owned(),
            phone: "+15550001111".to_owned(),
            company: "Initech".to_owned(),
            status: "Inactive".to_owned(),
        }
        .parse()
        .unwrap();
        let created = customers.create(new).unwrap();

        assert!(storage.read("customers").unwrap().is_some());
        assert!(storage.read("products").unwrap().is_none());
        assert!(customers.get(&created.id).unwrap().is_some());
        assert!(customers.get(&CustomerId::new("nope")).unwrap().is_none());
    }
}
