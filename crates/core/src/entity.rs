//! The collection-entity abstraction shared by products and customers.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record persisted as one element of a whole-collection slot.
///
/// Products and customers are managed by identical store, validation, and
/// seeding machinery; this trait is the seam that machinery is generic over.
pub trait Entity: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync {
    /// Opaque, immutable identifier.
    type Id: Clone + Debug + Display + Eq + Hash + Send + Sync;
    /// Validated fields for a record that has no id yet.
    type New;
    /// A shallow partial update; absent fields are left untouched.
    type Patch: Clone + Default + Debug;

    /// Storage key of the collection slot.
    const SLOT: &'static str;
    /// Singular human-readable kind, used in logs.
    const KIND: &'static str;

    /// This record's id.
    fn id(&self) -> &Self::Id;

    /// Mint a new, collision-resistant id.
    fn generate_id() -> Self::Id;

    /// Build a record from validated fields and an assigned id.
    fn from_new(id: Self::Id, new: Self::New) -> Self;

    /// Replace the fields present in `patch`. The id never changes.
    fn apply(&mut self, patch: Self::Patch);

    /// Text fields consulted by free-text search.
    fn search_fields(&self) -> Vec<&str>;

    /// Case-insensitive substring match over [`Entity::search_fields`].
    ///
    /// A blank query matches every record.
    fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
