//! Spellbook Store - catalog and variant persistence
//!
//! The reconciliation pass reads the rule catalog and rewrites the variant
//! set inside one transaction. This crate defines that transactional
//! surface and two implementations:
//!
//! - [`MemoryStore`] - snapshot-and-swap store for tests and embedding
//! - [`SqliteStore`] - relational store backed by `rusqlite`

mod error;
mod filter;
pub mod memory;
pub mod sqlite;

use std::collections::BTreeSet;

use spellbook_core::{CardId, Catalog, UniqueId, Variant, VariantStatus};

pub use error::StoreError;
pub use filter::{VariantFilter, VariantOrder};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Operations available inside [`VariantStore::atomic`].
pub trait VariantTransaction {
    /// Reads the full rule catalog.
    fn load_catalog(&mut self) -> Result<Catalog, StoreError>;

    /// Ids of every persisted variant.
    fn variant_ids(&mut self) -> Result<BTreeSet<UniqueId>, StoreError>;

    /// Ids of the variants currently in `status`.
    fn variant_ids_with_status(
        &mut self,
        status: VariantStatus,
    ) -> Result<BTreeSet<UniqueId>, StoreError>;

    /// Card sets of the variants currently in `status`.
    fn card_sets_with_status(
        &mut self,
        status: VariantStatus,
    ) -> Result<Vec<Vec<CardId>>, StoreError>;

    fn get_variant(&mut self, id: &UniqueId) -> Result<Option<Variant>, StoreError>;

    /// Variants matching `filter`, in its listing order.
    fn list_variants(&mut self, filter: &VariantFilter) -> Result<Vec<Variant>, StoreError>;

    /// Persists a new variant. Fails with [`StoreError::Duplicate`] if the id
    /// is taken.
    fn create_variant(&mut self, variant: &Variant) -> Result<(), StoreError>;

    /// Overwrites the combos, features, text, status and update time of an
    /// existing variant. Its cards and creation time are kept.
    fn update_variant(&mut self, variant: &Variant) -> Result<(), StoreError>;

    /// Deletes the given variants, returning how many existed.
    fn delete_variants(&mut self, ids: &BTreeSet<UniqueId>) -> Result<usize, StoreError>;
}

/// A store that can run a unit of work atomically.
pub trait VariantStore {
    /// Runs `f` in a transaction.
    ///
    /// Changes made through the transaction become visible only if `f`
    /// returns `Ok`; on `Err` all of them are discarded. Errors raised while
    /// committing are converted into `E`.
    fn atomic<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn VariantTransaction) -> Result<T, E>;
}
