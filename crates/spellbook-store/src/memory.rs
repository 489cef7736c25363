//! In-memory variant store.

use std::collections::{BTreeMap, BTreeSet};

use spellbook_core::{CardId, Catalog, UniqueId, Variant, VariantStatus};

use crate::{StoreError, VariantFilter, VariantStore, VariantTransaction};

/// A store holding the catalog and variants in memory.
///
/// [`atomic`](VariantStore::atomic) works on a copy of the variant map and
/// swaps it in only when the unit of work succeeds.
///
/// # Example
///
/// ```
/// use spellbook_core::Catalog;
/// use spellbook_store::{MemoryStore, StoreError, VariantStore};
///
/// let mut store = MemoryStore::new(Catalog::empty());
/// let ids = store
///     .atomic::<_, StoreError, _>(|tx| tx.variant_ids())
///     .unwrap();
/// assert!(ids.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    catalog: Catalog,
    variants: BTreeMap<UniqueId, Variant>,
}

impl MemoryStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            variants: BTreeMap::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Replaces the catalog, keeping the variants.
    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
    }

    pub fn variant(&self, id: &UniqueId) -> Option<&Variant> {
        self.variants.get(id)
    }

    pub fn variants(&self) -> impl Iterator<Item = &Variant> {
        self.variants.values()
    }

    /// Variants matching `filter`, in its listing order.
    pub fn list_variants(&self, filter: &VariantFilter) -> Vec<Variant> {
        list(&self.variants, filter)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Sets the status of a variant outside any generation pass, the way a
    /// reviewer would.
    pub fn set_status(&mut self, id: &UniqueId, status: VariantStatus) -> Result<(), StoreError> {
        let variant = self
            .variants
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        variant.status = status;
        Ok(())
    }
}

impl VariantStore for MemoryStore {
    fn atomic<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn VariantTransaction) -> Result<T, E>,
    {
        let mut tx = MemoryTransaction {
            catalog: &self.catalog,
            variants: self.variants.clone(),
        };
        let value = f(&mut tx)?;
        self.variants = tx.variants;
        Ok(value)
    }
}

struct MemoryTransaction<'a> {
    catalog: &'a Catalog,
    variants: BTreeMap<UniqueId, Variant>,
}

impl VariantTransaction for MemoryTransaction<'_> {
    fn load_catalog(&mut self) -> Result<Catalog, StoreError> {
        Ok(self.catalog.clone())
    }

    fn variant_ids(&mut self) -> Result<BTreeSet<UniqueId>, StoreError> {
        Ok(self.variants.keys().cloned().collect())
    }

    fn variant_ids_with_status(
        &mut self,
        status: VariantStatus,
    ) -> Result<BTreeSet<UniqueId>, StoreError> {
        Ok(self
            .variants
            .values()
            .filter(|v| v.status == status)
            .map(|v| v.unique_id.clone())
            .collect())
    }

    fn card_sets_with_status(
        &mut self,
        status: VariantStatus,
    ) -> Result<Vec<Vec<CardId>>, StoreError> {
        Ok(self
            .variants
            .values()
            .filter(|v| v.status == status)
            .map(|v| v.includes.clone())
            .collect())
    }

    fn get_variant(&mut self, id: &UniqueId) -> Result<Option<Variant>, StoreError> {
        Ok(self.variants.get(id).cloned())
    }

    fn list_variants(&mut self, filter: &VariantFilter) -> Result<Vec<Variant>, StoreError> {
        Ok(list(&self.variants, filter))
    }

    fn create_variant(&mut self, variant: &Variant) -> Result<(), StoreError> {
        if self.variants.contains_key(&variant.unique_id) {
            return Err(StoreError::Duplicate(variant.unique_id.clone()));
        }
        self.variants.insert(variant.unique_id.clone(), variant.clone());
        Ok(())
    }

    fn update_variant(&mut self, variant: &Variant) -> Result<(), StoreError> {
        let stored = self
            .variants
            .get_mut(&variant.unique_id)
            .ok_or_else(|| StoreError::NotFound(variant.unique_id.clone()))?;
        stored.of = variant.of.clone();
        stored.produces = variant.produces.clone();
        stored.prerequisites = variant.prerequisites.clone();
        stored.description = variant.description.clone();
        stored.status = variant.status;
        stored.updated = variant.updated;
        Ok(())
    }

    fn delete_variants(&mut self, ids: &BTreeSet<UniqueId>) -> Result<usize, StoreError> {
        let before = self.variants.len();
        self.variants.retain(|id, _| !ids.contains(id));
        Ok(before - self.variants.len())
    }
}

fn list(variants: &BTreeMap<UniqueId, Variant>, filter: &VariantFilter) -> Vec<Variant> {
    let mut listed: Vec<Variant> = variants
        .values()
        .filter(|v| filter.matches(v))
        .cloned()
        .collect();
    listed.sort_by(|a, b| filter.compare(a, b));
    listed
}
