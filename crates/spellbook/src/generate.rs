//! The reconciliation pass.

use std::collections::BTreeSet;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use spellbook_config::GenerationConfig;
use spellbook_core::{
    Catalog, ComboId, Result, UniqueId, Variant, VariantDefinition, VariantStatus,
};
use spellbook_solver::{build_base_model, enumerate_variants, ValidityChecker};
use spellbook_store::{StoreError, VariantStore, VariantTransaction};
use tracing::{debug, info};

/// Outcome of one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Discovered variants with no prior record.
    pub added: usize,
    /// Discovered variants that were flagged for restore.
    pub restored: usize,
    /// Prior records no longer discovered.
    pub deleted: usize,
    /// Seeds skipped because their rule graph is cyclic or too deep.
    pub failed_seeds: Vec<ComboId>,
}

impl GenerationSummary {
    /// `(added, restored, deleted)`
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.added, self.restored, self.deleted)
    }
}

/// Regenerates every variant of the catalog held by `store`.
///
/// The whole pass runs inside one [`VariantStore::atomic`] unit: either the
/// variant set is fully reconciled, or nothing is written.
///
/// # Errors
///
/// Fails on an invalid `config` and on any store error. Seeds with a cyclic
/// or too deep rule graph do not fail the pass; they are listed in
/// [`GenerationSummary::failed_seeds`].
pub fn generate_variants<S: VariantStore>(
    store: &mut S,
    config: &GenerationConfig,
) -> Result<GenerationSummary> {
    config.validate()?;
    let start = Instant::now();

    let summary = store.atomic(|tx| reconcile(tx, config))?;

    info!(
        event = "generation_complete",
        added = summary.added,
        restored = summary.restored,
        deleted = summary.deleted,
        failed_seeds = summary.failed_seeds.len(),
        duration_ms = start.elapsed().as_millis() as u64,
    );
    Ok(summary)
}

fn reconcile(
    tx: &mut dyn VariantTransaction,
    config: &GenerationConfig,
) -> Result<GenerationSummary> {
    info!(event = "fetch_variants");
    let to_restore = tx.variant_ids_with_status(VariantStatus::Restore)?;
    let old_ids = tx.variant_ids()?;
    let catalog = tx.load_catalog()?;

    info!(
        event = "build_model",
        cards = catalog.card_count(),
        features = catalog.feature_count(),
        combos = catalog.combo_count(),
    );
    let base = build_base_model(&catalog, config.max_cards_in_combo);
    let enumeration = enumerate_variants(base.as_ref(), &catalog, config)?;

    if let Some(base) = &base {
        let not_working = tx.card_sets_with_status(VariantStatus::NotWorking)?;
        let mut checker = ValidityChecker::new(base, &not_working, config.solve_timeout());
        let now = unix_now();

        info!(event = "save_variants", variants = enumeration.len());
        for (unique_id, definition) in &enumeration.variants {
            let ok = checker.is_valid(&definition.card_ids);
            if old_ids.contains(unique_id) {
                let restore = to_restore.contains(unique_id);
                update_variant(tx, &catalog, unique_id, definition, ok, restore, now)?;
            } else {
                create_variant(tx, &catalog, unique_id, definition, ok, now)?;
            }
        }
    }

    let new_ids: BTreeSet<UniqueId> = enumeration.variants.keys().cloned().collect();
    let to_delete: BTreeSet<UniqueId> = old_ids.difference(&new_ids).cloned().collect();
    let added = new_ids.difference(&old_ids).count();
    let restored = new_ids.intersection(&to_restore).count();

    info!(event = "delete_variants", variants = to_delete.len());
    tx.delete_variants(&to_delete)?;

    Ok(GenerationSummary {
        added,
        restored,
        deleted: to_delete.len(),
        failed_seeds: enumeration.failed_seeds,
    })
}

fn update_variant(
    tx: &mut dyn VariantTransaction,
    catalog: &Catalog,
    unique_id: &UniqueId,
    definition: &VariantDefinition,
    ok: bool,
    restore: bool,
    now: i64,
) -> Result<()> {
    let mut variant = tx
        .get_variant(unique_id)?
        .ok_or_else(|| StoreError::NotFound(unique_id.clone()))?;

    variant.of = definition.combo_ids.clone();
    variant.produces = catalog.produced_features(&variant.of, &definition.feature_ids);
    if restore {
        let (prerequisites, description) = catalog.describe(&variant.of);
        variant.prerequisites = prerequisites;
        variant.description = description;
        variant.status = if ok {
            VariantStatus::New
        } else {
            VariantStatus::NotWorking
        };
    }
    if !ok {
        variant.status = VariantStatus::NotWorking;
    }
    if restore || !ok {
        variant.updated = now;
    }

    debug!(
        event = "variant_updated",
        unique_id = %unique_id,
        status = %variant.status,
        restore,
    );
    tx.update_variant(&variant)?;
    Ok(())
}

fn create_variant(
    tx: &mut dyn VariantTransaction,
    catalog: &Catalog,
    unique_id: &UniqueId,
    definition: &VariantDefinition,
    ok: bool,
    now: i64,
) -> Result<()> {
    let (prerequisites, description) = catalog.describe(&definition.combo_ids);
    let variant = Variant {
        unique_id: unique_id.clone(),
        includes: definition.card_ids.clone(),
        of: definition.combo_ids.clone(),
        produces: catalog.produced_features(&definition.combo_ids, &definition.feature_ids),
        prerequisites,
        description,
        status: if ok {
            VariantStatus::New
        } else {
            VariantStatus::NotWorking
        },
        created: now,
        updated: now,
    };

    debug!(
        event = "variant_created",
        unique_id = %unique_id,
        cards = variant.includes.len(),
        status = %variant.status,
    );
    tx.create_variant(&variant)?;
    Ok(())
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
