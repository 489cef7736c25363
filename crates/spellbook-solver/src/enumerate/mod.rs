//! Variant enumeration per seed combo, and the merge across seeds.
//!
//! A seed is enumerated by repeatedly running a lexicographic round on its
//! working model. Each solution becomes a [`VariantDefinition`] and its card
//! set is excluded from the model before the next round, until a round
//! fails.
//!
//! Seeds are independent: every seed gets its own working copy of the base
//! model and its own solver [`Session`]. They may run on a rayon pool, but their results are always merged
//! in ascending seed id, and a card set found by several seeds keeps the
//! definition of the highest seed id.


use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use spellbook_config::GenerationConfig;
use spellbook_core::{Catalog, ComboId, Result, SpellbookError, UniqueId, VariantDefinition};
use tracing::{debug, info, warn};

use crate::model::BaseModel;
use crate::priority::requirement_depths;
use crate::search::Session;
use crate::sequential::{solve_sequential, SequentialOutcome};
use crate::stats::SolveStats;

/// Variants found for one seed, in discovery order.
#[derive(Debug, Clone)]
pub struct SeedEnumeration {
    pub seed: ComboId,
    pub variants: Vec<VariantDefinition>,
    /// Whether the final round ended on a timeout rather than infeasibility.
    pub timed_out: bool,
    pub stats: SolveStats,
}

/// Merged result over all generator seeds.
#[derive(Debug, Clone, Default)]
pub struct VariantEnumeration {
    pub variants: BTreeMap<UniqueId, VariantDefinition>,
    /// Seeds skipped because their rule graph is cyclic or too deep.
    pub failed_seeds: Vec<ComboId>,
    pub stats: SolveStats,
}

impl VariantEnumeration {
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Enumerates every variant reachable from `seed`.
///
/// # Errors
///
/// Fails with a rule-graph error when the requirements below `seed` loop
/// or nest deeper than the recursion limit (see [`requirement_depths`]),
/// and with
/// [`SpellbookError::Internal`] when the seed has no variable in `base`.
pub fn enumerate_seed(
    base: &BaseModel,
    catalog: &Catalog,
    seed: ComboId,
    config: &GenerationConfig,
) -> Result<SeedEnumeration> {
    let depths = requirement_depths(catalog, seed, config.recursion_limit)?;
    let model = base
        .seeded(seed)
        .ok_or_else(|| SpellbookError::Internal(format!("combo {seed} missing from model")))?;
    let mut session = Session::new(model);
    let timeout = config.solve_timeout();

    let mut variants = Vec::new();
    let mut stats = SolveStats::default();
    let timed_out = loop {
        let solution = match solve_sequential(&mut session, timeout, &mut stats) {
            SequentialOutcome::Solved(solution) => solution,
            SequentialOutcome::Failed { stage, timed_out } => {
                debug!(
                    event = "seed_exhausted",
                    seed = seed.get(),
                    objective = %stage,
                    timed_out,
                    variants = variants.len(),
                );
                break timed_out;
            }
        };

        let model = session.model();
        let mut card_ids = model.active_cards(solution.values());
        depths.sort_cards(&mut card_ids);
        let definition = VariantDefinition {
            card_ids,
            combo_ids: model.active_combos(solution.values()).into_iter().collect(),
            feature_ids: model.active_features(solution.values()).into_iter().collect(),
        };
        if !session.exclude_card_set(&definition.card_ids) {
            return Err(SpellbookError::Internal(format!(
                "solution of combo {seed} uses a card outside the model"
            )));
        }
        variants.push(definition);
    };

    Ok(SeedEnumeration {
        seed,
        variants,
        timed_out,
        stats,
    })
}

/// Enumerates all generator combos of `catalog` and merges their variants.
///
/// Returns an empty enumeration when `base` is `None`.
///
/// # Errors
///
/// Rule-graph errors only skip their seed, which is then listed in
/// [`VariantEnumeration::failed_seeds`]. Any other error aborts the pass.
pub fn enumerate_variants(
    base: Option<&BaseModel>,
    catalog: &Catalog,
    config: &GenerationConfig,
) -> Result<VariantEnumeration> {
    let Some(base) = base else {
        return Ok(VariantEnumeration::default());
    };

    let seeds: Vec<ComboId> = catalog.generators().map(|combo| combo.id).collect();
    let thread_count = config.thread_count.resolve(seeds.len());
    let start = Instant::now();

    info!(
        event = "enumeration_start",
        seeds = seeds.len(),
        threads = thread_count,
    );

    let run = |seed: &ComboId| enumerate_seed(base, catalog, *seed, config);
    let results: Vec<Result<SeedEnumeration>> = if thread_count <= 1 {
        seeds.iter().map(run).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()
            .map_err(|e| SpellbookError::Internal(format!("failed to create thread pool: {e}")))?;
        pool.install(|| seeds.par_iter().map(run).collect())
    };

    let mut merged = VariantEnumeration::default();
    for (seed, result) in seeds.iter().zip(results) {
        match result {
            Ok(enumeration) => {
                merged.stats += enumeration.stats;
                for definition in enumeration.variants {
                    merged.variants.insert(definition.unique_id(), definition);
                }
            }
            Err(err) if err.is_rule_graph_error() => {
                warn!(event = "seed_failed", seed = seed.get(), error = %err);
                merged.failed_seeds.push(*seed);
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        event = "enumeration_complete",
        variants = merged.variants.len(),
        failed_seeds = merged.failed_seeds.len(),
        sat_calls = merged.stats.sat_calls,
        duration_ms = start.elapsed().as_millis() as u64,
    );

    Ok(merged)
}
