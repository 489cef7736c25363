//! Translation of a catalog into its base model.

use std::collections::HashMap;

use spellbook_core::Catalog;
use tracing::debug;

use super::{BaseModel, LinearConstraint, ModelStructure, Var, VarIndex};

/// Builds the base model of `catalog`.
///
/// Variables are laid out cards first, then features, then combos, each in
/// ascending id order. Constraints:
///
/// - `Σ c ≤ max_cards`
/// - per combo `b = AND(includes ∪ needs)`:
///   `b ≤ x` for every requirement `x`, and `b ≥ Σ x - n + 1`
/// - per feature `f = OR(cards ∪ producers)`:
///   `f ≥ x` for every contributor `x`, and `f ≤ Σ x`
///
/// Returns `None` when the catalog has no cards; there is nothing to
/// enumerate then.
pub fn build_base_model(catalog: &Catalog, max_cards: usize) -> Option<BaseModel> {
    if catalog.card_count() == 0 {
        return None;
    }

    let mut vars = Vec::with_capacity(
        catalog.card_count() + catalog.feature_count() + catalog.combo_count(),
    );
    vars.extend(catalog.cards().map(|c| Var::Card(c.id)));
    vars.extend(catalog.features().map(|f| Var::Feature(f.id)));
    vars.extend(catalog.combos().map(|b| Var::Combo(b.id)));

    let index: HashMap<Var, VarIndex> = vars.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    let card_vars: Vec<VarIndex> = (0..catalog.card_count()).collect();
    let feature_start = catalog.card_count();
    let combo_start = feature_start + catalog.feature_count();
    let feature_vars: Vec<VarIndex> = (feature_start..combo_start).collect();
    let combo_vars: Vec<VarIndex> = (combo_start..vars.len()).collect();

    let mut constraints = Vec::new();
    constraints.push(LinearConstraint::sum_at_most(
        card_vars.iter().copied(),
        max_cards as i64,
    ));

    // Catalog references were checked when it was built
    let lookup = |var: Var| index.get(&var).copied();

    for combo in catalog.combos() {
        let Some(b) = lookup(Var::Combo(combo.id)) else {
            continue;
        };
        let requirements: Vec<VarIndex> = combo
            .includes
            .iter()
            .filter_map(|&c| lookup(Var::Card(c)))
            .chain(combo.needs.iter().filter_map(|&f| lookup(Var::Feature(f))))
            .collect();
        for &x in &requirements {
            // b ≤ x
            constraints.push(LinearConstraint::at_most([(b, 1), (x, -1)], 0));
        }
        // b ≥ Σx - n + 1  ⇔  Σx - b ≤ n - 1
        let n = requirements.len() as i64;
        constraints.push(LinearConstraint::at_most(
            requirements.iter().map(|&x| (x, 1)).chain([(b, -1)]),
            n - 1,
        ));
    }

    for feature in catalog.features() {
        let Some(f) = lookup(Var::Feature(feature.id)) else {
            continue;
        };
        let contributors: Vec<VarIndex> = feature
            .cards
            .iter()
            .filter_map(|&c| lookup(Var::Card(c)))
            .chain(
                feature
                    .produced_by
                    .iter()
                    .filter_map(|&b| lookup(Var::Combo(b))),
            )
            .collect();
        for &x in &contributors {
            // f ≥ x
            constraints.push(LinearConstraint::at_most([(x, 1), (f, -1)], 0));
        }
        // f ≤ Σx
        constraints.push(LinearConstraint::at_most(
            contributors.iter().map(|&x| (x, -1)).chain([(f, 1)]),
            0,
        ));
    }

    debug!(
        event = "model_built",
        vars = vars.len(),
        constraints = constraints.len(),
        max_cards,
    );

    Some(BaseModel::new(ModelStructure {
        vars,
        index,
        card_vars,
        feature_vars,
        combo_vars,
        constraints,
        max_cards,
    }))
}
