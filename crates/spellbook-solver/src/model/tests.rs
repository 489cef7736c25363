//! Tests for model construction and working copies.

use super::*;
use spellbook_core::{CardId, ComboId, FeatureId};
use spellbook_test::scenarios::{self, card_ids, CARD_A, CARD_B, COMBO_X, FEATURE_F};

fn two_card_model() -> BaseModel {
    build_base_model(&scenarios::two_card_combo(), 10).expect("model")
}

#[test]
fn test_empty_catalog_has_no_model() {
    assert!(build_base_model(&scenarios::empty(), 10).is_none());
}

#[test]
fn test_variable_layout() {
    let base = two_card_model();
    assert_eq!(base.var_count(), 4);
    assert_eq!(base.var_index(Var::Card(CardId(CARD_A))), Some(0));
    assert_eq!(base.var_index(Var::Card(CardId(CARD_B))), Some(1));
    assert_eq!(base.var_index(Var::Feature(FeatureId(FEATURE_F))), Some(2));
    assert_eq!(base.var_index(Var::Combo(ComboId(COMBO_X))), Some(3));
    assert_eq!(base.var_index(Var::Card(CardId(99))), None);
}

#[test]
fn test_constraint_count() {
    // card sum + (2 + 1) for X's AND + (1 + 1) for F's OR
    assert_eq!(two_card_model().constraint_count(), 6);
}

#[test]
fn test_and_linearization_follows_cards() {
    let model = two_card_model().working();
    let satisfied = |values: &[bool]| model.constraints().all(|c| c.is_satisfied(values));

    // c1 c2 F X
    assert!(satisfied(&[true, true, true, true]));
    assert!(satisfied(&[true, false, false, false]));
    assert!(satisfied(&[false, false, false, false]));
    // X active without its cards
    assert!(!satisfied(&[true, false, true, true]));
    // both cards but X inactive
    assert!(!satisfied(&[true, true, false, false]));
    // F active without a contributor
    assert!(!satisfied(&[false, false, true, false]));
    // X active but F inactive
    assert!(!satisfied(&[true, true, false, true]));
}

#[test]
fn test_card_sum_bound() {
    let base = build_base_model(&scenarios::two_card_combo(), 1).expect("model");
    let model = base.working();
    let all_active = [true, true, true, true];
    assert!(!model.constraints().all(|c| c.is_satisfied(&all_active)));
    assert_eq!(base.max_cards(), 1);
}

#[test]
fn test_linear_constraint_merges_terms() {
    let c = LinearConstraint::at_most([(0, 1), (1, 2), (0, 3), (1, -2)], 4);
    assert_eq!(c.terms(), &[(0, 4)]);
    assert_eq!(c.bound(), 4);
}

#[test]
fn test_at_least_is_negated() {
    let c = LinearConstraint::sum_at_least([0, 1], 1);
    assert_eq!(c.terms(), &[(0, -1), (1, -1)]);
    assert_eq!(c.bound(), -1);
    assert!(c.is_satisfied(&[true, false]));
    assert!(!c.is_satisfied(&[false, false]));
}

#[test]
fn test_fixed_constraint() {
    assert!(LinearConstraint::fixed(0, true).is_satisfied(&[true]));
    assert!(!LinearConstraint::fixed(0, true).is_satisfied(&[false]));
    assert!(LinearConstraint::fixed(0, false).is_satisfied(&[false]));
    assert!(!LinearConstraint::fixed(0, false).is_satisfied(&[true]));
}

#[test]
fn test_seeded_requires_combo() {
    let base = two_card_model();
    let seeded = base.seeded(ComboId(COMBO_X)).expect("seed");
    let inactive = [false, false, false, false];
    assert!(!seeded.constraints().all(|c| c.is_satisfied(&inactive)));
    assert!(base.working().constraints().all(|c| c.is_satisfied(&inactive)));
    assert!(base.seeded(ComboId(999)).is_none());
}

#[test]
fn test_exclusions_stay_in_their_copy() {
    let base = two_card_model();
    let mut first = base.seeded(ComboId(COMBO_X)).expect("seed");
    let second = first.clone();

    assert!(first.exclude_card_set(&card_ids(&[CARD_A, CARD_B])));
    assert_eq!(first.exclusion_count(), 1);
    assert_eq!(second.exclusion_count(), 0);
    assert_eq!(base.working().exclusion_count(), 0);

    let all_active = [true, true, true, true];
    assert!(!first.constraints().all(|c| c.is_satisfied(&all_active)));
    assert!(second.constraints().all(|c| c.is_satisfied(&all_active)));
}

#[test]
fn test_exclude_unknown_card_is_ignored() {
    let mut model = two_card_model().working();
    assert!(!model.exclude_card_set(&card_ids(&[CARD_A, 99])));
    assert_eq!(model.exclusion_count(), 0);
}

#[test]
fn test_active_entities() {
    let model = two_card_model().working();
    let values = [true, false, true, false];
    assert_eq!(model.active_cards(&values), vec![CardId(CARD_A)]);
    assert_eq!(model.active_features(&values), vec![FeatureId(FEATURE_F)]);
    assert!(model.active_combos(&values).is_empty());
}

#[test]
fn test_objective_bounds() {
    let model = two_card_model().working();
    let cards = Objective::MinimizeCards.bound_at(&model, 1);
    assert!(cards.is_satisfied(&[true, false, false, false]));
    assert!(!cards.is_satisfied(&[true, true, false, false]));

    let combined = Objective::MaximizeFeaturesAndCombos.bound_at(&model, 2);
    assert!(combined.is_satisfied(&[false, false, true, true]));
    assert!(!combined.is_satisfied(&[false, false, true, false]));
}
