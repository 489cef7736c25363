//! Validity of candidate card sets against known-broken variants.

use std::collections::BTreeSet;
use std::time::Duration;

use spellbook_core::CardId;
use tracing::debug;

use crate::model::{BaseModel, Objective, Var, VarIndex};
use crate::search::Session;

/// Checks card sets against the base model with every NOT_WORKING card set
/// forbidden.
///
/// The checker keeps one solver session, so the encoding of the model is
/// shared by every check.
#[derive(Debug)]
pub struct ValidityChecker {
    session: Session,
    timeout: Duration,
}

impl ValidityChecker {
    /// Builds a checker forbidding each of the `not_working` card sets.
    ///
    /// A set naming a card the catalog no longer has can never be active
    /// and is skipped.
    pub fn new<I, S>(base: &BaseModel, not_working: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[CardId]>,
    {
        let mut model = base.working();
        for cards in not_working {
            if !model.exclude_card_set(cards.as_ref()) {
                debug!(event = "exclusion_skipped", cards = cards.as_ref().len());
            }
        }
        Self {
            session: Session::new(model),
            timeout,
        }
    }

    pub fn excluded_count(&self) -> usize {
        self.session.model().exclusion_count()
    }

    /// Whether exactly `cards` active, every other card inactive, is a
    /// feasible state of the model.
    pub fn is_valid(&mut self, cards: &[CardId]) -> bool {
        let model = self.session.model();
        let wanted: BTreeSet<CardId> = cards.iter().copied().collect();
        if wanted
            .iter()
            .any(|&card| model.var_index(Var::Card(card)).is_none())
        {
            return false;
        }

        let assumptions: Vec<(VarIndex, bool)> = model
            .card_vars()
            .iter()
            .map(|&v| {
                let active = matches!(
                    model.var(v),
                    Some(Var::Card(card)) if wanted.contains(&card)
                );
                (v, active)
            })
            .collect();

        self.session
            .solve(
                Objective::MaximizeFeaturesAndCombos,
                &[],
                &assumptions,
                self.timeout,
            )
            .status
            .is_optimal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::build_base_model;
    use spellbook_test::scenarios::{self, card_ids, CARD_A, CARD_B, CARD_C};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn checker(not_working: &[Vec<CardId>]) -> ValidityChecker {
        let base = build_base_model(&scenarios::alternative_routes(), 10).expect("model");
        ValidityChecker::new(&base, not_working, TIMEOUT)
    }

    #[test]
    fn test_everything_valid_without_exclusions() {
        let mut checker = checker(&[]);
        assert!(checker.is_valid(&card_ids(&[CARD_A, CARD_C])));
        assert!(checker.is_valid(&card_ids(&[CARD_B, CARD_C])));
        assert!(checker.is_valid(&[]));
    }

    #[test]
    fn test_not_working_set_is_invalid() {
        let mut checker = checker(&[card_ids(&[CARD_C, CARD_A])]);
        assert_eq!(checker.excluded_count(), 1);
        assert!(!checker.is_valid(&card_ids(&[CARD_A, CARD_C])));
        assert!(checker.is_valid(&card_ids(&[CARD_B, CARD_C])));
    }

    #[test]
    fn test_superset_of_not_working_set_is_invalid() {
        let mut checker = checker(&[card_ids(&[CARD_A, CARD_C])]);
        assert!(!checker.is_valid(&card_ids(&[CARD_A, CARD_B, CARD_C])));
        assert!(checker.is_valid(&card_ids(&[CARD_A])));
    }

    #[test]
    fn test_unknown_cards() {
        let mut checker = checker(&[card_ids(&[CARD_A, 99])]);
        assert_eq!(checker.excluded_count(), 0);
        assert!(checker.is_valid(&card_ids(&[CARD_A, CARD_C])));
        assert!(!checker.is_valid(&card_ids(&[CARD_A, 99])));
    }

    #[test]
    fn test_size_bound_applies() {
        let base = build_base_model(&scenarios::alternative_routes(), 2).expect("model");
        let mut checker = ValidityChecker::new(&base, Vec::<Vec<CardId>>::new(), TIMEOUT);
        assert!(checker.is_valid(&card_ids(&[CARD_A, CARD_C])));
        assert!(!checker.is_valid(&card_ids(&[CARD_A, CARD_B, CARD_C])));
    }

    #[test]
    fn test_repeated_checks_do_not_interfere() {
        let mut checker = checker(&[card_ids(&[CARD_A, CARD_C])]);
        for _ in 0..3 {
            assert!(!checker.is_valid(&card_ids(&[CARD_A, CARD_C])));
            assert!(checker.is_valid(&card_ids(&[CARD_B, CARD_C])));
            assert!(checker.is_valid(&card_ids(&[CARD_A])));
        }
        assert_eq!(checker.excluded_count(), 1);
    }

    #[test]
    fn test_zero_timeout_reports_invalid() {
        let base = build_base_model(&scenarios::alternative_routes(), 10).expect("model");
        let mut checker = ValidityChecker::new(&base, Vec::<Vec<CardId>>::new(), Duration::ZERO);
        assert!(!checker.is_valid(&card_ids(&[CARD_A, CARD_C])));
    }
}
