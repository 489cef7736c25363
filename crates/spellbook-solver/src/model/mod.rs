//! 0-1 linear model of a rule catalog.
//!
//! A model has one boolean variable per card, feature and combo. All
//! constraints are kept in the normalized form `Σ aᵢ·xᵢ ≤ b`.
//!
//! The structure produced by [`build_base_model`] is immutable and shared
//! behind an `Arc`. Everything that varies per seed (the seed requirement
//! and the accumulated exclusion constraints) lives in a [`WorkingModel`],
//! so cloning a working model never lets one seed observe another seed's
//! constraints.

mod builder;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;
use spellbook_core::{CardId, ComboId, FeatureId};

pub use builder::build_base_model;

/// Index of a variable inside a model.
pub type VarIndex = usize;

/// A model variable, named by the catalog entity it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Var {
    Card(CardId),
    Feature(FeatureId),
    Combo(ComboId),
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Var::Card(id) => write!(f, "c[{id}]"),
            Var::Feature(id) => write!(f, "f[{id}]"),
            Var::Combo(id) => write!(f, "b[{id}]"),
        }
    }
}

/// A linear constraint `Σ aᵢ·xᵢ ≤ bound` over 0-1 variables.
///
/// Terms are merged per variable and zero coefficients dropped, so every
/// variable appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinearConstraint {
    terms: SmallVec<[(VarIndex, i64); 8]>,
    bound: i64,
}

impl LinearConstraint {
    /// `Σ aᵢ·xᵢ ≤ bound`
    pub fn at_most<I: IntoIterator<Item = (VarIndex, i64)>>(terms: I, bound: i64) -> Self {
        let mut merged: BTreeMap<VarIndex, i64> = BTreeMap::new();
        for (var, coefficient) in terms {
            *merged.entry(var).or_insert(0) += coefficient;
        }
        Self {
            terms: merged.into_iter().filter(|&(_, a)| a != 0).collect(),
            bound,
        }
    }

    /// `Σ aᵢ·xᵢ ≥ bound`
    pub fn at_least<I: IntoIterator<Item = (VarIndex, i64)>>(terms: I, bound: i64) -> Self {
        Self::at_most(terms.into_iter().map(|(v, a)| (v, -a)), -bound)
    }

    /// `Σ xᵢ ≤ bound`
    pub fn sum_at_most<I: IntoIterator<Item = VarIndex>>(vars: I, bound: i64) -> Self {
        Self::at_most(vars.into_iter().map(|v| (v, 1)), bound)
    }

    /// `Σ xᵢ ≥ bound`
    pub fn sum_at_least<I: IntoIterator<Item = VarIndex>>(vars: I, bound: i64) -> Self {
        Self::at_least(vars.into_iter().map(|v| (v, 1)), bound)
    }

    /// `x = value`
    pub fn fixed(var: VarIndex, value: bool) -> Self {
        if value {
            Self::at_least([(var, 1)], 1)
        } else {
            Self::at_most([(var, 1)], 0)
        }
    }

    pub fn terms(&self) -> &[(VarIndex, i64)] {
        &self.terms
    }

    pub fn bound(&self) -> i64 {
        self.bound
    }

    /// Evaluates the constraint against a complete assignment.
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        let activity: i64 = self
            .terms
            .iter()
            .filter(|&&(v, _)| values.get(v).copied().unwrap_or(false))
            .map(|&(_, a)| a)
            .sum();
        activity <= self.bound
    }
}

/// Objectives a solve call can optimize.
///
/// Exactly one objective is active per solve; which one is chosen by the
/// caller rather than toggled on the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Objective {
    /// Minimize the number of active cards.
    MinimizeCards,
    /// Maximize the number of active features.
    MaximizeFeatures,
    /// Maximize the number of active combos.
    MaximizeCombos,
    /// Maximize active features plus active combos.
    MaximizeFeaturesAndCombos,
}

impl Objective {
    pub fn is_minimize(self) -> bool {
        matches!(self, Objective::MinimizeCards)
    }

    /// Variables whose count the objective measures.
    pub fn vars(self, model: &WorkingModel) -> Vec<VarIndex> {
        let s = &model.structure;
        match self {
            Objective::MinimizeCards => s.card_vars.clone(),
            Objective::MaximizeFeatures => s.feature_vars.clone(),
            Objective::MaximizeCombos => s.combo_vars.clone(),
            Objective::MaximizeFeaturesAndCombos => {
                s.feature_vars.iter().chain(&s.combo_vars).copied().collect()
            }
        }
    }

    /// Constraint freezing the objective at `value`: `Σ ≤ value` when
    /// minimizing, `Σ ≥ value` when maximizing.
    pub fn bound_at(self, model: &WorkingModel, value: i64) -> LinearConstraint {
        let vars = self.vars(model);
        if self.is_minimize() {
            LinearConstraint::sum_at_most(vars, value)
        } else {
            LinearConstraint::sum_at_least(vars, value)
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::MinimizeCards => write!(f, "MinimizeCards"),
            Objective::MaximizeFeatures => write!(f, "MaximizeFeatures"),
            Objective::MaximizeCombos => write!(f, "MaximizeCombos"),
            Objective::MaximizeFeaturesAndCombos => write!(f, "MaximizeFeaturesAndCombos"),
        }
    }
}

/// Immutable part of a model, shared by every working copy.
#[derive(Debug)]
pub(crate) struct ModelStructure {
    pub(crate) vars: Vec<Var>,
    pub(crate) index: HashMap<Var, VarIndex>,
    pub(crate) card_vars: Vec<VarIndex>,
    pub(crate) feature_vars: Vec<VarIndex>,
    pub(crate) combo_vars: Vec<VarIndex>,
    pub(crate) constraints: Vec<LinearConstraint>,
    pub(crate) max_cards: usize,
}

/// The model of a whole catalog, before any seed is chosen.
#[derive(Debug, Clone)]
pub struct BaseModel {
    structure: Arc<ModelStructure>,
}

impl BaseModel {
    pub(crate) fn new(structure: ModelStructure) -> Self {
        Self {
            structure: Arc::new(structure),
        }
    }

    /// A working copy with no extra constraints.
    pub fn working(&self) -> WorkingModel {
        WorkingModel {
            structure: Arc::clone(&self.structure),
            requirements: Vec::new(),
            exclusions: Vec::new(),
        }
    }

    /// A working copy forcing `combo` to be realized.
    ///
    /// Returns `None` if the combo is not part of the model.
    pub fn seeded(&self, combo: ComboId) -> Option<WorkingModel> {
        let var = self.var_index(Var::Combo(combo))?;
        let mut model = self.working();
        model.requirements.push(LinearConstraint::fixed(var, true));
        Some(model)
    }

    pub fn var_index(&self, var: Var) -> Option<VarIndex> {
        self.structure.index.get(&var).copied()
    }

    pub fn var_count(&self) -> usize {
        self.structure.vars.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.structure.constraints.len()
    }

    pub fn max_cards(&self) -> usize {
        self.structure.max_cards
    }
}

/// A mutable working copy of a [`BaseModel`].
///
/// Holds the seed requirement and the exclusion constraints accumulated
/// while enumerating. The base structure is shared, never modified.
#[derive(Debug, Clone)]
pub struct WorkingModel {
    structure: Arc<ModelStructure>,
    requirements: Vec<LinearConstraint>,
    exclusions: Vec<LinearConstraint>,
}

impl WorkingModel {
    pub fn var_index(&self, var: Var) -> Option<VarIndex> {
        self.structure.index.get(&var).copied()
    }

    pub fn var(&self, index: VarIndex) -> Option<Var> {
        self.structure.vars.get(index).copied()
    }

    pub fn var_count(&self) -> usize {
        self.structure.vars.len()
    }

    pub fn card_vars(&self) -> &[VarIndex] {
        &self.structure.card_vars
    }

    pub fn feature_vars(&self) -> &[VarIndex] {
        &self.structure.feature_vars
    }

    pub fn combo_vars(&self) -> &[VarIndex] {
        &self.structure.combo_vars
    }

    /// Base constraints, then requirements, then exclusions.
    pub fn constraints(&self) -> impl Iterator<Item = &LinearConstraint> {
        self.structure
            .constraints
            .iter()
            .chain(&self.requirements)
            .chain(&self.exclusions)
    }

    pub fn exclusion_count(&self) -> usize {
        self.exclusions.len()
    }

    /// Forbids `cards` from all being active together again:
    /// `Σ c ≤ |cards| - 1`.
    ///
    /// Returns false, adding nothing, if a card is unknown to the model;
    /// such a set can never be active anyway.
    pub fn exclude_card_set(&mut self, cards: &[CardId]) -> bool {
        let mut vars = Vec::with_capacity(cards.len());
        for &card in cards {
            match self.var_index(Var::Card(card)) {
                Some(v) => vars.push(v),
                None => return false,
            }
        }
        vars.sort_unstable();
        vars.dedup();
        let bound = vars.len() as i64 - 1;
        self.exclusions.push(LinearConstraint::sum_at_most(vars, bound));
        true
    }

    /// Active cards of a solution, ascending by id.
    pub fn active_cards(&self, values: &[bool]) -> Vec<CardId> {
        self.active(values, &self.structure.card_vars)
            .filter_map(|v| match v {
                Var::Card(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Active features of a solution, ascending by id.
    pub fn active_features(&self, values: &[bool]) -> Vec<FeatureId> {
        self.active(values, &self.structure.feature_vars)
            .filter_map(|v| match v {
                Var::Feature(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Active combos of a solution, ascending by id.
    pub fn active_combos(&self, values: &[bool]) -> Vec<ComboId> {
        self.active(values, &self.structure.combo_vars)
            .filter_map(|v| match v {
                Var::Combo(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn active<'a>(
        &'a self,
        values: &'a [bool],
        vars: &'a [VarIndex],
    ) -> impl Iterator<Item = Var> + 'a {
        vars.iter()
            .filter(move |&&v| values.get(v).copied().unwrap_or(false))
            .map(move |&v| self.structure.vars[v])
    }
}
