//! Exact optimization over 0-1 linear models, backed by CryptoMiniSat.
//!
//! A [`Session`] owns a [`WorkingModel`] and one incremental SAT solver.
//! Every model constraint is encoded once as clauses; card-set exclusions
//! added through the session are appended to the same solver, so learnt
//! clauses carry over from one round of a seed to the next.
//!
//! Objective bounds, stage bounds and fixed variables never become
//! permanent clauses. Each is encoded behind assumption literals, and a
//! row already encoded in the session is reused from a cache.
//!
//! The objective is optimized by linear SAT-UNSAT search: after every
//! model the objective is bounded one step past its value until the
//! solver reports unsatisfiable; the last model is then optimal.
//!
//! # Outcome
//!
//! - search proved optimality: [`SolveStatus::Optimal`]
//! - no model at all: [`SolveStatus::Infeasible`]
//! - deadline reached first: [`SolveStatus::TimedOut`]; any incumbent found
//!   so far is discarded

mod encode;

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use cryptominisat::{Lbool, Lit, Solver};
use spellbook_core::CardId;
use tracing::trace;

use crate::model::{LinearConstraint, Objective, VarIndex, WorkingModel};
use crate::stats::SolveStats;
use encode::{encode_at_most, row_literals, Encoded};

/// An optimal assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    values: Vec<bool>,
    objective_value: i64,
}

impl Solution {
    /// Value of every variable, by variable index.
    pub fn values(&self) -> &[bool] {
        &self.values
    }

    pub fn value(&self, var: VarIndex) -> bool {
        self.values.get(var).copied().unwrap_or(false)
    }

    /// Objective value in its natural sense (a count of active variables).
    pub fn objective_value(&self) -> i64 {
        self.objective_value
    }
}

/// Termination condition of a solve call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal(Solution),
    Infeasible,
    TimedOut,
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal(_))
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self {
            SolveStatus::Optimal(solution) => Some(solution),
            _ => None,
        }
    }
}

/// Status plus search statistics of one solve call.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub stats: SolveStats,
}

/// Solves `model` for `objective` under the extra `bounds`, with the
/// variables in `assumptions` fixed, within `timeout`.
///
/// Builds a throwaway [`Session`]; callers solving the same model
/// repeatedly should keep a session instead.
pub fn solve(
    model: &WorkingModel,
    objective: Objective,
    bounds: &[LinearConstraint],
    assumptions: &[(VarIndex, bool)],
    timeout: Duration,
) -> SolveOutcome {
    Session::new(model.clone()).solve(objective, bounds, assumptions, timeout)
}

/// A working model paired with the SAT solver holding its encoding.
pub struct Session {
    model: WorkingModel,
    sat: Solver,
    /// Solver literal of every model variable.
    lits: Vec<Lit>,
    /// Model constraints already asserted, in [`WorkingModel::constraints`]
    /// order.
    asserted: usize,
    /// Set once a model constraint can hold in no assignment.
    infeasible: bool,
    bounds: HashMap<LinearConstraint, Encoded>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("vars", &self.lits.len())
            .field("asserted", &self.asserted)
            .field("cached_bounds", &self.bounds.len())
            .field("infeasible", &self.infeasible)
            .finish()
    }
}

impl Session {
    pub fn new(model: WorkingModel) -> Self {
        let mut sat = Solver::new();
        let lits = (0..model.var_count()).map(|_| sat.new_var()).collect();
        let mut session = Self {
            model,
            sat,
            lits,
            asserted: 0,
            infeasible: false,
            bounds: HashMap::new(),
        };
        session.assert_pending();
        session
    }

    pub fn model(&self) -> &WorkingModel {
        &self.model
    }

    pub fn into_model(self) -> WorkingModel {
        self.model
    }

    /// Forbids the exact card set `cards` in every later solve.
    ///
    /// Returns `false`, leaving the session untouched, when a card has no
    /// variable in the model.
    pub fn exclude_card_set(&mut self, cards: &[CardId]) -> bool {
        if !self.model.exclude_card_set(cards) {
            return false;
        }
        self.assert_pending();
        true
    }

    /// Solves the session's model for `objective` under the extra `bounds`,
    /// with the variables in `assumptions` fixed, within `timeout`.
    pub fn solve(
        &mut self,
        objective: Objective,
        bounds: &[LinearConstraint],
        assumptions: &[(VarIndex, bool)],
        timeout: Duration,
    ) -> SolveOutcome {
        let start = Instant::now();
        let mut stats = SolveStats::default();
        let status = self.optimize(objective, bounds, assumptions, start + timeout, &mut stats);
        stats.elapsed = start.elapsed();

        trace!(
            event = "solve",
            objective = %objective,
            optimal = status.is_optimal(),
            timed_out = matches!(status, SolveStatus::TimedOut),
            sat_calls = stats.sat_calls,
            incumbents = stats.incumbents,
            duration_ms = stats.elapsed.as_millis() as u64,
        );

        SolveOutcome { status, stats }
    }

    fn optimize(
        &mut self,
        objective: Objective,
        bounds: &[LinearConstraint],
        assumptions: &[(VarIndex, bool)],
        deadline: Instant,
        stats: &mut SolveStats,
    ) -> SolveStatus {
        if self.infeasible {
            return SolveStatus::Infeasible;
        }

        let mut assumed = Vec::with_capacity(assumptions.len());
        for &(var, value) in assumptions {
            let Some(&lit) = self.lits.get(var) else {
                return SolveStatus::Infeasible;
            };
            assumed.push(if value { lit } else { !lit });
        }
        for bound in bounds {
            match self.encode_bound(bound) {
                Encoded::Trivial => {}
                Encoded::Infeasible => return SolveStatus::Infeasible,
                Encoded::Assume(lits) => assumed.extend(lits),
            }
        }

        let objective_vars = objective.vars(&self.model);
        let fixed = assumed.len();
        let mut best = None;
        loop {
            match self.check(&assumed, deadline, stats) {
                Lbool::True => {}
                Lbool::False => break,
                Lbool::Undef => return SolveStatus::TimedOut,
            }

            let values = self.values();
            let value = objective_vars.iter().filter(|&&v| values.get(v) == Some(&true)).count() as i64;
            stats.incumbents += 1;
            best = Some(Solution {
                values,
                objective_value: value,
            });

            let next = if objective.is_minimize() { value - 1 } else { value + 1 };
            match self.encode_bound(&objective.bound_at(&self.model, next)) {
                Encoded::Assume(lits) => {
                    assumed.truncate(fixed);
                    assumed.extend(lits);
                }
                // already at the end of the objective's range
                Encoded::Infeasible | Encoded::Trivial => break,
            }
        }

        match best {
            Some(solution) => SolveStatus::Optimal(solution),
            None => SolveStatus::Infeasible,
        }
    }

    /// One SAT call limited to the time left before `deadline`.
    fn check(&mut self, assumed: &[Lit], deadline: Instant, stats: &mut SolveStats) -> Lbool {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Lbool::Undef;
        }
        self.sat.set_max_time(remaining.as_secs_f64());
        stats.sat_calls += 1;
        self.sat.solve_with_assumptions(assumed)
    }

    fn values(&self) -> Vec<bool> {
        let model = self.sat.get_model();
        self.lits
            .iter()
            .map(|lit| model.get(lit.var() as usize) == Some(&Lbool::True))
            .collect()
    }

    /// Asserts the model constraints added since the last call.
    fn assert_pending(&mut self) {
        let pending: Vec<LinearConstraint> =
            self.model.constraints().skip(self.asserted).cloned().collect();
        for row in &pending {
            let encoded = match row_literals(row, &self.lits) {
                Some((lits, bound)) => encode_at_most(&mut self.sat, &lits, bound, true),
                None => Encoded::Infeasible,
            };
            match encoded {
                Encoded::Trivial => {}
                Encoded::Infeasible => self.infeasible = true,
                Encoded::Assume(units) => {
                    for unit in units {
                        self.sat.add_clause(&[unit]);
                    }
                }
            }
        }
        self.asserted += pending.len();
    }

    fn encode_bound(&mut self, row: &LinearConstraint) -> Encoded {
        if let Some(encoded) = self.bounds.get(row) {
            return encoded.clone();
        }
        let encoded = match row_literals(row, &self.lits) {
            Some((lits, bound)) => encode_at_most(&mut self.sat, &lits, bound, false),
            None => Encoded::Infeasible,
        };
        self.bounds.insert(row.clone(), encoded.clone());
        encoded
    }
}
