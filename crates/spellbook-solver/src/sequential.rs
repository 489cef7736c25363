//! Three-stage lexicographic solve.
//!
//! 1. minimize active cards
//! 2. maximize active features, cards frozen at their optimum
//! 3. maximize active combos, cards and features frozen
//!
//! Each stage is one [`Session::solve`] call with the earlier optima passed
//! in as bound constraints. The bounds are only assumed for the call, so
//! nothing of a round leaks into the next one.

use std::time::Duration;

use tracing::trace;

use crate::model::{LinearConstraint, Objective};
use crate::search::{Session, Solution, SolveStatus};
use crate::stats::SolveStats;

/// Objectives in the order they are optimized.
pub const STAGES: [Objective; 3] = [
    Objective::MinimizeCards,
    Objective::MaximizeFeatures,
    Objective::MaximizeCombos,
];

/// Result of a lexicographic round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequentialOutcome {
    /// Every stage reached optimality; the solution of the last stage.
    Solved(Solution),
    /// A stage was infeasible or ran out of time.
    Failed { stage: Objective, timed_out: bool },
}

impl SequentialOutcome {
    pub fn into_solution(self) -> Option<Solution> {
        match self {
            SequentialOutcome::Solved(solution) => Some(solution),
            SequentialOutcome::Failed { .. } => None,
        }
    }
}

/// Runs one lexicographic round on the model of `session`, each stage
/// bounded by `timeout`. Statistics of all stages are added to `stats`.
pub fn solve_sequential(
    session: &mut Session,
    timeout: Duration,
    stats: &mut SolveStats,
) -> SequentialOutcome {
    let mut bounds: Vec<LinearConstraint> = Vec::with_capacity(STAGES.len() - 1);
    let mut last = None;

    for stage in STAGES {
        let outcome = session.solve(stage, &bounds, &[], timeout);
        *stats += outcome.stats;
        match outcome.status {
            SolveStatus::Optimal(solution) => {
                bounds.push(stage.bound_at(session.model(), solution.objective_value()));
                last = Some(solution);
            }
            SolveStatus::Infeasible => {
                return SequentialOutcome::Failed {
                    stage,
                    timed_out: false,
                }
            }
            SolveStatus::TimedOut => {
                trace!(event = "stage_timed_out", objective = %stage);
                return SequentialOutcome::Failed {
                    stage,
                    timed_out: true,
                };
            }
        }
    }

    match last {
        Some(solution) => SequentialOutcome::Solved(solution),
        None => SequentialOutcome::Failed {
            stage: Objective::MinimizeCards,
            timed_out: false,
        },
    }
}
