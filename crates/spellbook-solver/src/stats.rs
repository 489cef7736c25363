//! Search statistics.
//!
//! Stack-allocated counters for one solve call, and their aggregate over a
//! seed's enumeration.

use std::ops::AddAssign;
use std::time::Duration;

/// Counters of a SAT-backed optimization run.
///
/// # Example
///
/// ```
/// use spellbook_solver::SolveStats;
/// use std::time::Duration;
///
/// let mut total = SolveStats::default();
/// total += SolveStats { sat_calls: 4, incumbents: 3, elapsed: Duration::from_millis(2) };
/// total += SolveStats { sat_calls: 1, incumbents: 0, elapsed: Duration::from_millis(1) };
///
/// assert_eq!(total.sat_calls, 5);
/// assert_eq!(total.incumbents, 3);
/// assert_eq!(total.elapsed, Duration::from_millis(3));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Calls into the SAT solver.
    pub sat_calls: u64,
    /// Improving solutions found.
    pub incumbents: u64,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

impl SolveStats {
    /// SAT calls per second.
    pub fn calls_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.sat_calls as f64 / secs
        } else {
            0.0
        }
    }
}

impl AddAssign for SolveStats {
    fn add_assign(&mut self, other: Self) {
        self.sat_calls += other.sat_calls;
        self.incumbents += other.incumbents;
        self.elapsed += other.elapsed;
    }
}
