//! Clausal encoding of `Σ aᵢ·xᵢ ≤ b` rows.
//!
//! A row with integer coefficients is read as an at-most-`k` constraint
//! over a multiset of literals: a term `a·x` with `a > 0` contributes `x`
//! `a` times, a term with `a < 0` contributes `¬x` `|a|` times and raises
//! the bound by `|a|`. The at-most constraint is then encoded by the
//! cheapest of unit literals, a single clause, or a totalizer whose
//! outputs are capped just above the bound.

use cryptominisat::{Lit, Solver};

use crate::model::LinearConstraint;

/// What a solve call has to assume for an encoded row to hold.
#[derive(Debug, Clone)]
pub(super) enum Encoded {
    /// Holds in every assignment.
    Trivial,
    /// Holds in no assignment.
    Infeasible,
    /// Holds whenever all of these literals hold.
    Assume(Vec<Lit>),
}

/// Reads `row` as `Σ lits ≤ bound`.
///
/// Returns `None` when the row names a variable outside `vars`.
pub(super) fn row_literals(row: &LinearConstraint, vars: &[Lit]) -> Option<(Vec<Lit>, i64)> {
    let mut lits = Vec::with_capacity(row.terms().len());
    let mut bound = row.bound();
    for &(var, coefficient) in row.terms() {
        let lit = *vars.get(var)?;
        let copies = coefficient.unsigned_abs() as usize;
        if coefficient > 0 {
            lits.extend(std::iter::repeat(lit).take(copies));
        } else {
            lits.extend(std::iter::repeat(!lit).take(copies));
            bound += coefficient.abs();
        }
    }
    Some((lits, bound))
}

/// Encodes `Σ lits ≤ bound` into `sat`.
///
/// A `permanent` row that fits a single clause is added as is; otherwise
/// the clause is guarded by a fresh selector that must be assumed.
pub(super) fn encode_at_most(
    sat: &mut Solver,
    lits: &[Lit],
    bound: i64,
    permanent: bool,
) -> Encoded {
    let n = lits.len() as i64;
    if bound < 0 {
        return Encoded::Infeasible;
    }
    if bound >= n {
        return Encoded::Trivial;
    }
    if bound == 0 {
        return Encoded::Assume(lits.iter().map(|&l| !l).collect());
    }
    if bound == n - 1 {
        // not all of them
        let mut clause: Vec<Lit> = lits.iter().map(|&l| !l).collect();
        if permanent {
            sat.add_clause(&clause);
            return Encoded::Assume(Vec::new());
        }
        let selector = sat.new_var();
        clause.push(!selector);
        sat.add_clause(&clause);
        return Encoded::Assume(vec![selector]);
    }

    let k = bound as usize;
    let at_least = lits.len() - k;
    if k < at_least {
        let outputs = totalizer(sat, lits, k + 1);
        Encoded::Assume(vec![!outputs[k]])
    } else {
        // Σ lits ≤ k  ⇔  Σ ¬lits ≥ n - k
        let negated: Vec<Lit> = lits.iter().map(|&l| !l).collect();
        let outputs = totalizer(sat, &negated, at_least);
        Encoded::Assume(vec![outputs[at_least - 1]])
    }
}

/// Unary count of `lits` capped at `cap`: output `j - 1` holds exactly
/// when at least `j` of `lits` hold, for every `j ≤ min(cap, |lits|)`.
fn totalizer(sat: &mut Solver, lits: &[Lit], cap: usize) -> Vec<Lit> {
    if lits.len() <= 1 {
        return lits.to_vec();
    }
    let (left, right) = lits.split_at(lits.len() / 2);
    let a = totalizer(sat, left, cap);
    let b = totalizer(sat, right, cap);

    let width = lits.len().min(cap);
    let outputs: Vec<Lit> = (0..width).map(|_| sat.new_var()).collect();
    for i in 0..=a.len() {
        for j in 0..=b.len() {
            // a ≥ i ∧ b ≥ j  →  out ≥ i + j
            if i + j > 0 {
                let mut clause = Vec::with_capacity(3);
                if i > 0 {
                    clause.push(!a[i - 1]);
                }
                if j > 0 {
                    clause.push(!b[j - 1]);
                }
                clause.push(outputs[(i + j).min(width) - 1]);
                sat.add_clause(&clause);
            }
            // out ≥ i + j + 1  →  a ≥ i + 1 ∨ b ≥ j + 1
            if i + j < width {
                let mut clause = Vec::with_capacity(3);
                if i < a.len() {
                    clause.push(a[i]);
                }
                if j < b.len() {
                    clause.push(b[j]);
                }
                clause.push(!outputs[i + j]);
                sat.add_clause(&clause);
            }
        }
    }
    outputs
}

#[cfg(test)]
mod tests {
    use cryptominisat::Lbool;

    use super::*;

    fn vars(sat: &mut Solver, n: usize) -> Vec<Lit> {
        (0..n).map(|_| sat.new_var()).collect()
    }

    fn holds(sat: &mut Solver, encoded: &Encoded, fixed: &[Lit]) -> bool {
        match encoded {
            Encoded::Trivial => true,
            Encoded::Infeasible => false,
            Encoded::Assume(extra) => {
                let mut assumptions = fixed.to_vec();
                assumptions.extend(extra.iter().copied());
                sat.solve_with_assumptions(&assumptions) == Lbool::True
            }
        }
    }

    fn fixed_assignment(lits: &[Lit], mask: u32) -> Vec<Lit> {
        lits.iter()
            .enumerate()
            .map(|(i, &l)| if mask & (1 << i) != 0 { l } else { !l })
            .collect()
    }

    #[test]
    fn test_at_most_matches_popcount() {
        let n = 6;
        for bound in -1..=(n as i64 + 1) {
            let mut sat = Solver::new();
            let lits = vars(&mut sat, n);
            let encoded = encode_at_most(&mut sat, &lits, bound, false);
            for mask in 0..(1u32 << n) {
                let fixed = fixed_assignment(&lits, mask);
                assert_eq!(
                    holds(&mut sat, &encoded, &fixed),
                    i64::from(mask.count_ones()) <= bound,
                    "bound {bound}, mask {mask:06b}"
                );
            }
        }
    }

    #[test]
    fn test_permanent_clause_needs_no_assumption() {
        let mut sat = Solver::new();
        let lits = vars(&mut sat, 3);
        let encoded = encode_at_most(&mut sat, &lits, 2, true);
        assert!(matches!(&encoded, Encoded::Assume(extra) if extra.is_empty()));
        assert!(!holds(&mut sat, &encoded, &lits));
        assert!(holds(&mut sat, &encoded, &[lits[0], lits[1], !lits[2]]));
    }

    #[test]
    fn test_guarded_clause_is_retractable() {
        let mut sat = Solver::new();
        let lits = vars(&mut sat, 3);
        let encoded = encode_at_most(&mut sat, &lits, 2, false);
        assert!(!holds(&mut sat, &encoded, &lits));
        // without the selector the clause does not apply
        assert!(holds(&mut sat, &Encoded::Assume(Vec::new()), &lits));
    }

    #[test]
    fn test_negative_coefficients_and_weights() {
        let mut sat = Solver::new();
        let vars = vars(&mut sat, 2);
        // 2·x - y ≤ 0
        let row = LinearConstraint::at_most([(0, 2), (1, -1)], 0);
        let (lits, bound) = row_literals(&row, &vars).expect("known vars");
        assert_eq!(lits.len(), 3);
        assert_eq!(bound, 1);

        let encoded = encode_at_most(&mut sat, &lits, bound, false);
        for mask in 0..4u32 {
            let x = mask & 1 != 0;
            let y = mask & 2 != 0;
            let fixed = fixed_assignment(&vars, mask);
            let activity = 2 * i64::from(x) - i64::from(y);
            assert_eq!(holds(&mut sat, &encoded, &fixed), activity <= 0);
        }
    }

    #[test]
    fn test_unknown_variable() {
        let mut sat = Solver::new();
        let vars = vars(&mut sat, 1);
        let row = LinearConstraint::sum_at_most([0, 5], 1);
        assert!(row_literals(&row, &vars).is_none());
    }
}
