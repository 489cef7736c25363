//! Spellbook Solver Engine
//!
//! This crate turns a rule [`Catalog`](spellbook_core::Catalog) into variants:
//! - 0-1 linear model of the AND/OR implication structure (`model`)
//! - Exact optimizer on an incremental CryptoMiniSat session, with a
//!   per-call timeout (`search`)
//! - Three-stage lexicographic optimization (`sequential`)
//! - Requirement depths for card display order (`priority`)
//! - Per-seed enumeration with exclusion constraints, merged across seeds
//!   (`enumerate`)
//! - Validity check against known-broken card sets (`validity`)

pub mod enumerate;
pub mod model;
pub mod priority;
pub mod search;
pub mod sequential;
pub mod stats;
pub mod validity;

pub use enumerate::{enumerate_seed, enumerate_variants, SeedEnumeration, VariantEnumeration};
pub use model::{build_base_model, BaseModel, LinearConstraint, Objective, Var, WorkingModel};
pub use priority::{requirement_depths, RequirementDepths};
pub use search::{solve, Session, Solution, SolveOutcome, SolveStatus};
pub use sequential::{solve_sequential, SequentialOutcome};
pub use stats::SolveStats;
pub use validity::ValidityChecker;
