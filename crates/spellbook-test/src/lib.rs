//! Shared test fixtures for Spellbook crates.
//!
//! This crate provides catalog builders for testing. It depends on
//! `spellbook-core` and a seeded RNG only, so every other crate can use it
//! as a dev-dependency.
//!
//! - [`scenarios`] - small catalogs with known variant sets
//! - [`graphs`] - deep, cyclic and random production graphs
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! spellbook-test = { workspace = true }
//! ```
//!
//! ```
//! use spellbook_test::scenarios;
//!
//! let catalog = scenarios::two_card_combo();
//! assert_eq!(catalog.card_count(), 2);
//! ```

pub mod graphs;
pub mod scenarios;

pub use scenarios::{card_ids, combo_ids, feature_ids};
