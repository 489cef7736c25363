//! Spellbook Core - Catalog and variant types
//!
//! This crate provides the fundamental data model shared by every other
//! Spellbook crate:
//! - Strongly-typed ids for cards, features and combos
//! - The rule [`Catalog`] (cards, features, combos) with its indexes
//! - Derived [`Variant`] records, their status and content-hash identity
//! - The common error type

pub mod catalog;
pub mod error;
pub mod ids;
pub mod variant;

#[cfg(test)]
mod catalog_tests;
#[cfg(test)]
mod variant_tests;

pub use catalog::{Card, Catalog, CatalogBuilder, Combo, Feature};
pub use error::{Result, SpellbookError};
pub use ids::{CardId, ComboId, FeatureId};
pub use variant::{
    unique_id_from_card_ids, ParseStatusError, UniqueId, Variant, VariantDefinition,
    VariantStatus,
};
