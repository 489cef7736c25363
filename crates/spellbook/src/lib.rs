//! Spellbook - combo variant generation
//!
//! One call runs a full reconciliation pass: read the rule catalog, enumerate
//! every minimal card set realizing a generator combo, check each against
//! the card sets reviewers flagged as not working, and rewrite the persisted
//! variant set in a single transaction.
//!
//! # Example
//!
//! ```
//! use spellbook::prelude::*;
//!
//! let catalog = CatalogBuilder::new()
//!     .card(1, "Basalt Monolith")
//!     .card(2, "Rings of Brighthearth")
//!     .feature(10, "Infinite colorless mana", [])
//!     .combo(Combo::new(100).includes([1, 2]).produces([10]))
//!     .build()
//!     .unwrap();
//!
//! let mut store = MemoryStore::new(catalog);
//! let summary = generate_variants(&mut store, &GenerationConfig::default()).unwrap();
//! assert_eq!(summary.counts(), (1, 0, 0));
//! ```

pub use spellbook_config::{ConfigError, GenerationConfig, ThreadCount};
pub use spellbook_core::{
    unique_id_from_card_ids, Card, CardId, Catalog, CatalogBuilder, Combo, ComboId, Feature,
    FeatureId, Result, SpellbookError, UniqueId, Variant, VariantDefinition, VariantStatus,
};
pub use spellbook_store::{
    MemoryStore, SqliteStore, StoreError, VariantFilter, VariantOrder, VariantStore,
    VariantTransaction,
};

/// Lower-level solver API: models, the SAT-backed search, enumeration.
pub use spellbook_solver as solver;

#[cfg(feature = "console")]
pub use spellbook_console as console;

mod generate;
pub use generate::{generate_variants, GenerationSummary};

pub mod prelude {
    pub use super::{generate_variants, GenerationSummary};
    pub use super::{CatalogBuilder, Combo, GenerationConfig, ThreadCount};
    pub use super::{MemoryStore, SqliteStore, VariantFilter, VariantStore};
    pub use super::{CardId, ComboId, FeatureId, UniqueId, Variant, VariantStatus};
}
