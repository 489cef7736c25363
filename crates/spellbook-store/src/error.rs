use spellbook_core::{SpellbookError, UniqueId};
use thiserror::Error;

/// Errors raised by a variant store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Variant not found: {0}")]
    NotFound(UniqueId),

    #[error("Variant already exists: {0}")]
    Duplicate(UniqueId),

    #[error("Corrupt store: {0}")]
    Corrupt(String),
}

impl From<StoreError> for SpellbookError {
    fn from(err: StoreError) -> Self {
        SpellbookError::Store(err.to_string())
    }
}
