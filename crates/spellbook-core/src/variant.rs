//! Derived variant records and their content-hash identity.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::ids::{CardId, ComboId, FeatureId};

/// Review status of a variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VariantStatus {
    /// Freshly discovered, not reviewed yet.
    #[default]
    New,
    /// Reviewed and published.
    Ok,
    /// Known to be broken; its exact card set is forbidden for validity.
    NotWorking,
    /// Requested recomputation of text and status on next discovery.
    Restore,
}

impl VariantStatus {
    pub const ALL: [VariantStatus; 4] = [
        VariantStatus::New,
        VariantStatus::Ok,
        VariantStatus::NotWorking,
        VariantStatus::Restore,
    ];

    /// Stable code used by persistent stores.
    pub fn as_str(self) -> &'static str {
        match self {
            VariantStatus::New => "NEW",
            VariantStatus::Ok => "OK",
            VariantStatus::NotWorking => "NOT_WORKING",
            VariantStatus::Restore => "RESTORE",
        }
    }
}

impl fmt::Display for VariantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a [`VariantStatus`] code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown variant status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for VariantStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VariantStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// Content hash identifying a variant by its card set.
///
/// Hex-encoded SHA-256 of the canonical serialization of the sorted card
/// ids. See [`unique_id_from_card_ids`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UniqueId(String);

impl UniqueId {
    /// Wraps an already computed digest, e.g. one read back from a store.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the identity of a card set, independent of card order.
///
/// The digest input is the sorted id list rendered as `[1, 2, 3]`, the
/// serialization identities were first persisted with.
///
/// # Example
///
/// ```
/// use spellbook_core::{unique_id_from_card_ids, CardId};
///
/// let a = unique_id_from_card_ids(&[CardId(3), CardId(1), CardId(2)]);
/// let b = unique_id_from_card_ids(&[CardId(1), CardId(2), CardId(3)]);
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 64);
/// ```
pub fn unique_id_from_card_ids(cards: &[CardId]) -> UniqueId {
    let mut ids: Vec<i64> = cards.iter().map(|c| c.get()).collect();
    ids.sort_unstable();
    let canonical = format!(
        "[{}]",
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    UniqueId(hex::encode(hasher.finalize()))
}

/// One solution read off an enumerated model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDefinition {
    /// Cards in display order (requirement depth, then id).
    pub card_ids: Vec<CardId>,
    /// Combos realized by the card set.
    pub combo_ids: BTreeSet<ComboId>,
    /// Features active in the solution, before removals.
    pub feature_ids: BTreeSet<FeatureId>,
}

impl VariantDefinition {
    pub fn unique_id(&self) -> UniqueId {
        unique_id_from_card_ids(&self.card_ids)
    }
}

/// A persisted variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub unique_id: UniqueId,
    /// Cards in display order.
    pub includes: Vec<CardId>,
    /// Combos the variant realizes.
    pub of: BTreeSet<ComboId>,
    /// Features the variant yields, removals applied.
    pub produces: BTreeSet<FeatureId>,
    pub prerequisites: String,
    pub description: String,
    pub status: VariantStatus,
    /// Seconds since the Unix epoch.
    pub created: i64,
    /// Seconds since the Unix epoch.
    pub updated: i64,
}
