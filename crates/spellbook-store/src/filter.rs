//! Variant listing criteria.

use std::cmp::Ordering;

use spellbook_core::{CardId, ComboId, FeatureId, Variant, VariantStatus};

/// Sort key of a variant listing. Ties are broken by unique id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VariantOrder {
    #[default]
    UniqueId,
    Created,
    Updated,
}

/// Criteria of a variant listing.
///
/// Unset criteria match every variant; set ones must all hold.
///
/// # Example
///
/// ```
/// use spellbook_core::{CardId, VariantStatus};
/// use spellbook_store::{VariantFilter, VariantOrder};
///
/// let filter = VariantFilter::published()
///     .with_card(CardId(7))
///     .ordered_by(VariantOrder::Updated, true);
/// assert_eq!(filter.status, Some(VariantStatus::Ok));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantFilter {
    pub status: Option<VariantStatus>,
    /// Card the variant must include.
    pub card: Option<CardId>,
    /// Feature the variant must produce.
    pub feature: Option<FeatureId>,
    /// Combo the variant must realize.
    pub combo: Option<ComboId>,
    pub order: VariantOrder,
    pub descending: bool,
}

impl VariantFilter {
    /// Every variant, by unique id.
    pub fn all() -> Self {
        Self::default()
    }

    /// Variants a reviewer marked as working.
    pub fn published() -> Self {
        Self::default().with_status(VariantStatus::Ok)
    }

    pub fn with_status(mut self, status: VariantStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_card(mut self, card: CardId) -> Self {
        self.card = Some(card);
        self
    }

    pub fn with_feature(mut self, feature: FeatureId) -> Self {
        self.feature = Some(feature);
        self
    }

    pub fn with_combo(mut self, combo: ComboId) -> Self {
        self.combo = Some(combo);
        self
    }

    pub fn ordered_by(mut self, order: VariantOrder, descending: bool) -> Self {
        self.order = order;
        self.descending = descending;
        self
    }

    pub fn matches(&self, variant: &Variant) -> bool {
        self.status.map_or(true, |s| variant.status == s)
            && self.card.map_or(true, |c| variant.includes.contains(&c))
            && self.feature.map_or(true, |f| variant.produces.contains(&f))
            && self.combo.map_or(true, |b| variant.of.contains(&b))
    }

    /// Listing order of two variants.
    pub fn compare(&self, a: &Variant, b: &Variant) -> Ordering {
        let key = match self.order {
            VariantOrder::UniqueId => Ordering::Equal,
            VariantOrder::Created => a.created.cmp(&b.created),
            VariantOrder::Updated => a.updated.cmp(&b.updated),
        };
        let by_id = a.unique_id.cmp(&b.unique_id);
        match (self.order, self.descending) {
            (VariantOrder::UniqueId, true) => by_id.reverse(),
            (VariantOrder::UniqueId, false) => by_id,
            (_, true) => key.reverse().then(by_id),
            (_, false) => key.then(by_id),
        }
    }

    /// SQL ordering clause over the `variant` table aliased as `v`.
    pub(crate) fn order_clause(&self) -> &'static str {
        match (self.order, self.descending) {
            (VariantOrder::UniqueId, false) => "ORDER BY v.unique_id",
            (VariantOrder::UniqueId, true) => "ORDER BY v.unique_id DESC",
            (VariantOrder::Created, false) => "ORDER BY v.created, v.unique_id",
            (VariantOrder::Created, true) => "ORDER BY v.created DESC, v.unique_id",
            (VariantOrder::Updated, false) => "ORDER BY v.updated, v.unique_id",
            (VariantOrder::Updated, true) => "ORDER BY v.updated DESC, v.unique_id",
        }
    }
}
