//! The rule catalog: cards, features and combos.
//!
//! A [`Catalog`] is an immutable snapshot of the relational rule store.
//! It is built once per generation pass through a [`CatalogBuilder`],
//! which checks referential integrity and derives the reverse
//! "produced by" index from each combo's `produces` set.
//!
//! # Example
//!
//! ```
//! use spellbook_core::{CatalogBuilder, Combo, CardId, ComboId, FeatureId};
//!
//! let catalog = CatalogBuilder::new()
//!     .card(1, "Basalt Monolith")
//!     .card(2, "Rings of Brighthearth")
//!     .feature(10, "Infinite colorless mana", [])
//!     .combo(Combo::new(100).includes([1, 2]).produces([10]))
//!     .build()
//!     .unwrap();
//!
//! assert!(catalog.combo(ComboId(100)).unwrap().generator);
//! assert_eq!(
//!     catalog.producers_of(FeatureId(10)).collect::<Vec<_>>(),
//!     vec![ComboId(100)]
//! );
//! assert_eq!(catalog.card_count(), 2);
//! # let _ = CardId(1);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, SpellbookError};
use crate::ids::{CardId, ComboId, FeatureId};

/// An atomic ingredient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub name: String,
}

/// An effect, granted directly by cards or produced by combos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub id: FeatureId,
    pub name: String,
    /// Cards that grant this feature on their own.
    pub cards: BTreeSet<CardId>,
    /// Combos whose `produces` set contains this feature.
    ///
    /// Derived by [`CatalogBuilder::build`]; any value set before building
    /// is replaced.
    pub produced_by: BTreeSet<ComboId>,
}

/// A rule consuming cards and features to produce other features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combo {
    pub id: ComboId,
    /// Required cards.
    pub includes: BTreeSet<CardId>,
    /// Required features.
    pub needs: BTreeSet<FeatureId>,
    /// Features this combo produces.
    pub produces: BTreeSet<FeatureId>,
    /// Features this combo cancels.
    pub removes: BTreeSet<FeatureId>,
    pub prerequisites: String,
    pub description: String,
    /// Whether this combo seeds variant enumeration.
    pub generator: bool,
}

impl Combo {
    /// Creates an empty combo. The generator flag is kept in sync with the
    /// requirement count by the builder methods until set explicitly.
    pub fn new(id: impl Into<ComboId>) -> Self {
        Self {
            id: id.into(),
            includes: BTreeSet::new(),
            needs: BTreeSet::new(),
            produces: BTreeSet::new(),
            removes: BTreeSet::new(),
            prerequisites: String::new(),
            description: String::new(),
            generator: false,
        }
    }

    pub fn includes<I: IntoIterator<Item = i64>>(mut self, cards: I) -> Self {
        self.includes.extend(cards.into_iter().map(CardId));
        self.generator = self.derives_generator();
        self
    }

    pub fn needs<I: IntoIterator<Item = i64>>(mut self, features: I) -> Self {
        self.needs.extend(features.into_iter().map(FeatureId));
        self.generator = self.derives_generator();
        self
    }

    pub fn produces<I: IntoIterator<Item = i64>>(mut self, features: I) -> Self {
        self.produces.extend(features.into_iter().map(FeatureId));
        self
    }

    pub fn removes<I: IntoIterator<Item = i64>>(mut self, features: I) -> Self {
        self.removes.extend(features.into_iter().map(FeatureId));
        self
    }

    /// Sets the free-text prerequisites and description.
    pub fn with_text(mut self, prerequisites: &str, description: &str) -> Self {
        self.prerequisites = prerequisites.to_string();
        self.description = description.to_string();
        self
    }

    /// Overrides the stored generator flag.
    pub fn with_generator(mut self, generator: bool) -> Self {
        self.generator = generator;
        self
    }

    /// Total number of requirements (`|includes| + |needs|`).
    pub fn requirement_count(&self) -> usize {
        self.includes.len() + self.needs.len()
    }

    /// The generator flag a combo should carry: more than one requirement.
    ///
    /// Single-requirement combos would only ever seed trivial 1:1 variants.
    pub fn derives_generator(&self) -> bool {
        self.requirement_count() > 1
    }
}

/// Immutable snapshot of the rule catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cards: BTreeMap<CardId, Card>,
    features: BTreeMap<FeatureId, Feature>,
    combos: BTreeMap<ComboId, Combo>,
}

impl Catalog {
    /// Returns an empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Cards in ascending id order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    /// Features in ascending id order.
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    /// Combos in ascending id order.
    pub fn combos(&self) -> impl Iterator<Item = &Combo> {
        self.combos.values()
    }

    /// Generator combos in ascending id order.
    ///
    /// This is the seed processing order of enumeration.
    pub fn generators(&self) -> impl Iterator<Item = &Combo> {
        self.combos.values().filter(|c| c.generator)
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    pub fn combo(&self, id: ComboId) -> Option<&Combo> {
        self.combos.get(&id)
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn combo_count(&self) -> usize {
        self.combos.len()
    }

    /// Combos producing `feature`, ascending. Empty for unknown features.
    pub fn producers_of(&self, feature: FeatureId) -> impl Iterator<Item = ComboId> + '_ {
        self.features
            .get(&feature)
            .into_iter()
            .flat_map(|f| f.produced_by.iter().copied())
    }

    /// Active features minus every feature removed by a combo in `of`.
    pub fn produced_features(
        &self,
        of: &BTreeSet<ComboId>,
        features: &BTreeSet<FeatureId>,
    ) -> BTreeSet<FeatureId> {
        let removed: BTreeSet<FeatureId> = of
            .iter()
            .filter_map(|id| self.combos.get(id))
            .flat_map(|c| c.removes.iter().copied())
            .collect();
        features.difference(&removed).copied().collect()
    }

    /// Prerequisites and description of the combos in `of`, each joined by
    /// newlines in ascending combo id order.
    pub fn describe(&self, of: &BTreeSet<ComboId>) -> (String, String) {
        let combos: Vec<&Combo> = of.iter().filter_map(|id| self.combos.get(id)).collect();
        let prerequisites = combos
            .iter()
            .map(|c| c.prerequisites.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let description = combos
            .iter()
            .map(|c| c.description.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        (prerequisites, description)
    }
}

/// Builds a [`Catalog`], checking that every reference resolves.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    cards: Vec<Card>,
    features: Vec<Feature>,
    combos: Vec<Combo>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn card(mut self, id: i64, name: &str) -> Self {
        self.add_card(Card {
            id: CardId(id),
            name: name.to_string(),
        });
        self
    }

    /// Adds a feature granted directly by `cards`.
    pub fn feature<I: IntoIterator<Item = i64>>(mut self, id: i64, name: &str, cards: I) -> Self {
        self.add_feature(Feature {
            id: FeatureId(id),
            name: name.to_string(),
            cards: cards.into_iter().map(CardId).collect(),
            produced_by: BTreeSet::new(),
        });
        self
    }

    pub fn combo(mut self, combo: Combo) -> Self {
        self.add_combo(combo);
        self
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn add_feature(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn add_combo(&mut self, combo: Combo) {
        self.combos.push(combo);
    }

    /// Validates references and derives the "produced by" index.
    ///
    /// # Errors
    ///
    /// Returns [`SpellbookError::Catalog`] on duplicate ids or on a
    /// reference to an unknown card or feature.
    pub fn build(self) -> Result<Catalog> {
        let mut cards = BTreeMap::new();
        for card in self.cards {
            let id = card.id;
            if cards.insert(id, card).is_some() {
                return Err(SpellbookError::Catalog(format!("duplicate card {id}")));
            }
        }

        let mut features = BTreeMap::new();
        for mut feature in self.features {
            if let Some(card) = feature.cards.iter().find(|c| !cards.contains_key(c)) {
                return Err(SpellbookError::Catalog(format!(
                    "feature {} granted by unknown card {card}",
                    feature.id
                )));
            }
            feature.produced_by.clear();
            let id = feature.id;
            if features.insert(id, feature).is_some() {
                return Err(SpellbookError::Catalog(format!("duplicate feature {id}")));
            }
        }

        let mut combos = BTreeMap::new();
        for combo in self.combos {
            if let Some(card) = combo.includes.iter().find(|c| !cards.contains_key(c)) {
                return Err(SpellbookError::Catalog(format!(
                    "combo {} includes unknown card {card}",
                    combo.id
                )));
            }
            let referenced = combo
                .needs
                .iter()
                .chain(&combo.produces)
                .chain(&combo.removes);
            for feature in referenced {
                if !features.contains_key(feature) {
                    return Err(SpellbookError::Catalog(format!(
                        "combo {} references unknown feature {feature}",
                        combo.id
                    )));
                }
            }
            let id = combo.id;
            if combos.insert(id, combo).is_some() {
                return Err(SpellbookError::Catalog(format!("duplicate combo {id}")));
            }
        }

        for combo in combos.values() {
            for feature in &combo.produces {
                if let Some(f) = features.get_mut(feature) {
                    f.produced_by.insert(combo.id);
                }
            }
        }

        Ok(Catalog {
            cards,
            features,
            combos,
        })
    }
}
