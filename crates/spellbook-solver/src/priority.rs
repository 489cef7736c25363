//! Requirement depths of the cards reachable from a seed combo.
//!
//! Cards the seed includes sit at depth 0. Cards granting a needed feature
//! directly sit one level deeper, and the requirements of a combo producing
//! a needed feature are evaluated two levels deeper. When a card is reached
//! along several paths, the entry set by the shallower combo wins over
//! anything merged in from the combos below it.
//!
//! This traversal is the only rule-graph check of a seed. The recursion
//! limit is compared against these depths, so every producing combo on a
//! path costs two levels: a chain of `n` combos below the seed needs a
//! limit of at least `2 * n`.
//!
//! The traversal keeps its own frame stack. The frames on the stack are the
//! current production path, so a combo reappearing on it is reported as a
//! cycle instead of being expanded again.

use std::collections::BTreeMap;

use spellbook_core::{CardId, Catalog, ComboId, FeatureId, Result, SpellbookError};

/// Display depth per card for one seed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementDepths {
    depths: BTreeMap<CardId, usize>,
}

impl RequirementDepths {
    pub fn get(&self, card: CardId) -> Option<usize> {
        self.depths.get(&card).copied()
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CardId, usize)> + '_ {
        self.depths.iter().map(|(&card, &depth)| (card, depth))
    }

    /// Sorts `cards` by depth, then id. Cards without a depth go last.
    pub fn sort_cards(&self, cards: &mut [CardId]) {
        cards.sort_by_key(|&card| (self.get(card).unwrap_or(usize::MAX), card));
    }
}

struct Frame {
    combo: ComboId,
    depth: usize,
    needs: Vec<FeatureId>,
    next_need: usize,
    /// Producers of the current need still to expand, in reverse order.
    producers: Vec<ComboId>,
    depths: BTreeMap<CardId, usize>,
}

impl Frame {
    fn enter(catalog: &Catalog, combo: ComboId, depth: usize) -> Result<Self> {
        let rule = catalog
            .combo(combo)
            .ok_or_else(|| SpellbookError::Catalog(format!("unknown combo {combo}")))?;
        Ok(Self {
            combo,
            depth,
            needs: rule.needs.iter().copied().collect(),
            next_need: 0,
            producers: Vec::new(),
            depths: rule.includes.iter().map(|&card| (card, depth)).collect(),
        })
    }
}

/// Computes the requirement depths of `seed`.
///
/// # Errors
///
/// - [`SpellbookError::RuleGraphCycle`] when a producing combo is already on
///   the current production path
/// - [`SpellbookError::RuleGraphTooDeep`] when a producing combo would be
///   evaluated deeper than `limit`
/// - [`SpellbookError::Catalog`] when `seed` is not in the catalog
pub fn requirement_depths(
    catalog: &Catalog,
    seed: ComboId,
    limit: usize,
) -> Result<RequirementDepths> {
    let mut stack = vec![Frame::enter(catalog, seed, 0)?];

    loop {
        let Some(frame) = stack.last_mut() else {
            return Err(SpellbookError::Internal(
                "requirement traversal lost its root frame".to_string(),
            ));
        };

        if let Some(producer) = frame.producers.pop() {
            let depth = frame.depth + 2;
            if stack.iter().any(|f| f.combo == producer) {
                return Err(SpellbookError::RuleGraphCycle { combo: seed });
            }
            if depth > limit {
                return Err(SpellbookError::RuleGraphTooDeep { combo: seed, limit });
            }
            let child = Frame::enter(catalog, producer, depth)?;
            stack.push(child);
            continue;
        }

        if let Some(&feature) = frame.needs.get(frame.next_need) {
            frame.next_need += 1;
            if let Some(need) = catalog.feature(feature) {
                for &card in &need.cards {
                    frame.depths.insert(card, frame.depth + 1);
                }
                frame.producers = need.produced_by.iter().rev().copied().collect();
            }
            continue;
        }

        let Some(done) = stack.pop() else {
            continue;
        };
        match stack.last_mut() {
            Some(parent) => {
                for (card, depth) in done.depths {
                    parent.depths.entry(card).or_insert(depth);
                }
            }
            None => return Ok(RequirementDepths { depths: done.depths }),
        }
    }
}
