//! Small catalogs with hand-checked variant sets.
//!
//! Id conventions: cards are single digits, features are tens, combos are
//! hundreds.

use std::collections::BTreeSet;

use spellbook_core::{CardId, Catalog, CatalogBuilder, Combo, ComboId, FeatureId};

pub const CARD_A: i64 = 1;
pub const CARD_B: i64 = 2;
pub const CARD_C: i64 = 3;
pub const CARD_D: i64 = 4;
pub const CARD_E: i64 = 5;

pub const FEATURE_F: i64 = 10;
pub const FEATURE_G: i64 = 20;
pub const FEATURE_H: i64 = 30;

pub const COMBO_X: i64 = 100;
pub const COMBO_Y: i64 = 200;
pub const COMBO_Z: i64 = 300;
pub const COMBO_W: i64 = 400;

pub fn card_ids(ids: &[i64]) -> Vec<CardId> {
    ids.iter().copied().map(CardId).collect()
}

pub fn feature_ids(ids: &[i64]) -> BTreeSet<FeatureId> {
    ids.iter().copied().map(FeatureId).collect()
}

pub fn combo_ids(ids: &[i64]) -> BTreeSet<ComboId> {
    ids.iter().copied().map(ComboId).collect()
}

fn base_cards() -> CatalogBuilder {
    CatalogBuilder::new()
        .card(CARD_A, "Card A")
        .card(CARD_B, "Card B")
}

/// X requires cards {A, B}; F is produced only by X.
pub fn two_card_combo() -> Catalog {
    base_cards()
        .feature(FEATURE_F, "F", [])
        .combo(
            Combo::new(COMBO_X)
                .includes([CARD_A, CARD_B])
                .produces([FEATURE_F])
                .with_text("A and B on the battlefield", "Tap A, then B."),
        )
        .build()
        .expect("two_card_combo fixture")
}

/// Adds Y, requiring card C and feature F (produced only by X).
pub fn chained_combo() -> Catalog {
    base_cards()
        .card(CARD_C, "Card C")
        .feature(FEATURE_F, "F", [])
        .feature(FEATURE_G, "G", [])
        .combo(
            Combo::new(COMBO_X)
                .includes([CARD_A, CARD_B])
                .produces([FEATURE_F])
                .with_text("A and B on the battlefield", "Tap A, then B."),
        )
        .combo(
            Combo::new(COMBO_Y)
                .includes([CARD_C])
                .needs([FEATURE_F])
                .produces([FEATURE_G])
                .with_text("C in hand", "Cast C using F."),
        )
        .build()
        .expect("chained_combo fixture")
}

/// Z is a 1:1 combo (D grants G through Z, not a generator); W requires E
/// and G.
pub fn single_requirement_combo() -> Catalog {
    CatalogBuilder::new()
        .card(CARD_D, "Card D")
        .card(CARD_E, "Card E")
        .feature(FEATURE_G, "G", [])
        .feature(FEATURE_H, "H", [])
        .combo(
            Combo::new(COMBO_Z)
                .includes([CARD_D])
                .produces([FEATURE_G])
                .with_text("D", "D makes G."),
        )
        .combo(
            Combo::new(COMBO_W)
                .includes([CARD_E])
                .needs([FEATURE_G])
                .produces([FEATURE_H])
                .with_text("E", "E with G makes H."),
        )
        .build()
        .expect("single_requirement_combo fixture")
}

/// Y needs F, granted directly by either A or B; two one-card routes.
pub fn alternative_routes() -> Catalog {
    base_cards()
        .card(CARD_C, "Card C")
        .feature(FEATURE_F, "F", [CARD_A, CARD_B])
        .feature(FEATURE_G, "G", [])
        .combo(
            Combo::new(COMBO_Y)
                .includes([CARD_C])
                .needs([FEATURE_F])
                .produces([FEATURE_G]),
        )
        .build()
        .expect("alternative_routes fixture")
}

/// X produces F and G but its partner combo Y removes G again.
pub fn removing_combo() -> Catalog {
    base_cards()
        .card(CARD_C, "Card C")
        .feature(FEATURE_F, "F", [])
        .feature(FEATURE_G, "G", [])
        .combo(
            Combo::new(COMBO_X)
                .includes([CARD_A, CARD_B])
                .produces([FEATURE_F, FEATURE_G]),
        )
        .combo(
            Combo::new(COMBO_Y)
                .includes([CARD_C])
                .needs([FEATURE_F])
                .removes([FEATURE_G]),
        )
        .build()
        .expect("removing_combo fixture")
}

/// A catalog without cards.
pub fn empty() -> Catalog {
    Catalog::empty()
}
