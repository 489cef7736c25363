//! Production graphs that stress the requirement-depth traversal.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use spellbook_core::{Catalog, CatalogBuilder, Combo};

/// First feature id of [`random_acyclic`] catalogs.
pub const RANDOM_FEATURE_BASE: i64 = 10_000;
/// First combo id of [`random_acyclic`] catalogs.
pub const RANDOM_COMBO_BASE: i64 = 100_000;

/// Combos 1..=`length` where combo `i` includes card `i` and needs the
/// feature produced by combo `i - 1`; combo 1 includes cards 1 and 0.
///
/// The seed at the top of the chain is combo `length`.
pub fn production_chain(length: i64) -> Catalog {
    let mut builder = CatalogBuilder::new().card(0, "Card 0");
    for i in 1..=length {
        builder = builder.card(i, &format!("Card {i}"));
        builder = builder.feature(1000 + i, &format!("Feature {i}"), []);
    }
    builder = builder.combo(Combo::new(1).includes([0, 1]).produces([1001]));
    for i in 2..=length {
        builder = builder.combo(
            Combo::new(i)
                .includes([i])
                .needs([1000 + i - 1])
                .produces([1000 + i]),
        );
    }
    builder.build().expect("production_chain fixture")
}

/// Combo 1 needs a feature produced only by combo 2 and vice versa.
pub fn mutual_dependency() -> Catalog {
    CatalogBuilder::new()
        .card(1, "Card 1")
        .card(2, "Card 2")
        .feature(10, "From 1", [])
        .feature(20, "From 2", [])
        .combo(Combo::new(1).includes([1]).needs([20]).produces([10]))
        .combo(Combo::new(2).includes([2]).needs([10]).produces([20]))
        .build()
        .expect("mutual_dependency fixture")
}

/// Reproducible random catalog with an acyclic production graph.
///
/// Cards are `1..=cards`. Every feature is granted by one to three cards.
/// Combo `i` includes one or two cards, needs up to two features and
/// produces one feature with a higher index than anything it needs, so no
/// production path can loop.
pub fn random_acyclic(seed: u64, cards: i64, features: i64, combos: i64) -> Catalog {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut builder = CatalogBuilder::new();
    for id in 1..=cards {
        builder = builder.card(id, &format!("Card {id}"));
    }
    for index in 0..features {
        let granted_by: Vec<i64> = (0..rng.random_range(1..=3))
            .map(|_| rng.random_range(1..=cards))
            .collect();
        builder = builder.feature(
            RANDOM_FEATURE_BASE + index,
            &format!("Feature {index}"),
            granted_by,
        );
    }
    for index in 0..combos {
        let produced = rng.random_range(0..features);
        let includes: Vec<i64> = (0..rng.random_range(1..=2))
            .map(|_| rng.random_range(1..=cards))
            .collect();
        let needs: Vec<i64> = if produced == 0 {
            Vec::new()
        } else {
            (0..rng.random_range(0..=2))
                .map(|_| RANDOM_FEATURE_BASE + rng.random_range(0..produced))
                .collect()
        };
        builder = builder.combo(
            Combo::new(RANDOM_COMBO_BASE + index)
                .includes(includes)
                .needs(needs)
                .produces([RANDOM_FEATURE_BASE + produced]),
        );
    }
    builder.build().expect("random_acyclic fixture")
}
