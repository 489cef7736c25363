//! Generation passes against the SQLite store.

use spellbook::prelude::*;
use spellbook_test::scenarios::{self, card_ids, combo_ids, CARD_A, CARD_B, CARD_C, COMBO_X, COMBO_Y};

fn config() -> GenerationConfig {
    GenerationConfig::default().with_thread_count(ThreadCount::None)
}

fn store_with(catalog: &spellbook::Catalog) -> SqliteStore {
    let mut store = SqliteStore::in_memory().expect("store");
    store.insert_catalog(catalog).expect("catalog");
    store
}

#[test]
fn test_sqlite_generation_and_idempotence() {
    let mut store = store_with(&scenarios::chained_combo());
    let first = generate_variants(&mut store, &config()).expect("first");
    assert_eq!(first.counts(), (2, 0, 0));
    assert_eq!(store.variant_count().expect("count"), 2);

    let id = spellbook::unique_id_from_card_ids(&card_ids(&[CARD_A, CARD_B, CARD_C]));
    let variant = store.variant(&id).expect("read").expect("variant");
    assert_eq!(variant.includes, card_ids(&[CARD_C, CARD_A, CARD_B]));
    assert_eq!(variant.of, combo_ids(&[COMBO_X, COMBO_Y]));
    assert_eq!(variant.status, VariantStatus::New);

    let second = generate_variants(&mut store, &config()).expect("second");
    assert_eq!(second.counts(), (0, 0, 0));
}

#[test]
fn test_sqlite_not_working_stays() {
    let mut store = store_with(&scenarios::two_card_combo());
    generate_variants(&mut store, &config()).expect("first");
    let id = spellbook::unique_id_from_card_ids(&card_ids(&[CARD_A, CARD_B]));
    store
        .set_status(&id, VariantStatus::NotWorking)
        .expect("status");

    let summary = generate_variants(&mut store, &config()).expect("second");
    assert_eq!(summary.counts(), (0, 0, 0));
    let variant = store.variant(&id).expect("read").expect("variant");
    assert_eq!(variant.status, VariantStatus::NotWorking);
}

#[test]
fn test_sqlite_restore() {
    let mut store = store_with(&scenarios::two_card_combo());
    generate_variants(&mut store, &config()).expect("first");
    let id = spellbook::unique_id_from_card_ids(&card_ids(&[CARD_A, CARD_B]));
    store.set_status(&id, VariantStatus::Restore).expect("status");

    let summary = generate_variants(&mut store, &config()).expect("second");
    assert_eq!(summary.counts(), (0, 1, 0));
    let variant = store.variant(&id).expect("read").expect("variant");
    assert_eq!(variant.status, VariantStatus::New);
}
