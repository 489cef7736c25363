//! Tests for catalog construction and graph queries.

use std::collections::BTreeSet;

use super::*;

#[test]
fn test_generator_flag_follows_requirements() {
    let single = Combo::new(1).includes([1]);
    assert!(!single.generator);
    assert_eq!(single.requirement_count(), 1);

    let double = Combo::new(2).includes([1]).needs([5]);
    assert!(double.generator);
    assert!(double.derives_generator());

    let forced = Combo::new(3).includes([1, 2]).with_generator(false);
    assert!(!forced.generator);
    assert!(forced.derives_generator());
}

#[test]
fn test_build_derives_producers() {
    let catalog = CatalogBuilder::new()
        .card(1, "A")
        .card(2, "B")
        .feature(10, "F", [])
        .combo(Combo::new(7).includes([1, 2]).produces([10]))
        .combo(Combo::new(3).includes([1]).produces([10]))
        .build()
        .unwrap();

    let producers: Vec<ComboId> = catalog.producers_of(FeatureId(10)).collect();
    assert_eq!(producers, vec![ComboId(3), ComboId(7)]);
    assert_eq!(catalog.producers_of(FeatureId(99)).count(), 0);

    let generators: Vec<ComboId> = catalog.generators().map(|c| c.id).collect();
    assert_eq!(generators, vec![ComboId(7)]);
}

#[test]
fn test_build_rejects_dangling_references() {
    let err = CatalogBuilder::new()
        .card(1, "A")
        .combo(Combo::new(1).includes([1, 2]))
        .build()
        .unwrap_err();
    assert!(matches!(err, SpellbookError::Catalog(_)));

    let err = CatalogBuilder::new()
        .card(1, "A")
        .combo(Combo::new(1).includes([1]).needs([4]))
        .build()
        .unwrap_err();
    assert!(matches!(err, SpellbookError::Catalog(_)));

    let err = CatalogBuilder::new()
        .feature(4, "F", [8])
        .build()
        .unwrap_err();
    assert!(matches!(err, SpellbookError::Catalog(_)));
}

#[test]
fn test_build_rejects_duplicates() {
    let err = CatalogBuilder::new()
        .card(1, "A")
        .card(1, "A again")
        .build()
        .unwrap_err();
    assert!(matches!(err, SpellbookError::Catalog(_)));
}

#[test]
fn test_produced_features_applies_removals() {
    let catalog = CatalogBuilder::new()
        .card(1, "A")
        .feature(10, "X", [1])
        .feature(11, "Y", [])
        .combo(Combo::new(1).includes([1]).produces([11]).removes([10]))
        .build()
        .unwrap();
    let of: BTreeSet<ComboId> = [ComboId(1)].into();
    let active: BTreeSet<FeatureId> = [FeatureId(10), FeatureId(11)].into();
    let produced = catalog.produced_features(&of, &active);
    assert_eq!(produced, [FeatureId(11)].into());
}

#[test]
fn test_describe_joins_in_id_order() {
    let catalog = CatalogBuilder::new()
        .card(1, "A")
        .combo(Combo::new(2).includes([1]).with_text("p2", "d2"))
        .combo(Combo::new(1).includes([1]).with_text("p1", "d1"))
        .build()
        .unwrap();
    let of: BTreeSet<ComboId> = [ComboId(2), ComboId(1)].into();
    let (prerequisites, description) = catalog.describe(&of);
    assert_eq!(prerequisites, "p1\np2");
    assert_eq!(description, "d1\nd2");
}
