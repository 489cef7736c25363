//! Tests for variant identity and status codes.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::*;

fn cards(ids: &[i64]) -> Vec<CardId> {
    ids.iter().copied().map(CardId).collect()
}

#[test]
fn test_unique_id_matches_persisted_digest() {
    assert_eq!(
        unique_id_from_card_ids(&cards(&[1, 2])).as_str(),
        "3a316d6d3226f84c1e46e4447fa8d5fd800bff4a1bc6498152523cd4a602b69b"
    );
    assert_eq!(
        unique_id_from_card_ids(&cards(&[3, 1, 2])).as_str(),
        "a36b1f2c3f84522dd1005145646617d7054c0851e97c72a039c0bdfac9fa07f3"
    );
}

#[test]
fn test_unique_id_of_empty_set() {
    assert_eq!(
        unique_id_from_card_ids(&[]).as_str(),
        "4f53cda18c2baa0c0354bb5f9a3ecbe5ed12ab4d8e11ba873c2f11161202b945"
    );
}

#[test]
fn test_unique_id_is_order_independent() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let base = cards(&[17, 4, 250, 9, 33, 1, 88]);
    let expected = unique_id_from_card_ids(&base);
    for _ in 0..50 {
        let mut shuffled = base.clone();
        shuffled.shuffle(&mut rng);
        assert_eq!(unique_id_from_card_ids(&shuffled), expected);
    }
}

#[test]
fn test_unique_id_sorts_numerically() {
    // "10" < "9" lexically; the digest must not depend on that
    let a = unique_id_from_card_ids(&cards(&[10, 9]));
    let b = unique_id_from_card_ids(&cards(&[9, 10]));
    assert_eq!(a, b);
    assert_ne!(a, unique_id_from_card_ids(&cards(&[9, 11])));
}

#[test]
fn test_definition_unique_id() {
    let def = VariantDefinition {
        card_ids: cards(&[2, 1]),
        combo_ids: Default::default(),
        feature_ids: Default::default(),
    };
    assert_eq!(def.unique_id(), unique_id_from_card_ids(&cards(&[1, 2])));
}

#[test]
fn test_status_round_trip() {
    for status in VariantStatus::ALL {
        assert_eq!(status.as_str().parse::<VariantStatus>(), Ok(status));
    }
    assert_eq!(VariantStatus::default(), VariantStatus::New);
    assert!("BROKEN".parse::<VariantStatus>().is_err());
}
