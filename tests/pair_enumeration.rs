// tests/pair_enumeration.rs

use std::collections::HashSet;

use proptest::prelude::*;

use pairdag::pairs::{Pair, enumerate, enumerate_from, index_of, pair_at, pair_count};

proptest! {
    #[test]
    fn enumeration_covers_every_unordered_pair_exactly_once(n in 0usize..60) {
        let pairs: Vec<Pair> = enumerate(n).collect();

        prop_assert_eq!(pairs.len(), n * n.saturating_sub(1) / 2);
        prop_assert_eq!(pairs.len(), pair_count(n));

        let mut seen = HashSet::new();
        for p in &pairs {
            prop_assert!(p.a < p.b, "pair ({}, {}) is not ordered", p.a, p.b);
            prop_assert!(p.b < n, "pair ({}, {}) out of range for n={}", p.a, p.b, n);
            prop_assert!(seen.insert((p.a, p.b)), "pair ({}, {}) enumerated twice", p.a, p.b);
        }

        // Every unordered combination is present.
        for i in 0..n {
            for j in (i + 1)..n {
                prop_assert!(seen.contains(&(i, j)));
            }
        }
    }

    #[test]
    fn enumeration_order_is_lexicographic(n in 2usize..60) {
        let pairs: Vec<Pair> = enumerate(n).collect();
        for window in pairs.windows(2) {
            let (prev, next) = (window[0], window[1]);
            prop_assert!(
                (prev.a, prev.b) < (next.a, next.b),
                "({}, {}) does not precede ({}, {})",
                prev.a, prev.b, next.a, next.b
            );
        }
    }

    #[test]
    fn index_of_and_pair_at_are_inverses(n in 2usize..60) {
        for (k, pair) in enumerate(n).enumerate() {
            prop_assert_eq!(index_of(pair, n), k);
            prop_assert_eq!(pair_at(k, n), pair);
        }
    }

    #[test]
    fn enumerate_from_matches_skip(n in 0usize..40, k in 0usize..800) {
        let from: Vec<Pair> = enumerate_from(k, n).collect();
        let skipped: Vec<Pair> = enumerate(n).skip(k).collect();
        prop_assert_eq!(from, skipped);
    }
}

#[test]
fn degenerate_item_counts_yield_zero_pairs() {
    assert_eq!(enumerate(0).count(), 0);
    assert_eq!(enumerate(1).count(), 0);
    assert_eq!(pair_count(0), 0);
    assert_eq!(pair_count(1), 0);
}

#[test]
fn enumeration_is_restartable() {
    let first: Vec<Pair> = enumerate(5).collect();
    let second: Vec<Pair> = enumerate(5).collect();
    assert_eq!(first, second);
}

#[test]
fn pair_new_normalises_order() {
    assert_eq!(Pair::new(3, 1), Pair { a: 1, b: 3 });
    assert_eq!(Pair::new(1, 3), Pair { a: 1, b: 3 });
}
