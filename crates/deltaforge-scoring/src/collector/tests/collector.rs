// Tests for the collector module.

use std::collections::{BTreeMap, BTreeSet};

use super::super::*;
use crate::reversible::{Reversible, UndoError};

// ============================================================================
// count / count_distinct
// ============================================================================

#[test]
fn test_count_reverts_to_zero() {
    let collector = count::<&str>();
    let mut acc = collector.create_accumulator();

    let a = acc.apply(collector.extract(&"a"));
    let b = acc.apply(collector.extract(&"b"));
    assert_eq!(acc.finish(), 2);

    acc.revert(a).unwrap();
    acc.revert(b).unwrap();
    assert_eq!(acc.finish(), 0);
    assert!(acc.revert(()).is_err());
}

#[test]
fn test_count_distinct_tracks_duplicates() {
    let collector = count_distinct(|x: &i32| *x % 3);
    let mut acc = collector.create_accumulator();

    let one = acc.apply(collector.extract(&1));
    let four = acc.apply(collector.extract(&4));
    acc.apply(collector.extract(&2));
    assert_eq!(acc.finish(), 2);

    // 1 and 4 share a key; the key stays until both are gone.
    acc.revert(one).unwrap();
    assert_eq!(acc.finish(), 2);
    acc.revert(four).unwrap();
    assert_eq!(acc.finish(), 1);
}

// ============================================================================
// sum
// ============================================================================

#[test]
fn test_sum_apply_revert() {
    let collector = sum(|x: &i64| *x * 10);
    let mut acc = collector.create_accumulator();

    let tokens: Vec<_> = [1, 2, 3].iter().map(|x| acc.apply(collector.extract(x))).collect();
    assert_eq!(acc.finish(), 60);

    acc.revert(tokens[1]).unwrap();
    assert_eq!(acc.finish(), 40);
}

#[test]
fn test_sum_rejects_revert_without_terms() {
    let collector = sum(|x: &i64| *x);
    let mut acc = collector.create_accumulator();
    assert_eq!(
        acc.revert(5),
        Err(UndoError("sum has no terms left".to_string()))
    );
}

// ============================================================================
// min / max
// ============================================================================

#[test]
fn test_min_max_follow_retracted_extremes() {
    let low = min(|x: &i32| *x);
    let high = max(|x: &i32| *x);
    let mut min_acc = low.create_accumulator();
    let mut max_acc = high.create_accumulator();

    assert_eq!(min_acc.finish(), None);

    let mut min_tokens = Vec::new();
    let mut max_tokens = Vec::new();
    for x in [5, 1, 9, 1] {
        min_tokens.push(min_acc.apply(low.extract(&x)));
        max_tokens.push(max_acc.apply(high.extract(&x)));
    }
    assert_eq!(min_acc.finish(), Some(1));
    assert_eq!(max_acc.finish(), Some(9));

    // One of the two 1s leaves: the minimum is still 1.
    min_acc.revert(min_tokens[1]).unwrap();
    assert_eq!(min_acc.finish(), Some(1));
    min_acc.revert(min_tokens[3]).unwrap();
    assert_eq!(min_acc.finish(), Some(5));

    max_acc.revert(max_tokens[2]).unwrap();
    assert_eq!(max_acc.finish(), Some(5));
}

// ============================================================================
// to_set / to_map
// ============================================================================

#[test]
fn test_to_set_is_a_multiset_underneath() {
    let collector = to_set(|s: &&str| s.len());
    let mut acc = collector.create_accumulator();

    let ab = acc.apply(collector.extract(&"ab"));
    acc.apply(collector.extract(&"cd"));
    acc.apply(collector.extract(&"xyz"));
    assert_eq!(acc.finish(), BTreeSet::from([2, 3]));

    acc.revert(ab).unwrap();
    assert_eq!(acc.finish(), BTreeSet::from([2, 3]));
}

#[test]
fn test_to_map_groups_values_by_key() {
    let collector = to_map(|p: &(char, u8)| p.0, |p: &(char, u8)| p.1);
    let mut acc = collector.create_accumulator();

    let a1 = acc.apply(collector.extract(&('a', 1)));
    acc.apply(collector.extract(&('a', 2)));
    let b1 = acc.apply(collector.extract(&('b', 1)));

    let expected = BTreeMap::from([('a', BTreeSet::from([1, 2])), ('b', BTreeSet::from([1]))]);
    assert_eq!(acc.finish(), expected);

    acc.revert(a1).unwrap();
    acc.revert(b1).unwrap();
    assert_eq!(acc.finish(), BTreeMap::from([('a', BTreeSet::from([2]))]));
    assert!(acc.revert(('z', 0)).is_err());
}

// ============================================================================
// compose
// ============================================================================

#[test]
fn test_compose2_average() {
    let average = compose2(count::<i64>(), sum(|x: &i64| *x), |n: &usize, total: &i64| {
        if *n == 0 {
            0
        } else {
            *total / *n as i64
        }
    });
    let mut acc = average.create_accumulator();

    let four = acc.apply(average.extract(&4));
    acc.apply(average.extract(&8));
    assert_eq!(acc.finish(), 6);

    acc.revert(four).unwrap();
    assert_eq!(acc.finish(), 8);
}

#[test]
fn test_compose3_spread() {
    let spread = compose3(
        min(|x: &i32| *x),
        max(|x: &i32| *x),
        count::<i32>(),
        |lo: &Option<i32>, hi: &Option<i32>, n: &usize| match (lo, hi) {
            (Some(lo), Some(hi)) => (hi - lo, *n),
            _ => (0, *n),
        },
    );
    let mut acc = spread.create_accumulator();
    assert_eq!(acc.finish(), (0, 0));

    acc.apply(spread.extract(&3));
    let ten = acc.apply(spread.extract(&10));
    acc.apply(spread.extract(&7));
    assert_eq!(acc.finish(), (7, 3));

    acc.revert(ten).unwrap();
    assert_eq!(acc.finish(), (4, 2));
}
