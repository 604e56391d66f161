use super::*;

fn keys(equal: &[i32], comparison: Option<i64>) -> IndexKeys {
    IndexKeys {
        equal: EqualKeys::new(equal.iter().map(|v| EqualKey::new(*v))),
        comparison: comparison.map(OrderedKey::new),
    }
}

#[test]
fn test_element_list_keeps_insertion_order() {
    let mut list = ElementList::new();
    let a = list.push("a");
    let b = list.push("b");
    let _c = list.push("c");

    assert_eq!(list.remove(b), Ok("b"));
    let d = list.push("d");
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec!["a", "c", "d"]);

    assert_eq!(list.remove(a), Ok("a"));
    assert_eq!(list.get(d), Some(&"d"));
    assert_eq!(list.len(), 2);
}

#[test]
fn test_element_list_rejects_stale_handle() {
    let mut list = ElementList::new();
    let a = list.push(1);
    assert_eq!(list.remove(a), Ok(1));
    assert_eq!(list.remove(a), Err(IndexError::StaleHandle));

    // The recycled slot must not answer to the old handle.
    let b = list.push(2);
    assert_eq!(list.remove(a), Err(IndexError::StaleHandle));
    assert_eq!(list.remove(b), Ok(2));
    assert!(list.is_empty());
}

#[test]
fn test_equal_keys_compare_across_allocations() {
    assert_eq!(EqualKey::new(3_u32), EqualKey::new(3_u32));
    assert_ne!(EqualKey::new(3_u32), EqualKey::new(4_u32));
    // Same bits, different type.
    assert_ne!(EqualKey::new(3_u32), EqualKey::new(3_i32));
    assert_eq!(EqualKey::new("room").downcast_ref::<&str>(), Some(&"room"));
}

#[test]
fn test_equal_indexer_buckets_by_key() {
    let mut index = Indexer::equal();
    let h1 = index.put(&keys(&[1], None), 'a').unwrap();
    index.put(&keys(&[2], None), 'b').unwrap();
    index.put(&keys(&[1], None), 'c').unwrap();

    assert_eq!(index.matches(&keys(&[1], None)).unwrap(), vec!['a', 'c']);
    assert_eq!(index.matches(&keys(&[3], None)).unwrap(), Vec::<char>::new());

    assert_eq!(index.remove(&keys(&[1], None), h1), Ok('a'));
    assert_eq!(index.matches(&keys(&[1], None)).unwrap(), vec!['c']);
    assert_eq!(index.size(), 2);
}

#[test]
fn test_size_of_counts_one_bucket() {
    let mut index = Indexer::equal();
    let a = index.put(&keys(&[1, 7], None), 'a').unwrap();
    index.put(&keys(&[1, 7], None), 'b').unwrap();
    index.put(&keys(&[2, 7], None), 'c').unwrap();
    assert_eq!(index.size_of(&keys(&[1, 7], None)), Ok(2));
    assert_eq!(index.size_of(&keys(&[3, 7], None)), Ok(0));

    index.remove(&keys(&[1, 7], None), a).unwrap();
    assert_eq!(index.size_of(&keys(&[1, 7], None)), Ok(1));
    assert_eq!(index.size(), 2);

    let mut ordered = Indexer::comparison(Comparison::LessThan);
    ordered.put(&keys(&[1], Some(4)), 'x').unwrap();
    ordered.put(&keys(&[1], Some(4)), 'y').unwrap();
    ordered.put(&keys(&[1], Some(9)), 'z').unwrap();
    assert_eq!(ordered.size_of(&keys(&[1], Some(4))), Ok(2));
    assert_eq!(ordered.size_of(&keys(&[1], None)), Err(IndexError::MissingComparisonKey));

    let mut flat = Indexer::unindexed();
    flat.put(&IndexKeys::default(), 'q').unwrap();
    assert_eq!(flat.size_of(&keys(&[5], None)), Ok(1));
}

#[test]
fn test_handle_from_dropped_bucket_is_stale() {
    let mut index = Indexer::equal();
    let old = index.put(&keys(&[1], None), 'a').unwrap();
    index.remove(&keys(&[1], None), old).unwrap();

    // The bucket is recreated; the old handle must not remove the new entry.
    index.put(&keys(&[1], None), 'b').unwrap();
    assert_eq!(index.remove(&keys(&[1], None), old), Err(IndexError::StaleHandle));
    assert_eq!(index.size(), 1);
}

#[test]
fn test_comparison_ranges() {
    let stored = [2_i64, 5, 5, 8];
    let cases = [
        (Comparison::LessThan, vec![2]),
        (Comparison::LessThanOrEqual, vec![2, 5, 5]),
        (Comparison::GreaterThan, vec![8]),
        (Comparison::GreaterThanOrEqual, vec![5, 5, 8]),
    ];

    for (relation, expected) in cases {
        let mut index = Indexer::comparison(relation);
        for value in stored {
            index.put(&keys(&[], Some(value)), value).unwrap();
        }
        assert_eq!(index.matches(&keys(&[], Some(5))).unwrap(), expected, "{relation:?}");
    }
}

#[test]
fn test_comparison_within_equal_bucket() {
    let mut index = Indexer::for_keys(1, Some(Comparison::LessThan));
    index.put(&keys(&[1], Some(10)), "a").unwrap();
    index.put(&keys(&[2], Some(1)), "b").unwrap();
    index.put(&keys(&[1], Some(1)), "c").unwrap();

    assert_eq!(index.matches(&keys(&[1], Some(5))).unwrap(), vec!["c"]);
    assert_eq!(
        index.matches(&keys(&[1], None)),
        Err(IndexError::MissingComparisonKey)
    );
}

#[test]
fn test_flip_mirrors_relation() {
    for relation in [
        Comparison::LessThan,
        Comparison::LessThanOrEqual,
        Comparison::GreaterThan,
        Comparison::GreaterThanOrEqual,
    ] {
        for (a, b) in [(1, 2), (2, 2), (3, 2)] {
            assert_eq!(relation.test(&a, &b), relation.flip().test(&b, &a));
        }
        assert_eq!(relation.flip().flip(), relation);
    }
}
