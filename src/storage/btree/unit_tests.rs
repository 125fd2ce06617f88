#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::ops::Bound;

    use rand::{rng, seq::SliceRandom};

    use crate::storage::btree::BPlusTree;

    fn keys_of<V>(pairs: &[(i64, V)]) -> Vec<i64> {
        pairs.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn empty_tree_finds_nothing() {
        let tree: BPlusTree<i64, &str> = BPlusTree::new(4);

        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.search(&1), None);
        assert!(tree.range_search(&i64::MIN, &i64::MAX).is_empty());
    }

    #[test]
    fn insert_and_search_single_key() {
        let mut tree = BPlusTree::new(4);
        tree.insert(10, "ten");

        assert_eq!(tree.search(&10), Some(&"ten"));
        assert_eq!(tree.search(&11), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn fifth_insert_splits_root_at_order_four() {
        let mut tree = BPlusTree::new(4);

        for i in 1..=4 {
            tree.insert(i, i * 10);
        }
        assert_eq!(tree.depth(), 1);

        tree.insert(5, 50);
        assert_eq!(tree.depth(), 2);

        for i in 1..=5 {
            assert_eq!(tree.search(&i), Some(&(i * 10)));
        }
    }

    #[test]
    fn key_equal_to_separator_routes_right() {
        let mut tree = BPlusTree::new(4);
        for i in 1..=5 {
            tree.insert(i, i);
        }

        // separator is 3 and lives in the right leaf only
        assert_eq!(tree.search(&3), Some(&3));
        assert_eq!(tree.search(&2), Some(&2));
    }

    #[test]
    fn nodes_stay_within_order_for_every_order() {
        for order in 2..=7 {
            let mut tree = BPlusTree::new(order);
            for i in 0..300 {
                tree.insert(i, i);
                tree.assert_invariants();
            }

            for i in 0..300 {
                assert_eq!(tree.search(&i), Some(&i), "order {order}, key {i}");
            }
        }
    }

    #[test]
    fn depth_grows_through_internal_splits() {
        let mut tree = BPlusTree::new(2);
        for i in 0..64 {
            tree.insert(i, ());
        }

        assert!(tree.depth() >= 4, "depth was {}", tree.depth());
        tree.assert_invariants();
    }

    #[test]
    fn range_query_across_leaves() {
        let mut tree = BPlusTree::new(3);
        for i in 0..20 {
            tree.insert(i, i * 2);
        }

        let pairs = tree.range_search(&5, &12);
        assert_eq!(keys_of(&pairs), (5..=12).collect::<Vec<_>>());
        assert!(pairs.iter().all(|(k, v)| *v == k * 2));
    }

    #[test]
    fn range_bounds_behave_like_infimum_and_supremum() {
        let mut tree = BPlusTree::new(4);
        for i in 1..=5 {
            tree.insert(i, ());
        }

        let above = tree.range(Bound::Excluded(&2), Bound::Unbounded);
        assert_eq!(keys_of(&above), vec![3, 4, 5]);

        let below = tree.range(Bound::Unbounded, Bound::Excluded(&3));
        assert_eq!(keys_of(&below), vec![1, 2]);

        let inclusive = tree.range(Bound::Included(&2), Bound::Unbounded);
        assert_eq!(keys_of(&inclusive), vec![2, 3, 4, 5]);

        assert!(tree.range_search(&6, &100).is_empty());
        assert!(tree.range_search(&4, &2).is_empty());
    }

    #[test]
    fn range_keeps_duplicate_multiplicity() {
        let mut tree = BPlusTree::new(3);
        for (k, v) in [(2, "a"), (1, "b"), (2, "c"), (3, "d"), (2, "e"), (2, "f")] {
            tree.insert(k, v);
        }

        let pairs = tree.range_search(&2, &2);
        assert_eq!(pairs.len(), 4);
        assert_eq!(keys_of(&tree.range_search(&1, &3)), vec![1, 2, 2, 2, 2, 3]);
        tree.assert_invariants();
    }

    #[test]
    fn newest_duplicate_in_leaf_wins_search() {
        let mut tree = BPlusTree::new(4);
        tree.insert(5, "first");
        tree.insert(5, "second");

        assert_eq!(tree.search(&5), Some(&"second"));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn duplicates_spanning_a_split_stay_reachable() {
        let mut tree = BPlusTree::new(4);
        for i in 0..6 {
            tree.insert(7, i);
        }

        // right-biased descent lands on the leaf holding the newest copy
        assert_eq!(tree.search(&7), Some(&5));
        assert_eq!(tree.range_search(&7, &7).len(), 6);
        tree.assert_invariants();
    }

    #[test]
    fn string_keys_order_lexically() {
        let mut tree = BPlusTree::new(3);
        for name in ["delta", "alpha", "echo", "charlie", "bravo"] {
            tree.insert(name.to_string(), name.len());
        }

        let pairs = tree.range_search(&"b".to_string(), &"d".to_string());
        let names: Vec<_> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["bravo", "charlie"]);
        assert_eq!(tree.search(&"echo".to_string()), Some(&4));
    }

    #[test]
    fn random_insert_matches_ordered_map() {
        let mut keys: Vec<i64> = (0..500).collect();
        keys.shuffle(&mut rng());

        let mut tree = BPlusTree::new(4);
        let mut expected = BTreeMap::new();

        for k in &keys {
            tree.insert(*k, k * 3);
            expected.insert(*k, k * 3);
        }

        tree.assert_invariants();
        for (k, v) in &expected {
            assert_eq!(tree.search(k), Some(v));
        }

        let scanned = tree.range_search(&100, &199);
        let wanted: Vec<_> = expected.range(100..=199).map(|(k, v)| (*k, *v)).collect();
        assert_eq!(scanned, wanted);
    }

    #[test]
    fn relink_is_idempotent() {
        let mut tree = BPlusTree::new(3);
        for i in 0..30 {
            tree.insert(i, ());
        }

        let before = tree.range_search(&0, &29);
        tree.relink_leaves();
        tree.assert_invariants();
        assert_eq!(tree.range_search(&0, &29), before);
    }

    #[test]
    #[should_panic(expected = "order must be")]
    fn order_below_minimum_panics() {
        let _ = BPlusTree::<i64, ()>::new(1);
    }
}
