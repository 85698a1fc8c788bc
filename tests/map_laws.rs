//! Property tests for the laws shared by both maps: lookups see what was inserted,
//! traversal is sorted (tree) or complete (hash), and removal leaves no trace.

use std::collections::BTreeMap;

use avl_map::{AvlTreeMap, ChainedHashMap, Map, MapError};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(i16, i32),
    Remove(i16),
    Bump(i16),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<i16>(), any::<i32>()).prop_map(|(key, value)| Op::Insert(key, value)),
        any::<i16>().prop_map(Op::Remove),
        any::<i16>().prop_map(Op::Bump),
    ]
}

/// Replays `ops` on `map` and on a reference `BTreeMap`, comparing every result.
fn replay<M>(map: &mut M, ops: &[Op]) -> Result<BTreeMap<i16, i32>, TestCaseError>
where
    M: Map<i16, i32>,
{
    let mut model = BTreeMap::new();
    for op in ops {
        match *op {
            Op::Insert(key, value) => {
                let fresh = !model.contains_key(&key);
                if fresh {
                    model.insert(key, value);
                }
                prop_assert_eq!(map.insert(key, value), fresh);
            }
            Op::Remove(key) => {
                let expected = if model.is_empty() {
                    Err(MapError::CollectionEmpty)
                } else {
                    model.remove(&key).ok_or(MapError::KeyNotFound)
                };
                prop_assert_eq!(map.remove(&key), expected);
            }
            Op::Bump(key) => {
                let entry = model.entry(key).or_default();
                *entry = entry.wrapping_add(1);
                let value = map.entry_or_default(key);
                *value = value.wrapping_add(1);
            }
        }
        prop_assert_eq!(map.len(), model.len());
    }
    Ok(model)
}

fn avl_height_bound(len: usize) -> f64 {
    1.45 * ((len + 2) as f64).log2()
}

proptest! {
    /// Every inserted key is found with its first value; absent keys are reported as such.
    #[test]
    fn prop_tree_matches_model(ops in prop::collection::vec(op(), 0..300)) {
        let mut map = AvlTreeMap::new();
        let model = replay(&mut map, &ops)?;

        for (key, value) in &model {
            prop_assert_eq!(map.value_of(key), Ok(value));
        }
        let entries: Vec<_> = map.iter().map(|(key, value)| (*key, *value)).collect();
        let expected: Vec<_> = model.into_iter().collect();
        prop_assert_eq!(entries, expected);
        prop_assert!((map.height() as f64) < avl_height_bound(map.len()));
    }

    /// The hash map agrees with the model regardless of its bucket count.
    #[test]
    fn prop_hash_matches_model(
        ops in prop::collection::vec(op(), 0..300),
        buckets in 0usize..64
    ) {
        let mut map = ChainedHashMap::with_buckets(buckets);
        let model = replay(&mut map, &ops)?;

        for (key, value) in &model {
            prop_assert_eq!(map.value_of(key), Ok(value));
        }
        let mut entries: Vec<_> = map.iter().map(|(key, value)| (*key, *value)).collect();
        entries.sort_unstable();
        let expected: Vec<_> = model.into_iter().collect();
        prop_assert_eq!(entries, expected);
    }

    /// Retreating from the end visits exactly the keys advancing from the start visits,
    /// in reverse.
    #[test]
    fn prop_tree_cursor_is_reversible(keys in prop::collection::btree_set(any::<i16>(), 0..200)) {
        let map: AvlTreeMap<_, _> = keys.iter().map(|key| (*key, ())).collect();

        let mut cursor = map.end();
        let mut backward = Vec::new();
        while cursor.retreat().is_ok() {
            backward.push(*cursor.key().unwrap());
        }
        backward.reverse();
        let forward: Vec<_> = keys.into_iter().collect();
        prop_assert_eq!(backward, forward);
    }

    /// Equality depends on content only, not on insertion order.
    #[test]
    fn prop_equality_ignores_insertion_order(
        entries in prop::collection::btree_map(any::<i16>(), any::<i32>(), 0..200)
    ) {
        let forward: AvlTreeMap<_, _> = entries.iter().map(|(k, v)| (*k, *v)).collect();
        let backward: AvlTreeMap<_, _> = entries.iter().rev().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(&forward, &backward);

        let hashed: ChainedHashMap<_, _> = entries.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert!(forward.same_content(&hashed));
        prop_assert!(hashed.same_content(&backward));
    }

    /// A removed key is gone and every other key survives.
    #[test]
    fn prop_remove_only_removes_target(
        keys in prop::collection::btree_set(any::<i16>(), 1..200),
        pick in any::<prop::sample::Index>()
    ) {
        let keys: Vec<_> = keys.into_iter().collect();
        let target = keys[pick.index(keys.len())];
        let mut map: AvlTreeMap<_, _> = keys.iter().map(|key| (*key, *key)).collect();

        prop_assert_eq!(map.remove(&target), Ok(target));
        prop_assert!(!map.contains_key(&target));
        prop_assert_eq!(map.find(&target), map.end());
        for key in keys.iter().filter(|key| **key != target) {
            prop_assert_eq!(map.get(key), Some(key));
        }
        prop_assert!((map.height() as f64) < avl_height_bound(map.len()));
    }
}

#[test]
fn cursor_trait_on_empty_maps() {
    let tree = AvlTreeMap::<i16, i32>::new();
    let hash = ChainedHashMap::<i16, i32>::new();
    assert_eq!(Map::find(&tree, &0).get(), Err(MapError::CollectionEmpty));
    assert_eq!(Map::find(&hash, &0).get(), Err(MapError::CollectionEmpty));
    assert!(Map::begin(&tree).is_end());
    assert!(Map::begin(&hash).is_end());
}
