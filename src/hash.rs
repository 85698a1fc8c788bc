//! A hash map with separate chaining.
//!
//! Entries live in a fixed array of buckets, each bucket a chain of the entries whose
//! key hashes to it. There is no rehashing: the bucket count is chosen at construction.
//! Iteration visits buckets in array order and each chain in insertion order.

use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::{Flatten, FromIterator, FusedIterator};
use std::slice;
use std::vec;

use tracing::debug;

use crate::error::{MapError, Result};
use crate::traits::Map;

mod cursor;

pub use cursor::{HashCursor, HashCursorMut};

use cursor::Position;

/// Bucket count used by [`ChainedHashMap::new`].
pub const DEFAULT_BUCKETS: usize = 1024;

type Bucket<K, V> = Vec<(K, V)>;

/// A map of keys to values which relies on the keys implementing [`Hash`].
///
/// Inserting a key that is already present keeps the stored value, like
/// [`AvlTreeMap`](crate::AvlTreeMap).
///
/// ```
/// use avl_map::ChainedHashMap;
/// let mut map = ChainedHashMap::with_buckets(16);
/// map.insert("a", 1);
/// *map.entry_or_default("b") += 2;
/// assert_eq!(map.value_of(&"b"), Ok(&2));
/// assert_eq!(map.bucket_count(), 16);
/// ```
pub struct ChainedHashMap<K, V, S = RandomState> {
    buckets: Vec<Bucket<K, V>>,
    len: usize,
    hasher: S,
}

/// An iterator over the entries of a [`ChainedHashMap`], in bucket order.
pub struct Iter<'a, K, V> {
    inner: Flatten<slice::Iter<'a, Bucket<K, V>>>,
    len: usize,
}

/// A mutable iterator over the entries of a [`ChainedHashMap`], in bucket order.
pub struct IterMut<'a, K, V> {
    inner: Flatten<slice::IterMut<'a, Bucket<K, V>>>,
    len: usize,
}

/// An owning iterator over the entries of a [`ChainedHashMap`], in bucket order.
pub struct IntoIter<K, V> {
    inner: Flatten<vec::IntoIter<Bucket<K, V>>>,
    len: usize,
}

impl<K, V> ChainedHashMap<K, V, RandomState> {
    /// Creates an empty map with [`DEFAULT_BUCKETS`] buckets.
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Creates an empty map with the given number of buckets (at least one).
    pub fn with_buckets(buckets: usize) -> Self {
        Self::with_buckets_and_hasher(buckets, RandomState::new())
    }
}

impl<K, V, S> ChainedHashMap<K, V, S> {
    /// Creates an empty map with [`DEFAULT_BUCKETS`] buckets and the provided `hasher`.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_buckets_and_hasher(DEFAULT_BUCKETS, hasher)
    }

    /// Creates an empty map with the given number of buckets and the provided `hasher`.
    /// A bucket count of zero is raised to one.
    pub fn with_buckets_and_hasher(buckets: usize, hasher: S) -> Self {
        let buckets = buckets.max(1);
        debug!(buckets, "creating chained hash map");
        Self {
            buckets: (0..buckets).map(|_| Vec::new()).collect(),
            len: 0,
            hasher,
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of buckets, which never changes.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns a reference to the map's hasher.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Removes all entries, keeping the bucket array.
    pub fn clear(&mut self) {
        debug!(len = self.len, "clearing chained hash map");
        self.buckets.iter_mut().for_each(Vec::clear);
        self.len = 0;
    }

    /// Gets an iterator over the entries in bucket order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.buckets.iter().flatten(),
            len: self.len,
        }
    }

    /// Gets a mutable iterator over the entries in bucket order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.buckets.iter_mut().flatten(),
            len: self.len,
        }
    }

    /// Gets an iterator over the keys in bucket order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Gets an iterator over the values in bucket order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Returns a cursor at the first entry in bucket order, or the end cursor.
    pub fn begin(&self) -> HashCursor<'_, K, V, S> {
        HashCursor::new(self, Position::first(&self.buckets))
    }

    /// Returns the end cursor.
    pub fn end(&self) -> HashCursor<'_, K, V, S> {
        HashCursor::new(self, Position::end(&self.buckets))
    }

    /// Mutable counterpart of [`begin`](ChainedHashMap::begin).
    pub fn begin_mut(&mut self) -> HashCursorMut<'_, K, V, S> {
        let position = Position::first(&self.buckets);
        HashCursorMut::new(self, position)
    }

    /// Mutable counterpart of [`end`](ChainedHashMap::end).
    pub fn end_mut(&mut self) -> HashCursorMut<'_, K, V, S> {
        let position = Position::end(&self.buckets);
        HashCursorMut::new(self, position)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ChainedHashMap<K, V, S> {
    fn bucket_index(&self, key: &K) -> usize {
        (self.hasher.hash_one(key) % self.buckets.len() as u64) as usize
    }

    fn locate(&self, key: &K) -> Option<Position> {
        let bucket = self.bucket_index(key);
        self.buckets[bucket]
            .iter()
            .position(|(existing, _)| existing == key)
            .map(|slot| Position { bucket, slot })
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let Position { bucket, slot } = self.locate(key)?;
        let (key, value) = &self.buckets[bucket][slot];
        Some((key, value))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let Position { bucket, slot } = self.locate(key)?;
        Some(&mut self.buckets[bucket][slot].1)
    }

    /// Returns true if the map contains a value for the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.locate(key).is_some()
    }

    /// Inserts a key-value pair at the tail of its bucket's chain.
    ///
    /// If the map already holds the key, nothing changes and `false` is returned.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.contains_key(&key) {
            return false;
        }
        let bucket = self.bucket_index(&key);
        self.buckets[bucket].push((key, value));
        self.len += 1;
        true
    }

    /// Returns the value for `key`, inserting `V::default()` first if the key is absent.
    pub fn entry_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let bucket = self.bucket_index(&key);
        let chain = &mut self.buckets[bucket];
        let slot = match chain.iter().position(|(existing, _)| *existing == key) {
            Some(slot) => slot,
            None => {
                chain.push((key, V::default()));
                self.len += 1;
                chain.len() - 1
            }
        };
        &mut chain[slot].1
    }

    /// Returns the value for `key`.
    ///
    /// Fails with [`MapError::CollectionEmpty`] if the map is empty and with
    /// [`MapError::KeyNotFound`] if the key is absent.
    pub fn value_of(&self, key: &K) -> Result<&V> {
        if self.is_empty() {
            return Err(MapError::CollectionEmpty);
        }
        self.get(key).ok_or(MapError::KeyNotFound)
    }

    /// Mutable counterpart of [`value_of`](ChainedHashMap::value_of).
    pub fn value_of_mut(&mut self, key: &K) -> Result<&mut V> {
        if self.is_empty() {
            return Err(MapError::CollectionEmpty);
        }
        self.get_mut(key).ok_or(MapError::KeyNotFound)
    }

    /// Removes a key from the map and returns its value, failing like
    /// [`value_of`](ChainedHashMap::value_of). The other entries of the chain keep their order.
    pub fn remove(&mut self, key: &K) -> Result<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map and returns the stored key and value.
    pub fn remove_entry(&mut self, key: &K) -> Result<(K, V)> {
        if self.is_empty() {
            return Err(MapError::CollectionEmpty);
        }
        let position = self.locate(key).ok_or(MapError::KeyNotFound)?;
        Ok(self.remove_at(position))
    }

    /// Returns a cursor at `key`, or the end cursor if the key is absent.
    pub fn find(&self, key: &K) -> HashCursor<'_, K, V, S> {
        let position = self
            .locate(key)
            .unwrap_or_else(|| Position::end(&self.buckets));
        HashCursor::new(self, position)
    }

    /// Mutable counterpart of [`find`](ChainedHashMap::find).
    pub fn find_mut(&mut self, key: &K) -> HashCursorMut<'_, K, V, S> {
        let position = self
            .locate(key)
            .unwrap_or_else(|| Position::end(&self.buckets));
        HashCursorMut::new(self, position)
    }
}

impl<K, V, S> ChainedHashMap<K, V, S> {
    fn remove_at(&mut self, position: Position) -> (K, V) {
        self.len -= 1;
        self.buckets[position.bucket].remove(position.slot)
    }
}

impl<K, V> Default for ChainedHashMap<K, V, RandomState> {
    /// Creates an empty map with [`DEFAULT_BUCKETS`] buckets.
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Clone for ChainedHashMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    /// Rebuilds the map with the same bucket count and hasher by inserting every entry.
    fn clone(&self) -> Self {
        let mut map = Self::with_buckets_and_hasher(self.bucket_count(), self.hasher.clone());
        for (key, value) in self {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}

impl<K, V, S> PartialEq for ChainedHashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    /// Maps are equal if they hold the same keys mapped to equal values.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).map_or(false, |other| other == value))
    }
}

impl<K: Hash + Eq, V: Eq, S: BuildHasher> Eq for ChainedHashMap<K, V, S> {}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ChainedHashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Inserts the pairs in sequence order; for a repeated key the first value is kept.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> Extend<(K, V)> for ChainedHashMap<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for ChainedHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.buckets.into_iter().flatten(),
            len: self.len,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.inner.next()?;
        self.len -= 1;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (key, value) = self.inner.next_back()?;
        self.len -= 1;
        Some((key, value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.inner.next()?;
        self.len -= 1;
        Some((&*key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        self.len -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K: Hash + Eq, V, S: BuildHasher> Map<K, V> for ChainedHashMap<K, V, S> {
    type Cursor<'a> = HashCursor<'a, K, V, S> where Self: 'a;
    type CursorMut<'a> = HashCursorMut<'a, K, V, S> where Self: 'a;

    fn len(&self) -> usize {
        ChainedHashMap::len(self)
    }

    fn is_empty(&self) -> bool {
        ChainedHashMap::is_empty(self)
    }

    fn insert(&mut self, key: K, value: V) -> bool {
        ChainedHashMap::insert(self, key, value)
    }

    fn entry_or_default(&mut self, key: K) -> &mut V
    where
        K: Clone,
        V: Default,
    {
        ChainedHashMap::entry_or_default(self, key)
    }

    fn value_of(&self, key: &K) -> Result<&V> {
        ChainedHashMap::value_of(self, key)
    }

    fn value_of_mut(&mut self, key: &K) -> Result<&mut V> {
        ChainedHashMap::value_of_mut(self, key)
    }

    fn remove(&mut self, key: &K) -> Result<V> {
        ChainedHashMap::remove(self, key)
    }

    fn find(&self, key: &K) -> HashCursor<'_, K, V, S> {
        ChainedHashMap::find(self, key)
    }

    fn begin(&self) -> HashCursor<'_, K, V, S> {
        ChainedHashMap::begin(self)
    }

    fn end(&self) -> HashCursor<'_, K, V, S> {
        ChainedHashMap::end(self)
    }

    fn find_mut(&mut self, key: &K) -> HashCursorMut<'_, K, V, S> {
        ChainedHashMap::find_mut(self, key)
    }

    fn begin_mut(&mut self) -> HashCursorMut<'_, K, V, S> {
        ChainedHashMap::begin_mut(self)
    }

    fn end_mut(&mut self) -> HashCursorMut<'_, K, V, S> {
        ChainedHashMap::end_mut(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_buckets_is_raised_to_one() {
        let mut map = ChainedHashMap::with_buckets(0);
        assert_eq!(map.bucket_count(), 1);
        for key in 0..10 {
            assert!(map.insert(key, key * 2));
        }
        assert_eq!(map.len(), 10);
        assert_eq!(map.value_of(&7), Ok(&14));
    }

    #[test]
    fn test_single_bucket_keeps_chain_order() {
        let mut map = ChainedHashMap::with_buckets(1);
        for key in [5, 3, 9, 1] {
            map.insert(key, ());
        }
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, [5, 3, 9, 1]);

        assert_eq!(map.remove(&3), Ok(()));
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, [5, 9, 1]);
    }

    #[test]
    fn test_clear_keeps_buckets() {
        let mut map = ChainedHashMap::with_buckets(8);
        map.extend((0..100).map(|key| (key, key)));
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), 8);
        assert_eq!(map.iter().count(), 0);
        assert_eq!(map.value_of(&1), Err(MapError::CollectionEmpty));
    }

    #[test]
    fn test_clone_keeps_bucket_count() {
        let mut map = ChainedHashMap::with_buckets(3);
        map.extend([(1, "one"), (2, "two")]);
        let copy = map.clone();
        assert_eq!(copy.bucket_count(), 3);
        assert_eq!(copy, map);
    }
}
