//! An ordered map implemented with an AVL tree.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;
use std::mem;

use tracing::{debug, trace};

use crate::error::{MapError, Result};
use crate::traits::Map;

mod cursor;
mod iter;
mod node;

pub use cursor::{Cursor, CursorMut};
pub use iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};

use node::{rebalance_link, Direction, Link, Node};

/// An ordered map implemented with an AVL tree.
///
/// Nodes own their children; there are no parent links. Traversal state lives in
/// [`Cursor`]s, which carry the path from the root to their current node.
///
/// ```
/// use avl_map::AvlTreeMap;
/// let mut map = AvlTreeMap::new();
/// map.insert(0, "zero");
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.get(&1), Some(&"one"));
/// assert_eq!(map.remove(&1), Ok("one"));
/// assert!(map.get(&1).is_none());
/// ```
pub struct AvlTreeMap<K, V> {
    root: Link<K, V>,
    num_nodes: usize,
}

impl<K, V> AvlTreeMap<K, V> {
    /// Creates an empty map.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
        }
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree. An empty map has height 0, a single entry height 1.
    pub fn height(&self) -> usize {
        node::height(&self.root)
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        debug!(len = self.num_nodes, "clearing map");
        self.root = None;
        self.num_nodes = 0;
    }

    /// Returns a cursor at the smallest key, or the end cursor if the map is empty.
    pub fn begin(&self) -> Cursor<'_, K, V> {
        let mut cursor = Cursor::end(self.root.as_deref());
        cursor.seek_first();
        cursor
    }

    /// Returns the end cursor, positioned past the largest key.
    pub fn end(&self) -> Cursor<'_, K, V> {
        Cursor::end(self.root.as_deref())
    }

    /// Mutable counterpart of [`begin`](AvlTreeMap::begin).
    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V> {
        let mut cursor = CursorMut::end(self);
        cursor.seek_first();
        cursor
    }

    /// Mutable counterpart of [`end`](AvlTreeMap::end).
    pub fn end_mut(&mut self) -> CursorMut<'_, K, V> {
        CursorMut::end(self)
    }

    /// Returns the entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.begin().get().ok()
    }

    /// Returns the entry with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some((&node.key, &node.value))
    }

    /// Gets an iterator over the entries of the map in sorted order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Gets a mutable iterator over the entries of the map in sorted order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.root.as_deref_mut(), self.num_nodes)
    }

    /// Gets an iterator over the keys of the map in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    /// Gets an iterator over the values of the map in key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    /// Gets a mutable iterator over the values of the map in key order.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }

    /// Removes the entry reached by following `path` from the root.
    /// Returns None if the path leaves the tree.
    fn remove_along(&mut self, path: &[Direction]) -> Option<(K, V)> {
        let removed = remove_along(&mut self.root, path)?;
        self.num_nodes -= 1;
        Some(removed)
    }

    #[cfg(test)]
    pub(crate) fn root_key(&self) -> Option<&K> {
        self.root.as_ref().map(|root| &root.key)
    }
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_node(key).map(|node| &node.value)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.find_node(key).map(|node| (&node.key, &node.value))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Equal => return Some(&mut node.value),
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
            };
        }
        None
    }

    /// Returns true if the map contains a value for the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_node(key).is_some()
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

    /// Mutable counterpart of [`value_of`](AvlTreeMap::value_of).
    pub fn value_of_mut(&mut self, key: &K) -> Result<&mut V> {
        if self.is_empty() {
            return Err(MapError::CollectionEmpty);
        }
        self.get_mut(key).ok_or(MapError::KeyNotFound)
    }

    /// Returns the value for `key`, inserting `V::default()` first if the key is absent.
    /// Later calls with the same key return the same storage.
    pub fn entry_or_default(&mut self, key: K) -> &mut V
    where
        K: Clone,
        V: Default,
    {
        if !self.contains_key(&key) {
            self.insert(key.clone(), V::default());
        }
        // The slot is occupied after the insert above, so the leaf is never built
        let slot = slot_of(&mut self.root, &key);
        &mut slot.get_or_insert_with(|| Node::leaf(key, V::default())).value
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already holds the key, nothing changes: the stored value is kept and
    /// `false` is returned. Returns `true` if a new entry was added.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let inserted = insert(&mut self.root, key, value);
        if inserted {
            self.num_nodes += 1;
        }
        inserted
    }

    /// Removes a key from the map and returns its value.
    ///
    /// Fails with [`MapError::CollectionEmpty`] if the map is empty and with
    /// [`MapError::KeyNotFound`] if the key is absent; the map is unchanged then.
    pub fn remove(&mut self, key: &K) -> Result<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map and returns the stored key and value.
    pub fn remove_entry(&mut self, key: &K) -> Result<(K, V)> {
        if self.is_empty() {
            return Err(MapError::CollectionEmpty);
        }
        let removed = remove(&mut self.root, key).ok_or(MapError::KeyNotFound)?;
        debug_assert!(self.num_nodes >= 1);
        self.num_nodes -= 1;
        Ok(removed)
    }

    /// Returns a cursor at `key`, or the end cursor if the key is absent.
    pub fn find(&self, key: &K) -> Cursor<'_, K, V> {
        let mut cursor = Cursor::end(self.root.as_deref());
        cursor.seek(key);
        cursor
    }

    /// Mutable counterpart of [`find`](AvlTreeMap::find).
    pub fn find_mut(&mut self, key: &K) -> CursorMut<'_, K, V> {
        let mut cursor = CursorMut::end(self);
        cursor.seek(key);
        cursor
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        fn check<K: Ord, V>(link: &Link<K, V>, num_nodes: &mut usize) -> usize {
            let node = match link {
                None => return 0,
                Some(node) => node,
            };

            // Check links to child nodes
            if let Some(left) = &node.left {
                assert!(left.key < node.key);
            }
            if let Some(right) = &node.right {
                assert!(right.key > node.key);
            }
            let left_height = check(&node.left, num_nodes);
            let right_height = check(&node.right, num_nodes);

            // Check height
            assert_eq!(node.height, 1 + left_height.max(right_height));

            // Check AVL condition (nearly balance)
            assert!(left_height <= right_height + 1);
            assert!(right_height <= left_height + 1);

            *num_nodes += 1;
            node.height
        }

        // Check tree nodes
        let mut num_nodes = 0;
        check(&self.root, &mut num_nodes);

        // Check ordering across subtrees, which the local checks above cannot see
        let mut keys = self.keys();
        if let Some(mut prev) = keys.next() {
            for key in keys {
                assert!(prev < key);
                prev = key;
            }
        }

        // Check number of nodes
        assert_eq!(num_nodes, self.num_nodes);
    }

    fn find_node(&self, key: &K) -> Option<&Node<K, V>> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Equal => break,
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        current
    }
}

/// Returns the link that holds `key`, or the empty link where it would be placed.
fn slot_of<'a, K: Ord, V>(link: &'a mut Link<K, V>, key: &K) -> &'a mut Link<K, V> {
    let ordering = link.as_ref().map(|node| key.cmp(&node.key));
    match (ordering, link) {
        (Some(Ordering::Less), Some(node)) => slot_of(&mut node.left, key),
        (Some(Ordering::Greater), Some(node)) => slot_of(&mut node.right, key),
        (_, link) => link,
    }
}

/// Places `key` into the subtree owned by `link` and rebalances every node on the
/// way back up. Returns whether a node was created.
fn insert<K: Ord, V>(link: &mut Link<K, V>, key: K, value: V) -> bool {
    let inserted = match link {
        None => {
            *link = Some(Node::leaf(key, value));
            return true;
        }
        Some(node) => match key.cmp(&node.key) {
            Ordering::Equal => false,
            Ordering::Less => insert(&mut node.left, key, value),
            Ordering::Greater => insert(&mut node.right, key, value),
        },
    };
    if inserted {
        rebalance_link(link);
    }
    inserted
}

/// Removes `key` from the subtree owned by `link` and rebalances every node on the
/// way back up. Returns None, leaving the subtree untouched, if the key is absent.
fn remove<K: Ord, V>(link: &mut Link<K, V>, key: &K) -> Option<(K, V)> {
    let node = link.as_mut()?;
    let removed = match key.cmp(&node.key) {
        Ordering::Equal => return unlink(link),
        Ordering::Less => remove(&mut node.left, key)?,
        Ordering::Greater => remove(&mut node.right, key)?,
    };
    rebalance_link(link);
    Some(removed)
}

/// Like [`remove`], but the target is addressed by the child slots taken from the
/// subtree root instead of by key.
fn remove_along<K, V>(link: &mut Link<K, V>, path: &[Direction]) -> Option<(K, V)> {
    let (dir, rest) = match path.split_first() {
        None => return unlink(link),
        Some(split) => split,
    };
    let node = link.as_mut()?;
    let removed = match dir {
        Direction::Left => remove_along(&mut node.left, rest)?,
        Direction::Right => remove_along(&mut node.right, rest)?,
    };
    rebalance_link(link);
    Some(removed)
}

/// Detaches the node owned by `link` and returns its entry.
///
/// A node with two children stays in place: the in-order predecessor is removed from
/// the left subtree and its entry moves into the node.
fn unlink<K, V>(link: &mut Link<K, V>) -> Option<(K, V)> {
    let node = link.as_mut()?;
    if node.left.is_some() && node.right.is_some() {
        let (pred_key, pred_value) = remove_max(&mut node.left)?;
        trace!(height = node.height, "promoting in-order predecessor");
        let key = mem::replace(&mut node.key, pred_key);
        let value = mem::replace(&mut node.value, pred_value);
        rebalance_link(link);
        return Some((key, value));
    }

    // Node is stem or leaf, replace it by its only child (if any)
    let mut node = link.take()?;
    *link = node.left.take().or_else(|| node.right.take());
    let Node { key, value, .. } = *node;
    Some((key, value))
}

fn remove_max<K, V>(link: &mut Link<K, V>) -> Option<(K, V)> {
    let node = link.as_mut()?;
    if node.right.is_none() {
        return unlink(link);
    }
    let removed = remove_max(&mut node.right)?;
    rebalance_link(link);
    Some(removed)
}

impl<K, V> Default for AvlTreeMap<K, V> {
    /// Creates an empty map.
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Clone> Clone for AvlTreeMap<K, V> {
    /// Rebuilds the map by inserting every entry in key order, so the copy is
    /// balanced on its own rather than a replica of this tree's shape.
    fn clone(&self) -> Self {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<K: Ord, V: PartialEq> PartialEq for AvlTreeMap<K, V> {
    /// Maps are equal if they hold the same keys mapped to equal values,
    /// whatever order the entries were inserted in.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).map_or(false, |other| other == value))
    }
}

impl<K: Ord, V: Eq> Eq for AvlTreeMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTreeMap<K, V> {
    /// Inserts the pairs in sequence order; for a repeated key the first value is kept.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlTreeMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut AvlTreeMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for AvlTreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(mut self) -> Self::IntoIter {
        let len = mem::take(&mut self.num_nodes);
        IntoIter::new(self.root.take(), len)
    }
}

impl<K: Ord, V> Map<K, V> for AvlTreeMap<K, V> {
    type Cursor<'a> = Cursor<'a, K, V> where K: 'a, V: 'a;
    type CursorMut<'a> = CursorMut<'a, K, V> where K: 'a, V: 'a;

    fn len(&self) -> usize {
        AvlTreeMap::len(self)
    }

    fn is_empty(&self) -> bool {
        AvlTreeMap::is_empty(self)
    }

    fn insert(&mut self, key: K, value: V) -> bool {
        AvlTreeMap::insert(self, key, value)
    }

    fn entry_or_default(&mut self, key: K) -> &mut V
    where
        K: Clone,
        V: Default,
    {
        AvlTreeMap::entry_or_default(self, key)
    }

    fn value_of(&self, key: &K) -> Result<&V> {
        AvlTreeMap::value_of(self, key)
    }

    fn value_of_mut(&mut self, key: &K) -> Result<&mut V> {
        AvlTreeMap::value_of_mut(self, key)
    }

    fn remove(&mut self, key: &K) -> Result<V> {
        AvlTreeMap::remove(self, key)
    }

    fn find(&self, key: &K) -> Cursor<'_, K, V> {
        AvlTreeMap::find(self, key)
    }

    fn begin(&self) -> Cursor<'_, K, V> {
        AvlTreeMap::begin(self)
    }

    fn end(&self) -> Cursor<'_, K, V> {
        AvlTreeMap::end(self)
    }

    fn find_mut(&mut self, key: &K) -> CursorMut<'_, K, V> {
        AvlTreeMap::find_mut(self, key)
    }

    fn begin_mut(&mut self) -> CursorMut<'_, K, V> {
        AvlTreeMap::begin_mut(self)
    }

    fn end_mut(&mut self) -> CursorMut<'_, K, V> {
        AvlTreeMap::end_mut(self)
    }
}
