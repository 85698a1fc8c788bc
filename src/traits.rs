//! The interface shared by [`AvlTreeMap`](crate::AvlTreeMap) and
//! [`ChainedHashMap`](crate::ChainedHashMap), so callers can substitute one for the other.

use crate::error::Result;

/// A map from unique keys to values with cursor-based traversal.
///
/// Inserting a key that is already present is a no-op: the stored value is kept.
/// Use [`entry_or_default`](Map::entry_or_default) or [`value_of_mut`](Map::value_of_mut)
/// to overwrite.
pub trait Map<K, V> {
    type Cursor<'a>: MapCursor<'a, K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    type CursorMut<'a>: MapCursorMut<K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns true if the map holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts a key-value pair unless the key is already present.
    /// Returns whether a new entry was added.
    fn insert(&mut self, key: K, value: V) -> bool;

    /// Returns the value for `key`, inserting `V::default()` first if the key is absent.
    fn entry_or_default(&mut self, key: K) -> &mut V
    where
        K: Clone,
        V: Default;

    /// Returns the value for `key`.
    ///
    /// Fails with [`CollectionEmpty`](crate::MapError::CollectionEmpty) on an empty map,
    /// otherwise with [`KeyNotFound`](crate::MapError::KeyNotFound) if the key is absent.
    fn value_of(&self, key: &K) -> Result<&V>;

    /// Mutable counterpart of [`value_of`](Map::value_of).
    fn value_of_mut(&mut self, key: &K) -> Result<&mut V>;

    /// Removes `key` and returns its value, failing like [`value_of`](Map::value_of).
    fn remove(&mut self, key: &K) -> Result<V>;

    /// Returns a cursor at `key`, or the end cursor if the key is absent.
    fn find(&self, key: &K) -> Self::Cursor<'_>;

    /// Returns a cursor at the first entry (the end cursor if the map is empty).
    fn begin(&self) -> Self::Cursor<'_>;

    /// Returns the end cursor.
    fn end(&self) -> Self::Cursor<'_>;

    /// Mutable counterpart of [`find`](Map::find).
    fn find_mut(&mut self, key: &K) -> Self::CursorMut<'_>;

    /// Mutable counterpart of [`begin`](Map::begin).
    fn begin_mut(&mut self) -> Self::CursorMut<'_>;

    /// Mutable counterpart of [`end`](Map::end).
    fn end_mut(&mut self) -> Self::CursorMut<'_>;

    /// Returns true if both maps hold the same keys mapped to equal values,
    /// regardless of insertion order or internal layout.
    fn same_content<M>(&self, other: &M) -> bool
    where
        M: Map<K, V>,
        V: PartialEq,
    {
        if self.len() != other.len() {
            return false;
        }
        let mut cursor = self.begin();
        while let Ok((key, value)) = cursor.get() {
            match other.value_of(key) {
                Ok(other_value) if other_value == value => {}
                _ => return false,
            }
            if cursor.advance().is_err() {
                break;
            }
        }
        true
    }
}

/// A read-only position in a [`Map`].
///
/// A cursor borrows its map, so the map cannot be changed while the cursor is alive.
pub trait MapCursor<'a, K, V> {
    /// Returns the entry under the cursor.
    ///
    /// Fails with [`CollectionEmpty`](crate::MapError::CollectionEmpty) if the map is empty
    /// and with [`IteratorOutOfRange`](crate::MapError::IteratorOutOfRange) at the end.
    fn get(&self) -> Result<(&'a K, &'a V)>;

    /// Moves to the next entry. Moving past the last entry reaches the end position;
    /// moving from the end fails.
    fn advance(&mut self) -> Result<()>;

    /// Moves to the previous entry. Retreating from the end restores the last entry;
    /// retreating from the first entry fails and leaves the cursor unchanged.
    fn retreat(&mut self) -> Result<()>;

    /// Returns true at the end position.
    fn is_end(&self) -> bool;
}

/// A position in a [`Map`] that can modify values and remove the entry under it.
pub trait MapCursorMut<K, V> {
    /// See [`MapCursor::get`].
    fn get(&self) -> Result<(&K, &V)>;

    /// Like [`get`](MapCursorMut::get), with mutable access to the value.
    fn get_mut(&mut self) -> Result<(&K, &mut V)>;

    /// See [`MapCursor::advance`].
    fn advance(&mut self) -> Result<()>;

    /// See [`MapCursor::retreat`].
    fn retreat(&mut self) -> Result<()>;

    /// See [`MapCursor::is_end`].
    fn is_end(&self) -> bool;

    /// Removes the entry under the cursor and returns it, consuming the cursor.
    fn remove_current(self) -> Result<(K, V)>
    where
        Self: Sized;
}
