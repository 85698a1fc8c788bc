use std::collections::hash_map::RandomState;
use std::fmt;
use std::ptr;

use super::ChainedHashMap;
use crate::error::{MapError, Result};
use crate::traits::{MapCursor, MapCursorMut};

/// A slot in the bucket array. The end position has `bucket == buckets.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Position {
    pub(super) bucket: usize,
    pub(super) slot: usize,
}

impl Position {
    pub(super) fn end<T>(buckets: &[Vec<T>]) -> Self {
        Position {
            bucket: buckets.len(),
            slot: 0,
        }
    }

    pub(super) fn first<T>(buckets: &[Vec<T>]) -> Self {
        Self::first_from(buckets, 0)
    }

    fn first_from<T>(buckets: &[Vec<T>], start: usize) -> Self {
        buckets
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, chain)| !chain.is_empty())
            .map_or(Self::end(buckets), |(bucket, _)| Position { bucket, slot: 0 })
    }

    fn is_end<T>(self, buckets: &[Vec<T>]) -> bool {
        self.bucket >= buckets.len()
    }

    fn next<T>(self, buckets: &[Vec<T>]) -> Result<Self> {
        if self.is_end(buckets) {
            return Err(MapError::IteratorOutOfRange);
        }
        if self.slot + 1 < buckets[self.bucket].len() {
            Ok(Position {
                slot: self.slot + 1,
                ..self
            })
        } else {
            Ok(Self::first_from(buckets, self.bucket + 1))
        }
    }

    fn prev<T>(self, buckets: &[Vec<T>]) -> Result<Self> {
        if !self.is_end(buckets) && self.slot > 0 {
            return Ok(Position {
                slot: self.slot - 1,
                ..self
            });
        }
        let upto = self.bucket.min(buckets.len());
        buckets[..upto]
            .iter()
            .rposition(|chain| !chain.is_empty())
            .map(|bucket| Position {
                bucket,
                slot: buckets[bucket].len() - 1,
            })
            .ok_or(MapError::IteratorOutOfRange)
    }
}

/// A read-only cursor over a [`ChainedHashMap`], moving in bucket order.
pub struct HashCursor<'a, K, V, S = RandomState> {
    map: &'a ChainedHashMap<K, V, S>,
    position: Position,
}

/// A cursor over a [`ChainedHashMap`] that can update values and remove the current entry.
pub struct HashCursorMut<'a, K, V, S = RandomState> {
    map: &'a mut ChainedHashMap<K, V, S>,
    position: Position,
}

impl<'a, K, V, S> HashCursor<'a, K, V, S> {
    pub(super) fn new(map: &'a ChainedHashMap<K, V, S>, position: Position) -> Self {
        Self { map, position }
    }

    /// Returns the entry at the cursor.
    ///
    /// Fails with [`MapError::CollectionEmpty`] on an empty map and with
    /// [`MapError::IteratorOutOfRange`] at the end position.
    pub fn get(&self) -> Result<(&'a K, &'a V)> {
        if self.map.is_empty() {
            return Err(MapError::CollectionEmpty);
        }
        if self.position.is_end(&self.map.buckets) {
            return Err(MapError::IteratorOutOfRange);
        }
        let (key, value) = &self.map.buckets[self.position.bucket][self.position.slot];
        Ok((key, value))
    }

    /// Moves to the next entry in bucket order, or to the end position after the last one.
    pub fn advance(&mut self) -> Result<()> {
        self.position = self.position.next(&self.map.buckets)?;
        Ok(())
    }

    /// Moves to the previous entry in bucket order. From the end position this is the last entry.
    pub fn retreat(&mut self) -> Result<()> {
        if self.map.is_empty() {
            return Err(MapError::CollectionEmpty);
        }
        self.position = self.position.prev(&self.map.buckets)?;
        Ok(())
    }

    /// Returns true at the end position.
    pub fn is_end(&self) -> bool {
        self.position.is_end(&self.map.buckets)
    }
}

impl<K, V, S> Clone for HashCursor<'_, K, V, S> {
    fn clone(&self) -> Self {
        Self {
            map: self.map,
            position: self.position,
        }
    }
}

impl<K, V, S> PartialEq for HashCursor<'_, K, V, S> {
    /// Cursors are equal if they belong to the same map and sit on the same slot.
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.map, other.map) && self.position == other.position
    }
}

impl<K, V, S> Eq for HashCursor<'_, K, V, S> {}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashCursor<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashCursor")
            .field("entry", &self.get().ok())
            .field("position", &self.position)
            .finish()
    }
}

impl<'a, K, V, S> MapCursor<'a, K, V> for HashCursor<'a, K, V, S> {
    fn get(&self) -> Result<(&'a K, &'a V)> {
        HashCursor::get(self)
    }

    fn advance(&mut self) -> Result<()> {
        HashCursor::advance(self)
    }

    fn retreat(&mut self) -> Result<()> {
        HashCursor::retreat(self)
    }

    fn is_end(&self) -> bool {
        HashCursor::is_end(self)
    }
}

impl<'a, K, V, S> HashCursorMut<'a, K, V, S> {
    pub(super) fn new(map: &'a mut ChainedHashMap<K, V, S>, position: Position) -> Self {
        Self { map, position }
    }

    fn check(&self) -> Result<Position> {
        if self.map.is_empty() {
            return Err(MapError::CollectionEmpty);
        }
        if self.position.is_end(&self.map.buckets) {
            return Err(MapError::IteratorOutOfRange);
        }
        Ok(self.position)
    }

    /// Returns the entry at the cursor, failing like [`HashCursor::get`].
    pub fn get(&self) -> Result<(&K, &V)> {
        let Position { bucket, slot } = self.check()?;
        let (key, value) = &self.map.buckets[bucket][slot];
        Ok((key, value))
    }

    /// Returns the entry at the cursor with a mutable value.
    pub fn get_mut(&mut self) -> Result<(&K, &mut V)> {
        let Position { bucket, slot } = self.check()?;
        let (key, value) = &mut self.map.buckets[bucket][slot];
        Ok((&*key, value))
    }

    /// See [`HashCursor::advance`].
    pub fn advance(&mut self) -> Result<()> {
        self.position = self.position.next(&self.map.buckets)?;
        Ok(())
    }

    /// See [`HashCursor::retreat`].
    pub fn retreat(&mut self) -> Result<()> {
        if self.map.is_empty() {
            return Err(MapError::CollectionEmpty);
        }
        self.position = self.position.prev(&self.map.buckets)?;
        Ok(())
    }

    /// Returns true at the end position.
    pub fn is_end(&self) -> bool {
        self.position.is_end(&self.map.buckets)
    }

    /// Removes the entry at the cursor and returns it, consuming the cursor.
    pub fn remove_current(self) -> Result<(K, V)> {
        let position = self.check()?;
        Ok(self.map.remove_at(position))
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashCursorMut<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashCursorMut")
            .field("entry", &self.get().ok())
            .field("position", &self.position)
            .finish()
    }
}

impl<K, V, S> MapCursorMut<K, V> for HashCursorMut<'_, K, V, S> {
    fn get(&self) -> Result<(&K, &V)> {
        HashCursorMut::get(self)
    }

    fn get_mut(&mut self) -> Result<(&K, &mut V)> {
        HashCursorMut::get_mut(self)
    }

    fn advance(&mut self) -> Result<()> {
        HashCursorMut::advance(self)
    }

    fn retreat(&mut self) -> Result<()> {
        HashCursorMut::retreat(self)
    }

    fn is_end(&self) -> bool {
        HashCursorMut::is_end(self)
    }

    fn remove_current(self) -> Result<(K, V)> {
        HashCursorMut::remove_current(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_skip_empty_buckets() {
        let buckets: Vec<Vec<u8>> = vec![vec![], vec![1, 2], vec![], vec![3], vec![]];
        let first = Position::first(&buckets);
        assert_eq!(first, Position { bucket: 1, slot: 0 });

        let second = first.next(&buckets).unwrap();
        assert_eq!(second, Position { bucket: 1, slot: 1 });
        let third = second.next(&buckets).unwrap();
        assert_eq!(third, Position { bucket: 3, slot: 0 });
        let end = third.next(&buckets).unwrap();
        assert!(end.is_end(&buckets));
        assert_eq!(end.next(&buckets), Err(MapError::IteratorOutOfRange));

        assert_eq!(end.prev(&buckets), Ok(third));
        assert_eq!(third.prev(&buckets), Ok(second));
        assert_eq!(second.prev(&buckets), Ok(first));
        assert_eq!(first.prev(&buckets), Err(MapError::IteratorOutOfRange));
    }
}
