use std::cmp::Ordering;
use std::fmt;
use std::iter;
use std::ptr;

use super::node::{Direction, Node};
use super::AvlTreeMap;
use crate::error::{MapError, Result};
use crate::traits::{MapCursor, MapCursorMut};

/// A read-only position in an [`AvlTreeMap`].
///
/// Besides its current node, the cursor keeps the nodes on the path from the root down
/// to it, which is all it needs to step to either neighbour.
/// The end position has no current node and an empty path.
pub struct Cursor<'a, K, V> {
    root: Option<&'a Node<K, V>>,
    path: Path<'a, K, V>,
}

/// A position in an [`AvlTreeMap`] with mutable access to values.
///
/// The cursor holds the map's exclusive borrow and remembers its position as the child
/// slots taken from the root, so the tree cannot change shape under it except through
/// [`remove_current`](CursorMut::remove_current), which consumes it.
pub struct CursorMut<'a, K, V> {
    map: &'a mut AvlTreeMap<K, V>,
    // None at the end position
    directions: Option<Vec<Direction>>,
}

/// The current node plus its ancestors, root first.
struct Path<'a, K, V> {
    current: Option<&'a Node<K, V>>,
    ancestors: Vec<&'a Node<K, V>>,
}

fn is_left_parent_of<K, V>(parent: &Node<K, V>, child: &Node<K, V>) -> bool {
    parent.left.as_deref().map_or(false, |left| ptr::eq(left, child))
}

fn is_right_parent_of<K, V>(parent: &Node<K, V>, child: &Node<K, V>) -> bool {
    parent.right.as_deref().map_or(false, |right| ptr::eq(right, child))
}

impl<'a, K, V> Path<'a, K, V> {
    fn end() -> Self {
        Path {
            current: None,
            ancestors: Vec::new(),
        }
    }

    /// Rebuilds the path that `directions` takes from `root`.
    /// Yields the end position if the directions leave the tree.
    fn follow(root: Option<&'a Node<K, V>>, directions: &[Direction]) -> Self {
        let mut path = Path::end();
        let mut node = match root {
            Some(root) => root,
            None => return path,
        };
        for direction in directions {
            let child = match direction {
                Direction::Left => node.left.as_deref(),
                Direction::Right => node.right.as_deref(),
            };
            match child {
                Some(child) => {
                    path.ancestors.push(node);
                    node = child;
                }
                None => return Path::end(),
            }
        }
        path.current = Some(node);
        path
    }

    fn set_end(&mut self) {
        self.current = None;
        self.ancestors.clear();
    }

    fn descend_min(&mut self, mut node: &'a Node<K, V>) {
        while let Some(left) = node.left.as_deref() {
            self.ancestors.push(node);
            node = left;
        }
        self.current = Some(node);
    }

    fn descend_max(&mut self, mut node: &'a Node<K, V>) {
        while let Some(right) = node.right.as_deref() {
            self.ancestors.push(node);
            node = right;
        }
        self.current = Some(node);
    }

    fn seek_first(&mut self, root: Option<&'a Node<K, V>>) {
        self.set_end();
        if let Some(root) = root {
            self.descend_min(root);
        }
    }

    fn seek(&mut self, root: Option<&'a Node<K, V>>, key: &K)
    where
        K: Ord,
    {
        self.set_end();
        let mut current = root;
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Equal => {
                    self.current = Some(node);
                    return;
                }
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
            self.ancestors.push(node);
        }
        self.set_end();
    }

    fn advance(&mut self) -> Result<()> {
        let node = self.current.ok_or(MapError::IteratorOutOfRange)?;
        if let Some(right) = node.right.as_deref() {
            self.ancestors.push(node);
            self.descend_min(right);
            return Ok(());
        }

        // Climb until we leave a left subtree, the parent is the successor then
        let mut child = node;
        while let Some(parent) = self.ancestors.pop() {
            if is_left_parent_of(parent, child) {
                self.current = Some(parent);
                return Ok(());
            }
            child = parent;
        }
        // Passed the largest key
        self.current = None;
        Ok(())
    }

    fn retreat(&mut self, root: Option<&'a Node<K, V>>) -> Result<()> {
        let root = root.ok_or(MapError::CollectionEmpty)?;
        let node = match self.current {
            None => {
                self.ancestors.clear();
                self.descend_max(root);
                return Ok(());
            }
            Some(node) => node,
        };
        if let Some(left) = node.left.as_deref() {
            self.ancestors.push(node);
            self.descend_max(left);
            return Ok(());
        }

        // Find the first ancestor we reach from its right subtree, without touching
        // the path until we know there is one
        let mut child = node;
        for depth in (0..self.ancestors.len()).rev() {
            let parent = self.ancestors[depth];
            if is_right_parent_of(parent, child) {
                self.ancestors.truncate(depth);
                self.current = Some(parent);
                return Ok(());
            }
            child = parent;
        }
        // Already at the smallest key
        Err(MapError::IteratorOutOfRange)
    }

    /// Child slots taken from the root down to the current node.
    fn directions(&self) -> Option<Vec<Direction>> {
        let current = self.current?;
        let children = self.ancestors.iter().skip(1).copied().chain(iter::once(current));
        let directions = self
            .ancestors
            .iter()
            .zip(children)
            .map(|(&parent, child)| {
                if is_left_parent_of(parent, child) {
                    Direction::Left
                } else {
                    Direction::Right
                }
            })
            .collect();
        Some(directions)
    }
}

// Auto derived clone seems to have an invalid type bound of K: Clone, V: Clone
impl<'a, K, V> Clone for Path<'a, K, V> {
    fn clone(&self) -> Self {
        Path {
            current: self.current,
            ancestors: self.ancestors.clone(),
        }
    }
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(super) fn end(root: Option<&'a Node<K, V>>) -> Self {
        Self {
            root,
            path: Path::end(),
        }
    }

    pub(super) fn seek_first(&mut self) {
        self.path.seek_first(self.root);
    }

    pub(super) fn seek(&mut self, key: &K)
    where
        K: Ord,
    {
        self.path.seek(self.root, key);
    }

    /// Returns the entry under the cursor.
    ///
    /// Fails with [`MapError::CollectionEmpty`] if the map is empty and with
    /// [`MapError::IteratorOutOfRange`] at the end position.
    pub fn get(&self) -> Result<(&'a K, &'a V)> {
        if self.root.is_none() {
            return Err(MapError::CollectionEmpty);
        }
        let node = self.path.current.ok_or(MapError::IteratorOutOfRange)?;
        Ok((&node.key, &node.value))
    }

    /// Returns the key under the cursor, see [`get`](Cursor::get).
    pub fn key(&self) -> Result<&'a K> {
        self.get().map(|(key, _)| key)
    }

    /// Returns the value under the cursor, see [`get`](Cursor::get).
    pub fn value(&self) -> Result<&'a V> {
        self.get().map(|(_, value)| value)
    }

    /// Moves to the next key. Moving past the largest key reaches the end position;
    /// moving from the end fails with [`MapError::IteratorOutOfRange`].
    pub fn advance(&mut self) -> Result<()> {
        self.path.advance()
    }

    /// Moves to the previous key. From the end position this is the largest key.
    /// Fails with [`MapError::IteratorOutOfRange`] at the smallest key, leaving the
    /// cursor where it is, and with [`MapError::CollectionEmpty`] on an empty map.
    pub fn retreat(&mut self) -> Result<()> {
        self.path.retreat(self.root)
    }

    /// Returns true at the end position.
    pub fn is_end(&self) -> bool {
        self.path.current.is_none()
    }
}

// Auto derived clone seems to have an invalid type bound of K: Clone, V: Clone
impl<'a, K, V> Clone for Cursor<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root,
            path: self.path.clone(),
        }
    }
}

impl<'a, K, V> PartialEq for Cursor<'a, K, V> {
    /// Cursors are equal if they belong to the same tree and stand on the same node.
    /// Two cursors on the same node always carry the same path.
    fn eq(&self, other: &Self) -> bool {
        fn same<K, V>(lhs: Option<&Node<K, V>>, rhs: Option<&Node<K, V>>) -> bool {
            match (lhs, rhs) {
                (None, None) => true,
                (Some(lhs), Some(rhs)) => ptr::eq(lhs, rhs),
                _ => false,
            }
        }
        same(self.root, other.root) && same(self.path.current, other.path.current)
    }
}

impl<'a, K, V> Eq for Cursor<'a, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("current", &self.get().ok())
            .field("depth", &self.path.ancestors.len())
            .finish()
    }
}

impl<'a, K, V> MapCursor<'a, K, V> for Cursor<'a, K, V> {
    fn get(&self) -> Result<(&'a K, &'a V)> {
        Cursor::get(self)
    }

    fn advance(&mut self) -> Result<()> {
        Cursor::advance(self)
    }

    fn retreat(&mut self) -> Result<()> {
        Cursor::retreat(self)
    }

    fn is_end(&self) -> bool {
        Cursor::is_end(self)
    }
}

impl<'a, K, V> CursorMut<'a, K, V> {
    pub(super) fn end(map: &'a mut AvlTreeMap<K, V>) -> Self {
        Self {
            map,
            directions: None,
        }
    }

    fn path(&self) -> Path<'_, K, V> {
        match &self.directions {
            None => Path::end(),
            Some(directions) => Path::follow(self.map.root.as_deref(), directions),
        }
    }

    fn check(&self) -> Result<&[Direction]> {
        if self.map.is_empty() {
            return Err(MapError::CollectionEmpty);
        }
        self.directions
            .as_deref()
            .ok_or(MapError::IteratorOutOfRange)
    }

    pub(super) fn seek_first(&mut self) {
        let mut path = Path::end();
        path.seek_first(self.map.root.as_deref());
        self.directions = path.directions();
    }

    pub(super) fn seek(&mut self, key: &K)
    where
        K: Ord,
    {
        let mut path = Path::end();
        path.seek(self.map.root.as_deref(), key);
        self.directions = path.directions();
    }

    /// Returns the entry under the cursor, see [`Cursor::get`].
    pub fn get(&self) -> Result<(&K, &V)> {
        let directions = self.check()?;
        let node = Path::follow(self.map.root.as_deref(), directions)
            .current
            .ok_or(MapError::IteratorOutOfRange)?;
        Ok((&node.key, &node.value))
    }

    /// Returns the entry under the cursor with mutable access to the value.
    pub fn get_mut(&mut self) -> Result<(&K, &mut V)> {
        self.check()?;
        let directions = self
            .directions
            .as_deref()
            .ok_or(MapError::IteratorOutOfRange)?;
        let mut node = self
            .map
            .root
            .as_deref_mut()
            .ok_or(MapError::CollectionEmpty)?;
        for direction in directions {
            let child = match direction {
                Direction::Left => node.left.as_deref_mut(),
                Direction::Right => node.right.as_deref_mut(),
            };
            node = child.ok_or(MapError::IteratorOutOfRange)?;
        }
        Ok((&node.key, &mut node.value))
    }

    /// See [`Cursor::advance`].
    pub fn advance(&mut self) -> Result<()> {
        let mut path = self.path();
        path.advance()?;
        self.directions = path.directions();
        Ok(())
    }

    /// See [`Cursor::retreat`].
    pub fn retreat(&mut self) -> Result<()> {
        let mut path = self.path();
        path.retreat(self.map.root.as_deref())?;
        self.directions = path.directions();
        Ok(())
    }

    /// Returns true at the end position.
    pub fn is_end(&self) -> bool {
        self.directions.is_none()
    }

    /// Removes the entry under the cursor and returns it.
    ///
    /// Fails with [`MapError::CollectionEmpty`] if the map is empty and with
    /// [`MapError::IteratorOutOfRange`] at the end position.
    pub fn remove_current(self) -> Result<(K, V)> {
        let directions = self.check()?.to_vec();
        self.map
            .remove_along(&directions)
            .ok_or(MapError::IteratorOutOfRange)
    }
}

impl<K: fmt::Debug, V> fmt::Debug for CursorMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("current", &self.get().ok().map(|(key, _)| key))
            .field("depth", &self.directions.as_ref().map_or(0, Vec::len))
            .finish()
    }
}

impl<'a, K, V> MapCursorMut<K, V> for CursorMut<'a, K, V> {
    fn get(&self) -> Result<(&K, &V)> {
        CursorMut::get(self)
    }

    fn get_mut(&mut self) -> Result<(&K, &mut V)> {
        CursorMut::get_mut(self)
    }

    fn advance(&mut self) -> Result<()> {
        CursorMut::advance(self)
    }

    fn retreat(&mut self) -> Result<()> {
        CursorMut::retreat(self)
    }

    fn is_end(&self) -> bool {
        CursorMut::is_end(self)
    }

    fn remove_current(self) -> Result<(K, V)> {
        CursorMut::remove_current(self)
    }
}
