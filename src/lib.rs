//! Ordered and hashed key-value maps with cursor navigation.
//!
//! [`AvlTreeMap`] keeps its entries sorted in a self-balancing AVL tree.
//! [`ChainedHashMap`] spreads them over a fixed number of buckets.
//! Both implement the [`Map`] trait, so code written against it works with either.
//!
//! ```
//! use avl_map::{AvlTreeMap, ChainedHashMap, Map, MapError};
//!
//! fn fill<M: Map<i32, &'static str>>(map: &mut M) {
//!     map.insert(2, "two");
//!     map.insert(1, "one");
//!     map.insert(3, "three");
//! }
//!
//! let mut tree = AvlTreeMap::new();
//! let mut hash = ChainedHashMap::new();
//! fill(&mut tree);
//! fill(&mut hash);
//! assert!(tree.same_content(&hash));
//!
//! let keys: Vec<_> = tree.keys().copied().collect();
//! assert_eq!(keys, [1, 2, 3]);
//! assert_eq!(tree.remove(&4), Err(MapError::KeyNotFound));
//! ```

mod error;
pub mod hash;
pub mod map;
mod traits;

pub use error::{MapError, Result};
pub use hash::{ChainedHashMap, HashCursor, HashCursorMut, DEFAULT_BUCKETS};
pub use map::{AvlTreeMap, Cursor, CursorMut};
pub use traits::{Map, MapCursor, MapCursorMut};
