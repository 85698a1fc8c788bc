use thiserror::Error;

/// Errors reported by the maps and their cursors.
///
/// Every failing operation leaves the map exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum MapError {
    /// The operation needs at least one element.
    #[error("collection is empty")]
    CollectionEmpty,
    /// No entry holds the requested key.
    #[error("key not found")]
    KeyNotFound,
    /// A cursor was dereferenced or moved past a valid position.
    #[error("cursor out of range")]
    IteratorOutOfRange,
}

pub type Result<T> = std::result::Result<T, MapError>;
