use thiserror::Error;

/// Errors reported by trees and tree maps.
///
/// Every variant is a contract violation by the caller. Checks run before any mutation, so an
/// operation that returns an error has left its tree exactly as it found it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum TreeError {
    /// The position belongs to another tree, or its node has been removed.
    #[error("position does not belong to this tree or has been removed")]
    InvalidPosition,
    /// The key cannot be ordered by the map's comparator.
    #[error("key is not comparable under the map's comparator")]
    IncompatibleKey,
    /// The requested structural change would break the shape of the tree.
    #[error("illegal structural request: {0}")]
    IllegalStructure(&'static str),
}

/// A `Result` whose error type defaults to [`TreeError`].
pub type Result<T, E = TreeError> = core::result::Result<T, E>;
