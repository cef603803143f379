use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
pub enum PackedRTreeError {
    /// A rectangle with `low > high` on an axis, a non-finite coordinate, or an empty set of
    /// rectangles or points passed to a union.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Bulk loading was attempted with zero objects.
    #[error("Cannot build a tree from zero objects")]
    EmptyInput,

    /// An entry references a node that is not present in the tree store.
    #[error("Node {0} is referenced but not present in the tree")]
    UnknownNodeReference(u32),

    /// A persisted node record could not be parsed into a node.
    #[error("Malformed node record on line {line}: {reason}")]
    MalformedPersistedRecord { line: usize, reason: String },

    /// A raw coordinate, offset or query line could not be parsed.
    #[error("Malformed input on line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    /// Node capacity bounds that the packing algorithm cannot satisfy.
    #[error("Invalid node capacity: min_entries {min_entries}, max_entries {max_entries}")]
    InvalidNodeCapacity {
        min_entries: usize,
        max_entries: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PackedRTreeError>;
