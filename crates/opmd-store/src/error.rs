//! Error types for the backing store.

use std::fmt;
use std::io;

use opmd_core::NodeId;

/// Errors raised by a [`Store`](crate::Store) implementation or the codec.
#[derive(Debug)]
pub enum StoreError {
    /// An I/O error occurred while persisting or loading a container.
    Io(io::Error),
    /// A child with this name already exists under the parent.
    NameCollision {
        /// Path of the existing child.
        path: String,
    },
    /// The attribute is already set on this node.
    AttributeCollision {
        /// Path of the node.
        path: String,
        /// Attribute name.
        name: String,
    },
    /// The node identifier does not belong to this store.
    UnknownNode {
        /// The offending identifier.
        id: NodeId,
    },
    /// A group operation was attempted on a dataset.
    NotAGroup {
        /// Path of the dataset.
        path: String,
    },
    /// A dataset operation was attempted on a group.
    NotADataset {
        /// Path of the group.
        path: String,
    },
    /// Node and attribute names must be non-empty and free of `/`.
    InvalidName {
        /// The rejected name.
        name: String,
    },
    /// A dataset payload does not hold as many elements as its shape.
    PayloadLength {
        /// Path the dataset would have had.
        path: String,
        /// Element count implied by the shape.
        expected: u64,
        /// Element count of the payload.
        found: u64,
    },
    /// The store has been closed; no further mutation is accepted.
    Closed,
    /// The input does not start with the `b"OPMD"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the input.
        found: u8,
    },
    /// The input could not be decoded (truncated or corrupt data).
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::NameCollision { path } => write!(f, "'{path}' already exists"),
            Self::AttributeCollision { path, name } => {
                write!(f, "attribute '{name}' already set on '{path}'")
            }
            Self::UnknownNode { id } => write!(f, "unknown node id {id}"),
            Self::NotAGroup { path } => write!(f, "'{path}' is a dataset, not a group"),
            Self::NotADataset { path } => write!(f, "'{path}' is a group, not a dataset"),
            Self::InvalidName { name } => write!(f, "invalid node or attribute name {name:?}"),
            Self::PayloadLength {
                path,
                expected,
                found,
            } => write!(
                f,
                "dataset '{path}' declares {expected} elements but payload has {found}"
            ),
            Self::Closed => write!(f, "store is closed"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"OPMD\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::Malformed { detail } => write!(f, "malformed container: {detail}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
