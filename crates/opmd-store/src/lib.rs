//! Hierarchical store for openPMD containers.
//!
//! A container is a tree of named groups and datasets, each carrying an
//! ordered map of typed attributes. This crate provides the seam the
//! writers talk to ([`Store`]), an in-memory arena implementation
//! ([`TreeStore`]), file persistence that is atomic on close
//! ([`FileStore`]), and a content hash for determinism checks.
//!
//! # Format
//!
//! ```text
//! [MAGIC "OPMD"] [VERSION u8] [root node]
//! node   := [kind u8] [name str] [attr count u32] [attr]* body
//! body   := group:   [child count u32] [node]*
//!         | dataset: [dtype u8] [rank u32] [dim u64]* [len u64] [element]*
//! ```
//!
//! All integers are little-endian; strings are `u32` length-prefixed UTF-8.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod file;
pub mod hash;
pub mod store;
pub mod tree;

pub use codec::{read_container, write_container};
pub use error::StoreError;
pub use file::FileStore;
pub use hash::content_hash;
pub use store::{ensure_child_group, ensure_group_path, NodeKind, Store};
pub use tree::{Dataset, TreeStore};

/// Magic bytes at the start of every container file.
pub const MAGIC: [u8; 4] = *b"OPMD";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;
