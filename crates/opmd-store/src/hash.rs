//! Content hashing for determinism checks.
//!
//! Uses FNV-1a over node names, attribute names, type tags, values and
//! payload bits, walking the tree depth-first in creation order. Not
//! cryptographically secure; it only answers "are these two containers
//! byte-for-byte the same content".

use opmd_core::{AttrValue, DataBuffer, NodeId};

use crate::error::StoreError;
use crate::store::{NodeKind, Store};

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

#[inline]
fn fnv1a_u64(hash: u64, v: u64) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}

fn fnv1a_str(hash: u64, s: &str) -> u64 {
    // Length first so ("ab", "c") and ("a", "bc") differ.
    fnv1a_bytes(fnv1a_u64(hash, s.len() as u64), s.as_bytes())
}

fn hash_attr(mut hash: u64, value: &AttrValue) -> u64 {
    hash = fnv1a_str(hash, value.type_name());
    match value {
        AttrValue::Str(s) => fnv1a_str(hash, s),
        AttrValue::StrArray(v) => v.iter().fold(fnv1a_u64(hash, v.len() as u64), |h, s| {
            fnv1a_str(h, s)
        }),
        AttrValue::F32(v) => fnv1a_bytes(hash, &v.to_bits().to_le_bytes()),
        AttrValue::F64(v) => fnv1a_u64(hash, v.to_bits()),
        AttrValue::U32(v) => fnv1a_bytes(hash, &v.to_le_bytes()),
        AttrValue::U64(v) => fnv1a_u64(hash, *v),
        AttrValue::F32Array(v) => v.iter().fold(fnv1a_u64(hash, v.len() as u64), |h, x| {
            fnv1a_bytes(h, &x.to_bits().to_le_bytes())
        }),
        AttrValue::F64Array(v) => v
            .iter()
            .fold(fnv1a_u64(hash, v.len() as u64), |h, x| fnv1a_u64(h, x.to_bits())),
        AttrValue::U64Array(v) => v
            .iter()
            .fold(fnv1a_u64(hash, v.len() as u64), |h, x| fnv1a_u64(h, *x)),
    }
}

fn hash_node(mut hash: u64, store: &dyn Store, node: NodeId) -> Result<u64, StoreError> {
    hash = fnv1a_str(hash, store.name(node)?);
    for (name, value) in store.attrs(node)? {
        hash = fnv1a_str(hash, name);
        hash = hash_attr(hash, value);
    }
    match store.kind(node)? {
        NodeKind::Group => {
            let children = store.children(node)?;
            hash = fnv1a_u64(hash, children.len() as u64);
            for child in children {
                hash = hash_node(hash, store, child)?;
            }
        }
        NodeKind::Dataset => {
            let ds = store.dataset(node)?;
            for &dim in ds.shape.iter() {
                hash = fnv1a_u64(hash, dim);
            }
            hash = match &ds.data {
                DataBuffer::F32(v) => v
                    .iter()
                    .fold(hash, |h, x| fnv1a_bytes(h, &x.to_bits().to_le_bytes())),
                DataBuffer::F64(v) => v.iter().fold(hash, |h, x| fnv1a_u64(h, x.to_bits())),
                DataBuffer::U64(v) => v.iter().fold(hash, |h, x| fnv1a_u64(h, *x)),
            };
        }
    }
    Ok(hash)
}

/// Hash the full content of a container.
///
/// Two stores built by the same sequence of writes hash equal; any
/// difference in structure, names, attribute types or values, or a
/// single payload bit, changes the hash.
pub fn content_hash(store: &dyn Store) -> Result<u64, StoreError> {
    hash_node(FNV_OFFSET, store, store.root())
}
