//! Binary encode/decode for container files.
//!
//! All integers are little-endian. Strings are length-prefixed with a
//! `u32`. Nodes are written depth-first, parents before children, with
//! siblings in creation order; re-encoding a decoded container yields
//! identical bytes.

use std::io::{Read, Write};

use opmd_core::{AttrValue, DataBuffer, Dtype, NodeId, Shape};

use crate::error::StoreError;
use crate::store::{NodeKind, Store};
use crate::tree::TreeStore;
use crate::{FORMAT_VERSION, MAGIC};

// ── Tags ────────────────────────────────────────────────────────

const NODE_GROUP: u8 = 0;
const NODE_DATASET: u8 = 1;

const ATTR_STR: u8 = 0;
const ATTR_STR_ARRAY: u8 = 1;
const ATTR_F32: u8 = 2;
const ATTR_F64: u8 = 3;
const ATTR_U32: u8 = 4;
const ATTR_U64: u8 = 5;
const ATTR_F32_ARRAY: u8 = 6;
const ATTR_F64_ARRAY: u8 = 7;
const ATTR_U64_ARRAY: u8 = 8;

fn dtype_tag(dtype: Dtype) -> u8 {
    match dtype {
        Dtype::F32 => 0,
        Dtype::F64 => 1,
        Dtype::U64 => 2,
    }
}

// ── Primitive writers ───────────────────────────────────────────

fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), StoreError> {
    w.write_all(&[v])?;
    Ok(())
}

fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), StoreError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), StoreError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_len(w: &mut dyn Write, len: usize) -> Result<(), StoreError> {
    let len = u32::try_from(len).map_err(|_| StoreError::Malformed {
        detail: format!("length {len} exceeds u32"),
    })?;
    write_u32_le(w, len)
}

fn write_str(w: &mut dyn Write, s: &str) -> Result<(), StoreError> {
    write_len(w, s.len())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

fn read_u8(r: &mut dyn Read) -> Result<u8, StoreError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32_le(r: &mut dyn Read) -> Result<u32, StoreError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64_le(r: &mut dyn Read) -> Result<u64, StoreError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_f32_le(r: &mut dyn Read) -> Result<f32, StoreError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

fn read_f64_le(r: &mut dyn Read) -> Result<f64, StoreError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

fn read_str(r: &mut dyn Read) -> Result<String, StoreError> {
    let len = read_u32_le(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| StoreError::Malformed {
        detail: format!("invalid UTF-8 string: {e}"),
    })
}

fn read_vec<T>(
    r: &mut dyn Read,
    len: usize,
    mut read_one: impl FnMut(&mut dyn Read) -> Result<T, StoreError>,
) -> Result<Vec<T>, StoreError> {
    let mut out = Vec::with_capacity(len.min(1 << 16));
    for _ in 0..len {
        out.push(read_one(&mut *r)?);
    }
    Ok(out)
}

// ── Attributes ──────────────────────────────────────────────────

fn encode_attr(w: &mut dyn Write, value: &AttrValue) -> Result<(), StoreError> {
    match value {
        AttrValue::Str(s) => {
            write_u8(w, ATTR_STR)?;
            write_str(w, s)?;
        }
        AttrValue::StrArray(v) => {
            write_u8(w, ATTR_STR_ARRAY)?;
            write_len(w, v.len())?;
            for s in v {
                write_str(w, s)?;
            }
        }
        AttrValue::F32(v) => {
            write_u8(w, ATTR_F32)?;
            w.write_all(&v.to_le_bytes())?;
        }
        AttrValue::F64(v) => {
            write_u8(w, ATTR_F64)?;
            w.write_all(&v.to_le_bytes())?;
        }
        AttrValue::U32(v) => {
            write_u8(w, ATTR_U32)?;
            write_u32_le(w, *v)?;
        }
        AttrValue::U64(v) => {
            write_u8(w, ATTR_U64)?;
            write_u64_le(w, *v)?;
        }
        AttrValue::F32Array(v) => {
            write_u8(w, ATTR_F32_ARRAY)?;
            write_len(w, v.len())?;
            for x in v {
                w.write_all(&x.to_le_bytes())?;
            }
        }
        AttrValue::F64Array(v) => {
            write_u8(w, ATTR_F64_ARRAY)?;
            write_len(w, v.len())?;
            for x in v {
                w.write_all(&x.to_le_bytes())?;
            }
        }
        AttrValue::U64Array(v) => {
            write_u8(w, ATTR_U64_ARRAY)?;
            write_len(w, v.len())?;
            for x in v {
                write_u64_le(w, *x)?;
            }
        }
    }
    Ok(())
}

fn decode_attr(r: &mut dyn Read) -> Result<AttrValue, StoreError> {
    let tag = read_u8(r)?;
    Ok(match tag {
        ATTR_STR => AttrValue::Str(read_str(r)?),
        ATTR_STR_ARRAY => {
            let len = read_u32_le(r)? as usize;
            AttrValue::StrArray(read_vec(r, len, read_str)?)
        }
        ATTR_F32 => AttrValue::F32(read_f32_le(r)?),
        ATTR_F64 => AttrValue::F64(read_f64_le(r)?),
        ATTR_U32 => AttrValue::U32(read_u32_le(r)?),
        ATTR_U64 => AttrValue::U64(read_u64_le(r)?),
        ATTR_F32_ARRAY => {
            let len = read_u32_le(r)? as usize;
            AttrValue::F32Array(read_vec(r, len, read_f32_le)?)
        }
        ATTR_F64_ARRAY => {
            let len = read_u32_le(r)? as usize;
            AttrValue::F64Array(read_vec(r, len, read_f64_le)?)
        }
        ATTR_U64_ARRAY => {
            let len = read_u32_le(r)? as usize;
            AttrValue::U64Array(read_vec(r, len, read_u64_le)?)
        }
        other => {
            return Err(StoreError::Malformed {
                detail: format!("unknown attribute type tag {other}"),
            })
        }
    })
}

// ── Datasets ────────────────────────────────────────────────────

fn encode_payload(w: &mut dyn Write, data: &DataBuffer, shape: &[u64]) -> Result<(), StoreError> {
    write_u8(w, dtype_tag(data.dtype()))?;
    write_len(w, shape.len())?;
    for &dim in shape {
        write_u64_le(w, dim)?;
    }
    write_u64_le(w, data.len() as u64)?;
    match data {
        DataBuffer::F32(v) => {
            for x in v {
                w.write_all(&x.to_le_bytes())?;
            }
        }
        DataBuffer::F64(v) => {
            for x in v {
                w.write_all(&x.to_le_bytes())?;
            }
        }
        DataBuffer::U64(v) => {
            for x in v {
                write_u64_le(w, *x)?;
            }
        }
    }
    Ok(())
}

fn decode_payload(r: &mut dyn Read) -> Result<(DataBuffer, Shape), StoreError> {
    let tag = read_u8(r)?;
    let rank = read_u32_le(r)? as usize;
    let mut shape = Shape::new();
    for _ in 0..rank {
        shape.push(read_u64_le(r)?);
    }
    let len = usize::try_from(read_u64_le(r)?).map_err(|_| StoreError::Malformed {
        detail: "dataset length exceeds address space".into(),
    })?;
    let data = match tag {
        0 => DataBuffer::F32(read_vec(r, len, read_f32_le)?),
        1 => DataBuffer::F64(read_vec(r, len, read_f64_le)?),
        2 => DataBuffer::U64(read_vec(r, len, read_u64_le)?),
        other => {
            return Err(StoreError::Malformed {
                detail: format!("unknown dtype tag {other}"),
            })
        }
    };
    Ok((data, shape))
}

// ── Nodes ───────────────────────────────────────────────────────

fn encode_node(w: &mut dyn Write, store: &dyn Store, node: NodeId) -> Result<(), StoreError> {
    let kind = store.kind(node)?;
    write_u8(
        w,
        match kind {
            NodeKind::Group => NODE_GROUP,
            NodeKind::Dataset => NODE_DATASET,
        },
    )?;
    write_str(w, store.name(node)?)?;

    let attrs = store.attrs(node)?;
    write_len(w, attrs.len())?;
    for (name, value) in attrs {
        write_str(w, name)?;
        encode_attr(w, value)?;
    }

    match kind {
        NodeKind::Group => {
            let children = store.children(node)?;
            write_len(w, children.len())?;
            for child in children {
                encode_node(w, store, child)?;
            }
        }
        NodeKind::Dataset => {
            let ds = store.dataset(node)?;
            encode_payload(w, &ds.data, &ds.shape)?;
        }
    }
    Ok(())
}

fn decode_attrs(r: &mut dyn Read, tree: &mut TreeStore, node: NodeId) -> Result<(), StoreError> {
    let count = read_u32_le(r)?;
    for _ in 0..count {
        let name = read_str(r)?;
        let value = decode_attr(r)?;
        tree.set_attr(node, &name, value)?;
    }
    Ok(())
}

fn decode_children(
    r: &mut dyn Read,
    tree: &mut TreeStore,
    parent: NodeId,
) -> Result<(), StoreError> {
    let count = read_u32_le(r)?;
    for _ in 0..count {
        let kind = read_u8(r)?;
        let name = read_str(r)?;
        match kind {
            NODE_GROUP => {
                let id = tree.create_group(parent, &name)?;
                decode_attrs(r, tree, id)?;
                decode_children(r, tree, id)?;
            }
            NODE_DATASET => {
                // Attributes precede the payload on disk, but the dataset
                // node must exist before attributes can attach to it.
                let mut pending = Vec::new();
                let attr_count = read_u32_le(r)?;
                for _ in 0..attr_count {
                    let attr_name = read_str(r)?;
                    pending.push((attr_name, decode_attr(r)?));
                }
                let (data, shape) = decode_payload(r)?;
                let id = tree.create_dataset(parent, &name, data, shape)?;
                for (attr_name, value) in pending {
                    tree.set_attr(id, &attr_name, value)?;
                }
            }
            other => {
                return Err(StoreError::Malformed {
                    detail: format!("unknown node kind tag {other}"),
                })
            }
        }
    }
    Ok(())
}

// ── Container encode/decode ─────────────────────────────────────

/// Encode a whole container: header, then the root node depth-first.
pub fn write_container(w: &mut dyn Write, store: &dyn Store) -> Result<(), StoreError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    encode_node(w, store, store.root())
}

/// Decode a container written by [`write_container`].
///
/// The returned store is open; callers that only read may ignore that.
pub fn read_container(r: &mut dyn Read) -> Result<TreeStore, StoreError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(StoreError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion { found: version });
    }

    let kind = read_u8(r)?;
    let name = read_str(r)?;
    if kind != NODE_GROUP || !name.is_empty() {
        return Err(StoreError::Malformed {
            detail: "root node must be an unnamed group".into(),
        });
    }
    let mut tree = TreeStore::new();
    let root = tree.root();
    decode_attrs(r, &mut tree, root)?;
    decode_children(r, &mut tree, root)?;
    Ok(tree)
}
