//! Typed attribute values and dataset payloads.
//!
//! Every numeric attribute carries its bit width in the variant: 64-bit
//! floats for physical and unit values, 32-bit floats for grid and array
//! payloads, unsigned 64-bit for counts and shapes, unsigned 32-bit for
//! boolean-like flags and extension bitmasks. No implicit coercion
//! happens between variants.

use std::fmt;

/// A typed attribute value attached to a group or dataset.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    /// UTF-8 string.
    Str(String),
    /// Array of UTF-8 strings (e.g. `axisLabels`).
    StrArray(Vec<String>),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// Unsigned 32-bit integer (flags, bitmasks).
    U32(u32),
    /// Unsigned 64-bit integer (counts).
    U64(u64),
    /// Array of 32-bit floats (grid spacing, staggered positions).
    F32Array(Vec<f32>),
    /// Array of 64-bit floats (`unitDimension`).
    F64Array(Vec<f64>),
    /// Array of unsigned 64-bit integers (`shape`).
    U64Array(Vec<u64>),
}

impl AttrValue {
    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::StrArray(_) => "string[]",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32Array(_) => "f32[]",
            Self::F64Array(_) => "f64[]",
            Self::U64Array(_) => "u64[]",
        }
    }

    /// The string payload, if this is a [`AttrValue::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The float payload, if this is a [`AttrValue::F64`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s:?}"),
            Self::StrArray(v) => write!(f, "{v:?}"),
            Self::F32(v) => write!(f, "{v}f32"),
            Self::F64(v) => write!(f, "{v}f64"),
            Self::U32(v) => write!(f, "{v}u32"),
            Self::U64(v) => write!(f, "{v}u64"),
            Self::F32Array(v) => write!(f, "{v:?}"),
            Self::F64Array(v) => write!(f, "{v:?}"),
            Self::U64Array(v) => write!(f, "{v:?}"),
        }
    }
}

/// Element type of a dataset payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dtype {
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// Unsigned 64-bit integer.
    U64,
}

impl Dtype {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::F32 => 4,
            Self::F64 | Self::U64 => 8,
        }
    }
}

/// Owned element data of a dataset.
///
/// Caller arrays are copied into a `DataBuffer` at write time; the store
/// never borrows caller memory past the call that created the dataset.
#[derive(Clone, Debug, PartialEq)]
pub enum DataBuffer {
    /// 32-bit float elements.
    F32(Vec<f32>),
    /// 64-bit float elements.
    F64(Vec<f64>),
    /// Unsigned 64-bit integer elements.
    U64(Vec<u64>),
}

impl DataBuffer {
    /// Element type of the buffer.
    pub fn dtype(&self) -> Dtype {
        match self {
            Self::F32(_) => Dtype::F32,
            Self::F64(_) => Dtype::F64,
            Self::U64(_) => Dtype::U64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::U64(v) => v.len(),
        }
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `f32` elements, if this is an [`DataBuffer::F32`] buffer.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            Self::F32(v) => Some(v),
            _ => None,
        }
    }

    /// The `u64` elements, if this is an [`DataBuffer::U64`] buffer.
    pub fn as_u64(&self) -> Option<&[u64]> {
        match self {
            Self::U64(v) => Some(v),
            _ => None,
        }
    }
}
