//! Strongly-typed identifiers and the [`Shape`] type alias.

use smallvec::SmallVec;
use std::fmt;

/// Identifies a node (group or dataset) inside a container tree.
///
/// Nodes are allocated sequentially by the store; `NodeId(0)` is always
/// the root group. Identifiers are stable for the lifetime of the store
/// and are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root group of every container.
    pub const ROOT: NodeId = NodeId(0);

    /// The identifier as an arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Index of an output iteration (simulation step number).
///
/// Substituted for the `%T` placeholder of the `basePath` template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IterationIndex(pub u64);

impl fmt::Display for IterationIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for IterationIndex {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Logical extent of a dataset or constant record component.
///
/// Uses `SmallVec<[u64; 4]>` to avoid heap allocation for shapes up to
/// four dimensions, which covers every layout this crate writes
/// (1-D particle arrays, 2-D Cartesian meshes, 3-D packed thetaMode).
pub type Shape = SmallVec<[u64; 4]>;

/// Number of elements described by a shape (`1` for a 0-D shape).
pub fn element_count(shape: &[u64]) -> Option<u64> {
    shape.iter().try_fold(1u64, |acc, &d| acc.checked_mul(d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn root_is_zero() {
        assert_eq!(NodeId::ROOT, NodeId(0));
        assert_eq!(NodeId::ROOT.index(), 0);
    }

    #[test]
    fn element_count_multiplies_axes() {
        let shape: Shape = smallvec![3, 32, 64];
        assert_eq!(element_count(&shape), Some(3 * 32 * 64));
        assert_eq!(element_count(&[]), Some(1));
        assert_eq!(element_count(&[u64::MAX, 2]), None);
    }

    #[test]
    fn iteration_index_displays_decimal() {
        assert_eq!(IterationIndex(42).to_string(), "42");
    }
}
