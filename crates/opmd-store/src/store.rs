//! The [`Store`] trait and path helpers.

use opmd_core::{AttrValue, DataBuffer, NodeId, Shape};

use crate::error::StoreError;
use crate::tree::Dataset;

/// What a node is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A group: holds children and attributes.
    Group,
    /// A dataset: holds a typed payload, a shape and attributes.
    Dataset,
}

/// A hierarchical key/value and binary-blob store.
///
/// Nodes are addressed by [`NodeId`]; `/`-separated path strings exist
/// only at the boundary ([`path_of`](Store::path_of),
/// [`ensure_group_path`]). Namespacing is strict: a name is bound at
/// most once per parent, and an attribute at most once per node.
///
/// After [`close`](Store::close) every mutating call fails with
/// [`StoreError::Closed`]; reads keep working.
pub trait Store {
    /// The root group.
    fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Create an empty child group.
    fn create_group(&mut self, parent: NodeId, name: &str) -> Result<NodeId, StoreError>;

    /// Create a dataset holding `data` with logical extent `shape`.
    ///
    /// The product of `shape` must equal `data.len()`.
    fn create_dataset(
        &mut self,
        parent: NodeId,
        name: &str,
        data: DataBuffer,
        shape: Shape,
    ) -> Result<NodeId, StoreError>;

    /// Attach an attribute to a group or dataset.
    fn set_attr(&mut self, node: NodeId, name: &str, value: AttrValue) -> Result<(), StoreError>;

    /// Look up an attribute.
    fn attr(&self, node: NodeId, name: &str) -> Result<Option<&AttrValue>, StoreError>;

    /// All attributes of a node, in insertion order.
    fn attrs(&self, node: NodeId) -> Result<Vec<(&str, &AttrValue)>, StoreError>;

    /// Look up a child of a group by name.
    fn child(&self, parent: NodeId, name: &str) -> Result<Option<NodeId>, StoreError>;

    /// Children of a group, in creation order. Datasets have none.
    fn children(&self, parent: NodeId) -> Result<Vec<NodeId>, StoreError>;

    /// The node's own name (empty for the root).
    fn name(&self, node: NodeId) -> Result<&str, StoreError>;

    /// Whether the node is a group or a dataset.
    fn kind(&self, node: NodeId) -> Result<NodeKind, StoreError>;

    /// Payload and shape of a dataset.
    fn dataset(&self, node: NodeId) -> Result<&Dataset, StoreError>;

    /// Absolute `/`-separated path of a node; `/` for the root.
    fn path_of(&self, node: NodeId) -> Result<String, StoreError>;

    /// Commit and release the store. Idempotent.
    fn close(&mut self) -> Result<(), StoreError>;

    /// Whether [`close`](Store::close) has completed.
    fn is_closed(&self) -> bool;
}

/// Returns the existing child group `name` of `parent`, creating it if absent.
pub fn ensure_child_group<S: Store + ?Sized>(
    store: &mut S,
    parent: NodeId,
    name: &str,
) -> Result<NodeId, StoreError> {
    match store.child(parent, name)? {
        Some(id) => match store.kind(id)? {
            NodeKind::Group => Ok(id),
            NodeKind::Dataset => Err(StoreError::NotAGroup {
                path: store.path_of(id)?,
            }),
        },
        None => store.create_group(parent, name),
    }
}

/// Walks a `/`-separated absolute or relative path from the root,
/// creating each missing group. Empty segments are skipped, so
/// `"/data/0/"` and `"data/0"` address the same group.
pub fn ensure_group_path<S: Store + ?Sized>(
    store: &mut S,
    path: &str,
) -> Result<NodeId, StoreError> {
    let mut node = store.root();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        node = ensure_child_group(store, node, segment)?;
    }
    Ok(node)
}

/// Validates a node or attribute name.
pub(crate) fn check_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name.contains('/') {
        return Err(StoreError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}
