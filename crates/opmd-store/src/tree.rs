//! In-memory arena implementation of [`Store`].

use indexmap::IndexMap;
use opmd_core::id::element_count;
use opmd_core::{AttrValue, DataBuffer, NodeId, Shape};

use crate::error::StoreError;
use crate::store::{check_name, NodeKind, Store};

/// Payload of a dataset node.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    /// Element data, row-major.
    pub data: DataBuffer,
    /// Logical extent; its product equals `data.len()`.
    pub shape: Shape,
}

#[derive(Clone, Debug)]
enum Body {
    Group { children: IndexMap<String, NodeId> },
    Dataset(Dataset),
}

#[derive(Clone, Debug)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    attrs: IndexMap<String, AttrValue>,
    body: Body,
}

/// Arena of nodes addressed by [`NodeId`].
///
/// Node 0 is the root group. Identifiers are allocated sequentially and
/// never reused; nothing is ever removed from the arena.
#[derive(Clone, Debug)]
pub struct TreeStore {
    nodes: Vec<Node>,
    closed: bool,
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeStore {
    /// An empty store holding only the root group.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                parent: None,
                attrs: IndexMap::new(),
                body: Body::Group {
                    children: IndexMap::new(),
                },
            }],
            closed: false,
        }
    }

    /// Total number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolve an absolute path to a node without creating anything.
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        let mut node = NodeId::ROOT;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            node = self.child(node, segment).ok().flatten()?;
        }
        Some(node)
    }

    fn node(&self, id: NodeId) -> Result<&Node, StoreError> {
        self.nodes.get(id.index()).ok_or(StoreError::UnknownNode { id })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, StoreError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(StoreError::UnknownNode { id })
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn child_path(&self, parent: NodeId, name: &str) -> Result<String, StoreError> {
        let mut path = self.path_of(parent)?;
        if !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(name);
        Ok(path)
    }

    /// Checks that `name` is free under `parent` and returns the id the
    /// new child will receive.
    fn reserve_child(&self, parent: NodeId, name: &str) -> Result<NodeId, StoreError> {
        self.ensure_open()?;
        check_name(name)?;
        match &self.node(parent)?.body {
            Body::Group { children } => {
                if children.contains_key(name) {
                    return Err(StoreError::NameCollision {
                        path: self.child_path(parent, name)?,
                    });
                }
            }
            Body::Dataset(_) => {
                return Err(StoreError::NotAGroup {
                    path: self.path_of(parent)?,
                })
            }
        }
        let next = u32::try_from(self.nodes.len()).map_err(|_| StoreError::Malformed {
            detail: "node arena exhausted".into(),
        })?;
        Ok(NodeId(next))
    }

    fn push_child(&mut self, parent: NodeId, id: NodeId, name: &str, body: Body) {
        self.nodes.push(Node {
            name: name.to_string(),
            parent: Some(parent),
            attrs: IndexMap::new(),
            body,
        });
        if let Some(Node {
            body: Body::Group { children },
            ..
        }) = self.nodes.get_mut(parent.index())
        {
            children.insert(name.to_string(), id);
        }
    }
}

impl Store for TreeStore {
    fn create_group(&mut self, parent: NodeId, name: &str) -> Result<NodeId, StoreError> {
        let id = self.reserve_child(parent, name)?;
        self.push_child(
            parent,
            id,
            name,
            Body::Group {
                children: IndexMap::new(),
            },
        );
        Ok(id)
    }

    fn create_dataset(
        &mut self,
        parent: NodeId,
        name: &str,
        data: DataBuffer,
        shape: Shape,
    ) -> Result<NodeId, StoreError> {
        let id = self.reserve_child(parent, name)?;
        let expected = element_count(&shape).ok_or_else(|| StoreError::Malformed {
            detail: format!("shape {:?} overflows u64", shape.as_slice()),
        })?;
        let found = data.len() as u64;
        if expected != found {
            return Err(StoreError::PayloadLength {
                path: self.child_path(parent, name)?,
                expected,
                found,
            });
        }
        self.push_child(parent, id, name, Body::Dataset(Dataset { data, shape }));
        Ok(id)
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: AttrValue) -> Result<(), StoreError> {
        self.ensure_open()?;
        check_name(name)?;
        if self.node(node)?.attrs.contains_key(name) {
            return Err(StoreError::AttributeCollision {
                path: self.path_of(node)?,
                name: name.to_string(),
            });
        }
        self.node_mut(node)?.attrs.insert(name.to_string(), value);
        Ok(())
    }

    fn attr(&self, node: NodeId, name: &str) -> Result<Option<&AttrValue>, StoreError> {
        Ok(self.node(node)?.attrs.get(name))
    }

    fn attrs(&self, node: NodeId) -> Result<Vec<(&str, &AttrValue)>, StoreError> {
        Ok(self
            .node(node)?
            .attrs
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect())
    }

    fn child(&self, parent: NodeId, name: &str) -> Result<Option<NodeId>, StoreError> {
        match &self.node(parent)?.body {
            Body::Group { children } => Ok(children.get(name).copied()),
            Body::Dataset(_) => Ok(None),
        }
    }

    fn children(&self, parent: NodeId) -> Result<Vec<NodeId>, StoreError> {
        match &self.node(parent)?.body {
            Body::Group { children } => Ok(children.values().copied().collect()),
            Body::Dataset(_) => Ok(Vec::new()),
        }
    }

    fn name(&self, node: NodeId) -> Result<&str, StoreError> {
        Ok(&self.node(node)?.name)
    }

    fn kind(&self, node: NodeId) -> Result<NodeKind, StoreError> {
        Ok(match self.node(node)?.body {
            Body::Group { .. } => NodeKind::Group,
            Body::Dataset(_) => NodeKind::Dataset,
        })
    }

    fn dataset(&self, node: NodeId) -> Result<&Dataset, StoreError> {
        match &self.node(node)?.body {
            Body::Dataset(ds) => Ok(ds),
            Body::Group { .. } => Err(StoreError::NotADataset {
                path: self.path_of(node)?,
            }),
        }
    }

    fn path_of(&self, node: NodeId) -> Result<String, StoreError> {
        let mut segments = Vec::new();
        let mut cursor = self.node(node)?;
        while let Some(parent) = cursor.parent {
            segments.push(cursor.name.as_str());
            cursor = self.node(parent)?;
        }
        if segments.is_empty() {
            return Ok("/".to_string());
        }
        let mut path = String::new();
        for segment in segments.iter().rev() {
            path.push('/');
            path.push_str(segment);
        }
        Ok(path)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
