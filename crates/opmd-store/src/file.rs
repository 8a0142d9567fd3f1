//! File-backed store, committed atomically on close.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::warn;
use opmd_core::{AttrValue, DataBuffer, NodeId, Shape};

use crate::codec::{read_container, write_container};
use crate::error::StoreError;
use crate::store::{NodeKind, Store};
use crate::tree::{Dataset, TreeStore};

/// A [`TreeStore`] that persists itself to `path` on [`close`](Store::close).
///
/// The container is encoded into a sibling `<name>.tmp` file, synced,
/// then renamed over `path`. A reader never observes a partially written
/// container; if the session fails before close, nothing is written.
#[derive(Debug)]
pub struct FileStore {
    tree: TreeStore,
    path: PathBuf,
}

impl FileStore {
    /// Start a new, empty container that will be written to `path`.
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            tree: TreeStore::new(),
            path: path.into(),
        }
    }

    /// Load an existing container. The returned store is closed:
    /// containers are write-once.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut reader = BufReader::new(File::open(&path)?);
        let mut tree = read_container(&mut reader)?;
        tree.close()?;
        Ok(Self { tree, path })
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory tree.
    pub fn tree(&self) -> &TreeStore {
        &self.tree
    }

    /// Consume the store, returning the in-memory tree.
    pub fn into_tree(self) -> TreeStore {
        self.tree
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn persist(&self) -> Result<(), StoreError> {
        let tmp = self.temp_path();
        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        let result = write_container(&mut writer, &self.tree)
            .and_then(|()| writer.flush().map_err(StoreError::from))
            .and_then(|()| writer.get_ref().sync_all().map_err(StoreError::from));
        drop(writer);
        let committed = result.and_then(|()| Ok(fs::rename(&tmp, &self.path)?));
        if let Err(e) = committed {
            discard_temp(&tmp);
            return Err(e);
        }
        Ok(())
    }
}

fn discard_temp(tmp: &Path) {
    if let Err(e) = fs::remove_file(tmp) {
        warn!("could not remove {}: {e}", tmp.display());
    }
}

impl Store for FileStore {
    fn create_group(&mut self, parent: NodeId, name: &str) -> Result<NodeId, StoreError> {
        self.tree.create_group(parent, name)
    }

    fn create_dataset(
        &mut self,
        parent: NodeId,
        name: &str,
        data: DataBuffer,
        shape: Shape,
    ) -> Result<NodeId, StoreError> {
        self.tree.create_dataset(parent, name, data, shape)
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: AttrValue) -> Result<(), StoreError> {
        self.tree.set_attr(node, name, value)
    }

    fn attr(&self, node: NodeId, name: &str) -> Result<Option<&AttrValue>, StoreError> {
        self.tree.attr(node, name)
    }

    fn attrs(&self, node: NodeId) -> Result<Vec<(&str, &AttrValue)>, StoreError> {
        self.tree.attrs(node)
    }

    fn child(&self, parent: NodeId, name: &str) -> Result<Option<NodeId>, StoreError> {
        self.tree.child(parent, name)
    }

    fn children(&self, parent: NodeId) -> Result<Vec<NodeId>, StoreError> {
        self.tree.children(parent)
    }

    fn name(&self, node: NodeId) -> Result<&str, StoreError> {
        self.tree.name(node)
    }

    fn kind(&self, node: NodeId) -> Result<NodeKind, StoreError> {
        self.tree.kind(node)
    }

    fn dataset(&self, node: NodeId) -> Result<&Dataset, StoreError> {
        self.tree.dataset(node)
    }

    fn path_of(&self, node: NodeId) -> Result<String, StoreError> {
        self.tree.path_of(node)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        if self.tree.is_closed() {
            return Ok(());
        }
        self.persist()?;
        self.tree.close()
    }

    fn is_closed(&self) -> bool {
        self.tree.is_closed()
    }
}
