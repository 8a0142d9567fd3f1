//! Test utilities for opmd development.
//!
//! Provides a deterministic [`DataProvider`] ([`FixtureProvider`]), a
//! store that fails after a fixed number of mutations ([`FailingStore`]),
//! and fixed configurations in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::io;

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use opmd_core::{AttrValue, DataBuffer, NodeId, Shape};
use opmd_store::{Dataset, NodeKind, Store, StoreError};
use opmd_writer::DataProvider;

/// Ramp data: every value is a closed-form function of its index, so
/// assertions can name expected values directly.
///
/// `real_field` at `(i, j)` is `i * ncols + j`; `complex_field` is
/// `(i, -j)`; `particle_values` at `k` is `k`.
#[derive(Clone, Debug, Default)]
pub struct FixtureProvider {
    /// Names requested so far, in order.
    pub requests: Vec<String>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataProvider for FixtureProvider {
    fn real_field(&mut self, name: &str, shape: (usize, usize)) -> Array2<f64> {
        self.requests.push(name.to_string());
        let ncols = shape.1;
        Array2::from_shape_fn(shape, |(i, j)| (i * ncols + j) as f64)
    }

    fn complex_field(&mut self, name: &str, shape: (usize, usize)) -> Array2<Complex64> {
        self.requests.push(name.to_string());
        Array2::from_shape_fn(shape, |(i, j)| Complex64::new(i as f64, -(j as f64)))
    }

    fn particle_values(&mut self, name: &str, len: usize) -> Array1<f64> {
        self.requests.push(name.to_string());
        Array1::from_shape_fn(len, |k| k as f64)
    }
}

/// Wraps a store and fails every mutation after the first `budget`.
///
/// The failure is an I/O error, which writers must propagate unchanged
/// as [`opmd_writer::WriteError::Store`].
#[derive(Debug)]
pub struct FailingStore<S> {
    inner: S,
    budget: usize,
    mutations: usize,
}

impl<S: Store> FailingStore<S> {
    /// Allow `budget` successful mutations, then fail.
    pub fn new(inner: S, budget: usize) -> Self {
        Self {
            inner,
            budget,
            mutations: 0,
        }
    }

    /// Mutations attempted so far, including failed ones.
    pub fn mutations(&self) -> usize {
        self.mutations
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn spend(&mut self) -> Result<(), StoreError> {
        self.mutations += 1;
        if self.mutations > self.budget {
            return Err(StoreError::Io(io::Error::other(format!(
                "injected failure at mutation {}",
                self.mutations
            ))));
        }
        Ok(())
    }
}

impl<S: Store> Store for FailingStore<S> {
    fn create_group(&mut self, parent: NodeId, name: &str) -> Result<NodeId, StoreError> {
        self.spend()?;
        self.inner.create_group(parent, name)
    }

    fn create_dataset(
        &mut self,
        parent: NodeId,
        name: &str,
        data: DataBuffer,
        shape: Shape,
    ) -> Result<NodeId, StoreError> {
        self.spend()?;
        self.inner.create_dataset(parent, name, data, shape)
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: AttrValue) -> Result<(), StoreError> {
        self.spend()?;
        self.inner.set_attr(node, name, value)
    }

    fn attr(&self, node: NodeId, name: &str) -> Result<Option<&AttrValue>, StoreError> {
        self.inner.attr(node, name)
    }

    fn attrs(&self, node: NodeId) -> Result<Vec<(&str, &AttrValue)>, StoreError> {
        self.inner.attrs(node)
    }

    fn child(&self, parent: NodeId, name: &str) -> Result<Option<NodeId>, StoreError> {
        self.inner.child(parent, name)
    }

    fn children(&self, parent: NodeId) -> Result<Vec<NodeId>, StoreError> {
        self.inner.children(parent)
    }

    fn name(&self, node: NodeId) -> Result<&str, StoreError> {
        self.inner.name(node)
    }

    fn kind(&self, node: NodeId) -> Result<NodeKind, StoreError> {
        self.inner.kind(node)
    }

    fn dataset(&self, node: NodeId) -> Result<&Dataset, StoreError> {
        self.inner.dataset(node)
    }

    fn path_of(&self, node: NodeId) -> Result<String, StoreError> {
        self.inner.path_of(node)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.inner.close()
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opmd_store::TreeStore;

    #[test]
    fn budget_then_io_error() {
        let mut s = FailingStore::new(TreeStore::new(), 1);
        let root = s.root();
        s.create_group(root, "a").unwrap();
        assert!(matches!(s.create_group(root, "b"), Err(StoreError::Io(_))));
        assert_eq!(s.mutations(), 2);
        assert_eq!(s.inner().node_count(), 2);
    }

    #[test]
    fn ramp_values() {
        let mut p = FixtureProvider::new();
        let f = p.real_field("E x", (2, 3));
        assert_eq!(f[[1, 2]], 5.0);
        assert_eq!(p.particle_values("w", 4)[3], 3.0);
        assert_eq!(p.requests, ["E x", "w"]);
    }
}
