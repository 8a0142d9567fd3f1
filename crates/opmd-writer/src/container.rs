//! The write session over one container.
//!
//! [`Container`] owns the backing store for the whole session. Root
//! attributes come first ([`write_root`](Container::write_root)); every
//! iteration-scoped write goes through a handle returned by
//! [`begin_iteration`](Container::begin_iteration). Mesh and particle
//! writers live in `mesh.rs`, `particle.rs` and `patches.rs` as further
//! `impl` blocks on the same type.

use indexmap::IndexMap;
use log::{debug, info};
use opmd_core::{
    ConfigError, Extension, ExtensionSet, IterationEncoding, IterationIndex, NodeId,
};
use opmd_store::{ensure_child_group, Store};

use crate::error::WriteError;
use crate::extension::{MeshesExtension, ParticleExtension};
use crate::path::resolve_path;
use crate::schema::IterationAttributes;

/// An iteration group opened by [`Container::begin_iteration`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Iteration {
    /// Iteration index.
    pub index: IterationIndex,
    /// The iteration's base-path group.
    pub node: NodeId,
}

/// The meshes group of one iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Meshes {
    /// Owning iteration.
    pub iteration: IterationIndex,
    /// The meshes group.
    pub node: NodeId,
}

/// One particle species of one iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Species {
    /// Owning iteration.
    pub iteration: IterationIndex,
    /// The species group.
    pub node: NodeId,
    /// Number of macro-particles; every per-particle array has this length.
    pub num_particles: u64,
}

/// Species-level settings for [`Container::begin_species`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeciesAttributes {
    /// Number of macro-particles in the species.
    pub num_particles: u64,
    /// Optional `comment`.
    pub comment: Option<String>,
    /// ED-PIC attributes; required to be `None` unless ED-PIC is enabled.
    pub extension: Option<ParticleExtension>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct RootState {
    pub(crate) extensions: ExtensionSet,
    pub(crate) encoding: IterationEncoding,
}

/// A single-pass, write-only session over a [`Store`].
///
/// Not reentrant and not shared: one writer owns the store from
/// construction until [`close`](Container::close).
#[derive(Debug)]
pub struct Container<S: Store> {
    pub(crate) store: S,
    pub(crate) root: Option<RootState>,
    iterations: IndexMap<IterationIndex, NodeId>,
}

impl<S: Store> Container<S> {
    /// Start a session over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            root: None,
            iterations: IndexMap::new(),
        }
    }

    /// Read access to the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// End the session, returning the store without closing it.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Iterations opened so far, in order.
    pub fn iterations(&self) -> impl Iterator<Item = IterationIndex> + '_ {
        self.iterations.keys().copied()
    }

    /// Commit the container and release the store.
    pub fn close(&mut self) -> Result<(), WriteError> {
        self.store.close()?;
        info!(
            "container closed ({} iteration{})",
            self.iterations.len(),
            if self.iterations.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    pub(crate) fn root_state(&self) -> Result<RootState, WriteError> {
        self.root.ok_or(WriteError::Config(ConfigError::RootNotWritten))
    }

    pub(crate) fn ed_pic(&self) -> Result<bool, WriteError> {
        Ok(self.root_state()?.extensions.contains(Extension::EdPic))
    }

    /// ED-PIC attributes are required exactly when the root enables the
    /// extension.
    fn check_extension(&self, what: &str, given: bool) -> Result<(), WriteError> {
        let reason = match (self.ed_pic()?, given) {
            (true, false) => format!("{what} ED-PIC attributes are required by the root"),
            (false, true) => format!("{what} ED-PIC attributes given without the extension"),
            _ => return Ok(()),
        };
        Err(ConfigError::InvalidField { reason }.into())
    }

    /// Fails with [`ConfigError::DuplicateRecord`] if `parent` already
    /// has a child called `name`.
    pub(crate) fn check_free(&self, parent: NodeId, name: &str) -> Result<(), WriteError> {
        if self.store.child(parent, name)?.is_some() {
            let mut path = self.store.path_of(parent)?;
            if !path.ends_with('/') {
                path.push('/');
            }
            path.push_str(name);
            return Err(ConfigError::DuplicateRecord { path }.into());
        }
        Ok(())
    }

    /// Create the group at `relative` (below `base`), reusing any
    /// intermediate groups; the last segment must not exist yet.
    fn create_fresh(&mut self, base: NodeId, relative: &str) -> Result<NodeId, WriteError> {
        let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
        let Some((last, parents)) = segments.split_last() else {
            return Err(ConfigError::InvalidField {
                reason: format!("path {relative:?} names no group"),
            }
            .into());
        };
        let mut parent = base;
        for segment in parents {
            parent = ensure_child_group(&mut self.store, parent, segment)?;
        }
        self.check_free(parent, last)?;
        Ok(self.store.create_group(parent, last)?)
    }

    fn root_path_attr(&self, name: &str) -> Result<String, WriteError> {
        match self.store.attr(self.store.root(), name)? {
            Some(opmd_core::AttrValue::Str(s)) => Ok(s.clone()),
            _ => Err(ConfigError::MissingAttribute {
                name: name.to_string(),
            }
            .into()),
        }
    }

    /// Create the group for `index` at the resolved base path and write
    /// its `time`, `dt` and `timeUnitSI`.
    pub fn begin_iteration(
        &mut self,
        index: IterationIndex,
        attrs: &IterationAttributes,
    ) -> Result<Iteration, WriteError> {
        let root = self.root_state()?;
        attrs.validate()?;
        if root.encoding == IterationEncoding::FileBased && !self.iterations.is_empty() {
            return Err(ConfigError::InvalidField {
                reason: "a fileBased container holds exactly one iteration".into(),
            }
            .into());
        }
        let path = resolve_path(&self.store, index)?;
        if self.iterations.contains_key(&index) {
            return Err(ConfigError::DuplicateRecord { path }.into());
        }

        let node = self.create_fresh(self.store.root(), &path)?;
        attrs.apply(&mut self.store, node)?;
        self.iterations.insert(index, node);
        info!(
            "iteration {index} opened at {path} (time={}, dt={})",
            attrs.time, attrs.dt
        );
        Ok(Iteration { index, node })
    }

    /// Create the iteration's meshes group, annotated with `extension`.
    ///
    /// `extension` must be given if and only if the root enables ED-PIC.
    pub fn meshes(
        &mut self,
        iteration: &Iteration,
        extension: Option<&MeshesExtension>,
    ) -> Result<Meshes, WriteError> {
        self.check_extension("meshes", extension.is_some())?;
        if let Some(ext) = extension {
            ext.validate()?;
        }
        let relative = self.root_path_attr("meshesPath")?;
        let node = self.create_fresh(iteration.node, &relative)?;
        if let Some(ext) = extension {
            ext.annotate(&mut self.store, node)?;
        }
        debug!("meshes group {}", self.store.path_of(node)?);
        Ok(Meshes {
            iteration: iteration.index,
            node,
        })
    }

    /// Create a species group under the iteration's particles group.
    ///
    /// `attrs.extension` must be set if and only if the root enables
    /// ED-PIC.
    pub fn begin_species(
        &mut self,
        iteration: &Iteration,
        name: &str,
        attrs: &SpeciesAttributes,
    ) -> Result<Species, WriteError> {
        self.check_extension("species", attrs.extension.is_some())?;
        if let Some(ext) = &attrs.extension {
            ext.validate()?;
        }

        let relative = self.root_path_attr("particlesPath")?;
        let mut particles = iteration.node;
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            particles = ensure_child_group(&mut self.store, particles, segment)?;
        }
        self.check_free(particles, name)?;
        let node = self.store.create_group(particles, name)?;
        if let Some(comment) = &attrs.comment {
            self.store.set_attr(node, "comment", comment.as_str().into())?;
        }
        if let Some(ext) = &attrs.extension {
            ext.annotate(&mut self.store, node)?;
        }
        debug!(
            "species {} with {} particles",
            self.store.path_of(node)?,
            attrs.num_particles
        );
        Ok(Species {
            iteration: iteration.index,
            node,
            num_particles: attrs.num_particles,
        })
    }
}
