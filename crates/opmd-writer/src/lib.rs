//! openPMD schema construction for particle-in-cell output.
//!
//! A [`Container`] wraps one exclusively-owned [`Store`](opmd_store::Store)
//! and walks it through a single write session:
//!
//! 1. [`Container::write_root`] once, from a validated [`RootConfig`].
//! 2. [`Container::begin_iteration`] per iteration, at the resolved
//!    `basePath`.
//! 3. Mesh records under [`Container::meshes`] and particle species under
//!    [`Container::begin_species`].
//! 4. [`Container::close`].
//!
//! Inputs are validated before the first node of a record is created;
//! errors from the store itself are propagated unchanged.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod container;
pub mod error;
pub mod extension;
pub mod mesh;
pub mod particle;
pub mod patches;
pub mod path;
pub mod provider;
mod root;
pub mod sample;
pub mod schema;

#[cfg(test)]
mod test_support;

pub use config::{Provenance, RootConfig, RootConfigBuilder, SoftwareDependency};
pub use container::{Container, Iteration, Meshes, Species, SpeciesAttributes};
pub use error::WriteError;
pub use extension::{MeshesExtension, ParticleExtension};
pub use mesh::{pack_azimuthal_modes, CartesianComponent, ComponentData};
pub use particle::{AxisData, ParticleComponent};
pub use patches::{PatchLayout, PatchTable};
pub use path::{resolve_meshes_path, resolve_particles_path, resolve_path};
pub use provider::{DataProvider, SeededProvider};
pub use schema::{
    IterationAttributes, MeshComponentAttributes, MeshRecordAttributes, ParticleRecordAttributes,
};
