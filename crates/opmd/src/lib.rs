//! opmd: an openPMD container writer for particle-in-cell output.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all opmd sub-crates. For most users, adding `opmd` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use opmd::prelude::*;
//!
//! let mut container = Container::new(TreeStore::new());
//! container.write_root(&RootConfig::default()).unwrap();
//!
//! let it = container
//!     .begin_iteration(IterationIndex(0), &IterationAttributes::femtoseconds(0.0, 0.5))
//!     .unwrap();
//! let meshes = container.meshes(&it, None).unwrap();
//!
//! // A uniform 2-D field: constant components, no payload.
//! let record = MeshRecordAttributes::unit_grid(&["x", "y"], Quantity::MagneticField.unit_dimension());
//! let component = |name| CartesianComponent {
//!     name,
//!     data: ComponentData::Uniform(0.0),
//!     attrs: MeshComponentAttributes::new(&[0.0, 0.0], 1.0),
//! };
//! container
//!     .write_cartesian_vector(&meshes, "B", &record, &[component("x"), component("y")], Some(&[32, 64]))
//!     .unwrap();
//!
//! let species = container
//!     .begin_species(&it, "electrons", &SpeciesAttributes { num_particles: 128, ..Default::default() })
//!     .unwrap();
//! container
//!     .write_constant_scalar(
//!         &species,
//!         "charge",
//!         -1.0,
//!         &[128],
//!         Quantity::Charge.default_unit_si(),
//!         &ParticleRecordAttributes::new(Quantity::Charge.unit_dimension(), false, 1.0),
//!     )
//!     .unwrap();
//! container.close().unwrap();
//!
//! let store = container.into_store();
//! assert!(store.lookup("/data/0/meshes/B/y").is_some());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `opmd-core` | IDs, attribute values, enumerations, units, errors |
//! | [`store`] | `opmd-store` | Store trait, in-memory tree, file persistence, codec |
//! | [`writer`] | `opmd-writer` | Root metadata, meshes, particles, patches, sample |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`opmd-core`).
///
/// Attribute values, closed enumerations such as [`types::Geometry`],
/// the unit system ([`types::UnitDimension`], [`types::Quantity`]) and
/// the shared error types.
pub use opmd_core as types;

/// Hierarchical store (`opmd-store`).
///
/// The [`store::Store`] trait, the in-memory [`store::TreeStore`], and
/// [`store::FileStore`], which persists the tree atomically on close.
pub use opmd_store as store;

/// Schema construction (`opmd-writer`).
///
/// [`writer::Container`] and its record writers, plus the reference
/// snapshot in [`writer::sample`].
pub use opmd_writer as writer;

/// Common imports for typical opmd usage.
///
/// ```rust
/// use opmd::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use opmd_core::{
        AttrValue, Extension, IterationEncoding, IterationIndex, NodeId, Quantity, Smoothing,
        UnitDimension,
    };

    // Errors
    pub use opmd_core::{ConfigError, ShapeMismatch};
    pub use opmd_store::StoreError;
    pub use opmd_writer::WriteError;

    // Store
    pub use opmd_store::{FileStore, Store, TreeStore};

    // Writer
    pub use opmd_writer::{
        AxisData, CartesianComponent, ComponentData, Container, DataProvider, IterationAttributes,
        MeshComponentAttributes, MeshRecordAttributes, MeshesExtension, ParticleComponent,
        ParticleExtension, ParticleRecordAttributes, PatchLayout, RootConfig, SeededProvider,
        SpeciesAttributes,
    };
}
