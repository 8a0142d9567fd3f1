//! Core types for building openPMD containers.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the store and the writers: node identifiers,
//! shapes, typed attribute values, the closed schema enumerations, the
//! SI unit system, and the configuration/shape error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod attr;
pub mod error;
pub mod extension;
pub mod id;
pub mod schema;
pub mod units;

pub use attr::{AttrValue, DataBuffer, Dtype};
pub use error::{ConfigError, ShapeMismatch};
pub use extension::{Extension, ExtensionSet};
pub use id::{IterationIndex, NodeId, Shape};
pub use schema::{
    ChargeCorrection, CurrentDeposition, DataOrder, FieldBoundary, FieldSolver, Geometry,
    IterationEncoding, ParticleBoundary, ParticleInterpolation, ParticlePush, Smoothing,
};
pub use units::{Quantity, UnitDimension};
