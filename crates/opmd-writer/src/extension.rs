//! ED-PIC extension attributes.
//!
//! The extension asks for numerical-scheme names on three node kinds:
//! the meshes group ([`MeshesExtension`]), every mesh record (a
//! `fieldSmoothing` choice, carried by
//! [`MeshRecordAttributes`](crate::schema::MeshRecordAttributes)), and
//! every species ([`ParticleExtension`]).

use opmd_core::{
    AttrValue, ChargeCorrection, ConfigError, CurrentDeposition, FieldBoundary, FieldSolver,
    NodeId, ParticleBoundary, ParticleInterpolation, ParticlePush, Smoothing,
};
use opmd_store::{Store, StoreError};

use crate::schema::apply_smoothing;

/// Attributes on the meshes group of each iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshesExtension {
    /// `fieldSolver`.
    pub field_solver: FieldSolver,
    /// `fieldBoundary`: lower and upper boundary per spatial axis.
    pub field_boundary: Vec<FieldBoundary>,
    /// `particleBoundary`: lower and upper boundary per spatial axis.
    pub particle_boundary: Vec<ParticleBoundary>,
    /// `currentSmoothing`.
    pub current_smoothing: Smoothing,
    /// `chargeCorrection`.
    pub charge_correction: ChargeCorrection,
}

impl MeshesExtension {
    /// Boundary lists are non-empty, even in length, and equally long.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let nf = self.field_boundary.len();
        let np = self.particle_boundary.len();
        if nf == 0 || nf % 2 != 0 || nf != np {
            return Err(ConfigError::InvalidField {
                reason: format!(
                    "fieldBoundary ({nf}) and particleBoundary ({np}) need two entries per axis"
                ),
            });
        }
        Ok(())
    }

    /// Write the attributes onto the meshes group.
    pub fn annotate<S: Store + ?Sized>(
        &self,
        store: &mut S,
        node: NodeId,
    ) -> Result<(), StoreError> {
        store.set_attr(node, "fieldSolver", self.field_solver.name().into())?;
        store.set_attr(
            node,
            "fieldBoundary",
            AttrValue::StrArray(self.field_boundary.iter().map(|b| b.name().to_string()).collect()),
        )?;
        store.set_attr(
            node,
            "particleBoundary",
            AttrValue::StrArray(
                self.particle_boundary
                    .iter()
                    .map(|b| b.name().to_string())
                    .collect(),
            ),
        )?;
        apply_smoothing(store, node, "currentSmoothing", &self.current_smoothing)?;
        store.set_attr(node, "chargeCorrection", self.charge_correction.name().into())
    }
}

/// Attributes on each particle species.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleExtension {
    /// `particleShape`: order of the shape function (e.g. 3 for cubic).
    pub particle_shape: f64,
    /// `currentDeposition`.
    pub current_deposition: CurrentDeposition,
    /// `particlePush`.
    pub particle_push: ParticlePush,
    /// `particleInterpolation`.
    pub particle_interpolation: ParticleInterpolation,
    /// `particleSmoothing`.
    pub particle_smoothing: Smoothing,
}

impl Default for ParticleExtension {
    fn default() -> Self {
        Self {
            particle_shape: 3.0,
            current_deposition: CurrentDeposition::Esirkepov,
            particle_push: ParticlePush::Boris,
            particle_interpolation: ParticleInterpolation::Uniform,
            particle_smoothing: Smoothing::None,
        }
    }
}

impl ParticleExtension {
    /// `particleShape` is finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.particle_shape.is_finite() && self.particle_shape >= 0.0) {
            return Err(ConfigError::InvalidField {
                reason: format!(
                    "particleShape must be a non-negative order, got {}",
                    self.particle_shape
                ),
            });
        }
        Ok(())
    }

    /// Write the attributes onto a species group.
    pub fn annotate<S: Store + ?Sized>(
        &self,
        store: &mut S,
        node: NodeId,
    ) -> Result<(), StoreError> {
        store.set_attr(node, "particleShape", AttrValue::F64(self.particle_shape))?;
        store.set_attr(node, "currentDeposition", self.current_deposition.name().into())?;
        store.set_attr(node, "particlePush", self.particle_push.name().into())?;
        store.set_attr(
            node,
            "particleInterpolation",
            self.particle_interpolation.name().into(),
        )?;
        apply_smoothing(store, node, "particleSmoothing", &self.particle_smoothing)
    }
}
