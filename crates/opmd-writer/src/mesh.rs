//! Mesh record writers.
//!
//! Two layouts are supported:
//!
//! - **thetaMode** scalars: azimuthal modes packed into one `f32` dataset
//!   whose leading axis has `2·M + 1` layers (mode 0, then the real and
//!   imaginary part of each higher mode).
//! - **cartesian** 2-D vectors: one group per record, one component per
//!   axis. A component is either a variable dataset or a constant
//!   `value` + `shape` pair.
//!
//! Every input is checked before the first node is created, so a failed
//! call leaves the meshes group untouched.

use log::debug;
use ndarray::{Array3, ArrayView2, Axis};
use num_complex::Complex64;
use opmd_core::{AttrValue, ConfigError, DataBuffer, Geometry, NodeId, Shape, ShapeMismatch};
use opmd_store::Store;

use crate::container::{Container, Meshes};
use crate::error::WriteError;
use crate::schema::{MeshComponentAttributes, MeshRecordAttributes};

fn dims(view: &ArrayView2<'_, impl Sized>) -> [u64; 2] {
    let (a, b) = view.dim();
    [a as u64, b as u64]
}

/// Pack azimuthal modes into a `(2·M + 1, nr, nz)` array.
///
/// Layer 0 is `mode0`; layers `2m - 1` and `2m` are the real and
/// imaginary parts of mode `m`. Every mode must share `mode0`'s shape.
pub fn pack_azimuthal_modes(
    mode0: ArrayView2<'_, f64>,
    higher: &[ArrayView2<'_, Complex64>],
) -> Result<Array3<f32>, ShapeMismatch> {
    let expected = dims(&mode0);
    for (m, mode) in higher.iter().enumerate() {
        let found = dims(mode);
        if found != expected {
            return Err(ShapeMismatch::new(
                format!("azimuthal mode {}", m + 1),
                &expected,
                &found,
            ));
        }
    }

    let (nr, nz) = mode0.dim();
    let mut packed = Array3::<f32>::zeros((2 * higher.len() + 1, nr, nz));
    packed
        .index_axis_mut(Axis(0), 0)
        .assign(&mode0.mapv(|v| v as f32));
    for (m, mode) in higher.iter().enumerate() {
        packed
            .index_axis_mut(Axis(0), 2 * m + 1)
            .assign(&mode.mapv(|c| c.re as f32));
        packed
            .index_axis_mut(Axis(0), 2 * m + 2)
            .assign(&mode.mapv(|c| c.im as f32));
    }
    Ok(packed)
}

/// `geometryParameters` for a thetaMode record with modes up to `max_mode`.
pub fn theta_mode_parameters(max_mode: usize) -> String {
    format!("m={max_mode}; imag=+")
}

/// Data of one Cartesian component.
#[derive(Clone, Debug)]
pub enum ComponentData<'a> {
    /// Per-cell values.
    Variable(ArrayView2<'a, f64>),
    /// The same value in every cell, stored as a constant component.
    Uniform(f64),
}

/// One axis component of a Cartesian vector record.
#[derive(Clone, Debug)]
pub struct CartesianComponent<'a> {
    /// Component name (`x`, `y`, `z`).
    pub name: &'a str,
    /// Values.
    pub data: ComponentData<'a>,
    /// Staggering and unit scale.
    pub attrs: MeshComponentAttributes,
}

fn check_component_names<'a>(
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen: Vec<&str> = Vec::new();
    for name in names {
        if name.is_empty() || name.contains('/') {
            return Err(ConfigError::InvalidField {
                reason: format!("component name {name:?} must be non-empty without '/'"),
            });
        }
        if seen.contains(&name) {
            return Err(ConfigError::InvalidField {
                reason: format!("component {name:?} given twice"),
            });
        }
        seen.push(name);
    }
    if seen.is_empty() {
        return Err(ConfigError::InvalidField {
            reason: "a vector record needs at least one component".into(),
        });
    }
    Ok(())
}

impl<S: Store> Container<S> {
    /// Write a thetaMode scalar record with modes 0 and 1.
    pub fn write_cylindrical_scalar(
        &mut self,
        meshes: &Meshes,
        name: &str,
        mode0: ArrayView2<'_, f64>,
        mode1: ArrayView2<'_, Complex64>,
        record: &MeshRecordAttributes,
        component: &MeshComponentAttributes,
    ) -> Result<NodeId, WriteError> {
        let ed_pic = self.ed_pic()?;
        self.check_free(meshes.node, name)?;
        record.validate(2)?;
        component.validate(2)?;
        let packed = pack_azimuthal_modes(mode0, &[mode1])?;

        let dims: Vec<u64> = packed.shape().iter().map(|&d| d as u64).collect();
        let shape = Shape::from_slice(&dims);
        let data = DataBuffer::F32(packed.iter().copied().collect());
        let node = self.store.create_dataset(meshes.node, name, data, shape)?;
        self.store.set_attr(node, "geometry", Geometry::ThetaMode.name().into())?;
        self.store
            .set_attr(node, "geometryParameters", theta_mode_parameters(1).into())?;
        record.apply(&mut self.store, node, ed_pic)?;
        component.apply(&mut self.store, node)?;
        debug!(
            "mesh {} thetaMode {:?}",
            self.store.path_of(node)?,
            packed.shape()
        );
        Ok(node)
    }

    /// Write a 2-D Cartesian vector record.
    ///
    /// Variable components must all share one shape; uniform components
    /// declare that shape. When every component is uniform the shape is
    /// taken from `uniform_shape`, which is required in that case.
    pub fn write_cartesian_vector(
        &mut self,
        meshes: &Meshes,
        name: &str,
        record: &MeshRecordAttributes,
        components: &[CartesianComponent<'_>],
        uniform_shape: Option<&[u64]>,
    ) -> Result<NodeId, WriteError> {
        let ed_pic = self.ed_pic()?;
        self.check_free(meshes.node, name)?;
        record.validate(2)?;
        check_component_names(components.iter().map(|c| c.name))?;

        let mut shape: Option<[u64; 2]> = None;
        for c in components {
            c.attrs.validate(2)?;
            match &c.data {
                ComponentData::Variable(view) => {
                    let found = dims(view);
                    match shape {
                        Some(expected) if expected != found => {
                            return Err(ShapeMismatch::new(
                                format!("{name}/{}", c.name),
                                &expected,
                                &found,
                            )
                            .into());
                        }
                        _ => shape = Some(found),
                    }
                }
                ComponentData::Uniform(v) if !v.is_finite() => {
                    return Err(ConfigError::InvalidField {
                        reason: format!("uniform {name}/{} value must be finite", c.name),
                    }
                    .into());
                }
                ComponentData::Uniform(_) => {}
            }
        }
        let shape: Vec<u64> = match (shape, uniform_shape) {
            (Some(found), Some(declared)) if declared != found.as_slice() => {
                let what = format!("{name} uniform shape");
                return Err(ShapeMismatch::new(what, &found, declared).into());
            }
            (Some(found), _) => found.to_vec(),
            (None, Some(declared)) if declared.len() == 2 => declared.to_vec(),
            (None, Some(declared)) => {
                return Err(ConfigError::InvalidField {
                    reason: format!("{name} uniform shape {declared:?} is not 2-D"),
                }
                .into());
            }
            (None, None) => {
                return Err(ConfigError::InvalidField {
                    reason: format!("{name} has only uniform components and no declared shape"),
                }
                .into());
            }
        };

        let group = self.store.create_group(meshes.node, name)?;
        self.store.set_attr(group, "geometry", Geometry::Cartesian.name().into())?;
        record.apply(&mut self.store, group, ed_pic)?;
        for c in components {
            let node = match &c.data {
                ComponentData::Variable(view) => self.store.create_dataset(
                    group,
                    c.name,
                    DataBuffer::F32(view.iter().map(|&v| v as f32).collect()),
                    Shape::from_slice(&shape),
                )?,
                ComponentData::Uniform(value) => {
                    let node = self.store.create_group(group, c.name)?;
                    self.store.set_attr(node, "value", AttrValue::F64(*value))?;
                    self.store
                        .set_attr(node, "shape", AttrValue::U64Array(shape.clone()))?;
                    node
                }
            };
            c.attrs.apply(&mut self.store, node)?;
        }
        debug!(
            "mesh {} cartesian {:?} ({} components)",
            self.store.path_of(group)?,
            shape,
            components.len()
        );
        Ok(group)
    }
}
