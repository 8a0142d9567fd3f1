//! Particle record writers.

use log::debug;
use ndarray::ArrayView1;
use opmd_core::{AttrValue, ConfigError, DataBuffer, NodeId, Shape, ShapeMismatch};
use opmd_store::Store;

use crate::container::{Container, Species};
use crate::error::WriteError;
use crate::schema::{validate_unit_si, ParticleRecordAttributes};

/// Data of one particle-vector axis.
#[derive(Clone, Debug)]
pub enum AxisData<'a> {
    /// One value per particle.
    Variable(ArrayView1<'a, f64>),
    /// The same value for every particle.
    Constant {
        /// The value.
        value: f32,
        /// Declared shape; `None` means `[num_particles]`.
        shape: Option<&'a [u64]>,
    },
}

/// One axis component of a per-particle vector record.
#[derive(Clone, Debug)]
pub struct ParticleComponent<'a> {
    /// Component name (`x`, `y`, `z`).
    pub name: &'a str,
    /// Values.
    pub data: AxisData<'a>,
    /// `unitSI` of this axis.
    pub unit_si: f64,
}

impl<'a> ParticleComponent<'a> {
    /// A variable component.
    pub fn variable(name: &'a str, values: ArrayView1<'a, f64>, unit_si: f64) -> Self {
        Self {
            name,
            data: AxisData::Variable(values),
            unit_si,
        }
    }

    /// A constant component over the species' particle count.
    pub fn constant(name: &'a str, value: f32, unit_si: f64) -> Self {
        Self {
            name,
            data: AxisData::Constant { value, shape: None },
            unit_si,
        }
    }

    /// A constant component with an explicit declared shape.
    pub fn constant_shaped(name: &'a str, value: f32, shape: &'a [u64], unit_si: f64) -> Self {
        Self {
            name,
            data: AxisData::Constant {
                value,
                shape: Some(shape),
            },
            unit_si,
        }
    }
}

fn f32_payload(values: ArrayView1<'_, f64>) -> DataBuffer {
    DataBuffer::F32(values.iter().map(|&v| v as f32).collect())
}

impl<S: Store> Container<S> {
    fn check_length(&self, species: &Species, what: &str, len: usize) -> Result<(), WriteError> {
        if len as u64 != species.num_particles {
            return Err(ShapeMismatch::new(what, &[species.num_particles], &[len as u64]).into());
        }
        Ok(())
    }

    /// Write a constant, species-wide scalar such as `charge` or `mass`.
    ///
    /// `shape` must describe exactly the species' particle count.
    pub fn write_constant_scalar(
        &mut self,
        species: &Species,
        name: &str,
        value: f64,
        shape: &[u64],
        unit_si: f64,
        attrs: &ParticleRecordAttributes,
    ) -> Result<NodeId, WriteError> {
        self.check_free(species.node, name)?;
        if opmd_core::id::element_count(shape) != Some(species.num_particles) {
            return Err(ShapeMismatch::new(name, &[species.num_particles], shape).into());
        }
        if !value.is_finite() {
            return Err(ConfigError::InvalidField {
                reason: format!("constant {name} value must be finite, got {value}"),
            }
            .into());
        }
        validate_unit_si(unit_si)?;
        attrs.validate()?;

        let node = self.store.create_group(species.node, name)?;
        self.store.set_attr(node, "value", AttrValue::F64(value))?;
        self.store
            .set_attr(node, "shape", AttrValue::U64Array(shape.to_vec()))?;
        attrs.apply(&mut self.store, node)?;
        self.store.set_attr(node, "unitSI", AttrValue::F64(unit_si))?;
        debug!("constant record {} = {value}", self.store.path_of(node)?);
        Ok(node)
    }

    /// Write a variable per-particle scalar such as `weighting`.
    pub fn write_scalar_record(
        &mut self,
        species: &Species,
        name: &str,
        values: ArrayView1<'_, f64>,
        unit_si: f64,
        attrs: &ParticleRecordAttributes,
    ) -> Result<NodeId, WriteError> {
        self.check_free(species.node, name)?;
        self.check_length(species, name, values.len())?;
        validate_unit_si(unit_si)?;
        attrs.validate()?;

        let node = self.store.create_dataset(
            species.node,
            name,
            f32_payload(values),
            Shape::from_slice(&[species.num_particles]),
        )?;
        attrs.apply(&mut self.store, node)?;
        self.store.set_attr(node, "unitSI", AttrValue::F64(unit_si))?;
        debug!("scalar record {}", self.store.path_of(node)?);
        Ok(node)
    }

    /// Write a per-particle vector record (`position`, `momentum`,
    /// `positionOffset`). Each axis is either variable, with one value per
    /// particle, or constant.
    ///
    /// A constant axis may declare its shape. Every axis must end up with
    /// the same shape, covering exactly the species' particle count.
    pub fn write_vector_record(
        &mut self,
        species: &Species,
        name: &str,
        components: &[ParticleComponent<'_>],
        attrs: &ParticleRecordAttributes,
    ) -> Result<NodeId, WriteError> {
        self.check_free(species.node, name)?;
        if components.is_empty() {
            return Err(ConfigError::InvalidField {
                reason: format!("vector record {name} needs at least one component"),
            }
            .into());
        }
        let n = species.num_particles;
        let mut record_shape: Option<Vec<u64>> = None;
        for (i, c) in components.iter().enumerate() {
            if c.name.is_empty() || c.name.contains('/') {
                return Err(ConfigError::InvalidField {
                    reason: format!("component name {:?} must be non-empty without '/'", c.name),
                }
                .into());
            }
            if components[..i].iter().any(|other| other.name == c.name) {
                return Err(ConfigError::InvalidField {
                    reason: format!("component {name}/{} given twice", c.name),
                }
                .into());
            }
            validate_unit_si(c.unit_si)?;
            let what = format!("{name}/{}", c.name);
            let shape = match &c.data {
                AxisData::Variable(values) => {
                    self.check_length(species, &what, values.len())?;
                    vec![n]
                }
                AxisData::Constant { value, .. } if !value.is_finite() => {
                    return Err(ConfigError::InvalidField {
                        reason: format!("constant {what} value must be finite"),
                    }
                    .into());
                }
                AxisData::Constant { shape: None, .. } => vec![n],
                AxisData::Constant {
                    shape: Some(declared),
                    ..
                } => {
                    if opmd_core::id::element_count(declared) != Some(n) {
                        return Err(ShapeMismatch::new(what, &[n], declared).into());
                    }
                    declared.to_vec()
                }
            };
            match &record_shape {
                Some(first) if *first != shape => {
                    return Err(ShapeMismatch::new(what, first, &shape).into());
                }
                Some(_) => {}
                None => record_shape = Some(shape),
            }
        }
        attrs.validate()?;

        let group = self.store.create_group(species.node, name)?;
        attrs.apply(&mut self.store, group)?;
        for c in components {
            let node = match &c.data {
                AxisData::Variable(values) => self.store.create_dataset(
                    group,
                    c.name,
                    f32_payload(values.view()),
                    Shape::from_slice(&[n]),
                )?,
                AxisData::Constant { value, shape } => {
                    let shape = shape.map_or_else(|| vec![n], <[u64]>::to_vec);
                    let node = self.store.create_group(group, c.name)?;
                    self.store.set_attr(node, "value", AttrValue::F32(*value))?;
                    self.store.set_attr(node, "shape", AttrValue::U64Array(shape))?;
                    node
                }
            };
            self.store.set_attr(node, "unitSI", AttrValue::F64(c.unit_si))?;
        }
        debug!(
            "vector record {} ({} components)",
            self.store.path_of(group)?,
            components.len()
        );
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::SpeciesAttributes;
    use crate::test_support::container;
    use ndarray::Array1;
    use opmd_core::{units, Quantity};
    use opmd_store::NodeKind;

    fn species(n: u64) -> (Container<opmd_store::TreeStore>, Species) {
        let (mut c, it) = container(false);
        let sp = c
            .begin_species(
                &it,
                "electrons",
                &SpeciesAttributes {
                    num_particles: n,
                    ..SpeciesAttributes::default()
                },
            )
            .unwrap();
        (c, sp)
    }

    #[test]
    fn charge_is_constant_group() {
        let (mut c, sp) = species(128);
        let attrs = ParticleRecordAttributes::new(Quantity::Charge.unit_dimension(), false, 1.0);
        let node = c
            .write_constant_scalar(&sp, "charge", -1.0, &[128], units::ELEMENTARY_CHARGE, &attrs)
            .unwrap();
        let s = c.store();
        assert_eq!(s.path_of(node).unwrap(), "/data/0/particles/electrons/charge");
        assert_eq!(s.kind(node).unwrap(), NodeKind::Group);
        assert_eq!(s.attr(node, "value").unwrap(), Some(&AttrValue::F64(-1.0)));
        assert_eq!(s.attr(node, "shape").unwrap(), Some(&AttrValue::U64Array(vec![128])));
        assert_eq!(s.attr(node, "macroWeighted").unwrap(), Some(&AttrValue::U32(0)));
        assert!(s.children(node).unwrap().is_empty());
    }

    #[test]
    fn constant_shape_must_cover_species() {
        let (mut c, sp) = species(128);
        let attrs = ParticleRecordAttributes::new(Quantity::Mass.unit_dimension(), false, 1.0);
        assert!(matches!(
            c.write_constant_scalar(&sp, "mass", 1.0, &[64], units::ELECTRON_MASS, &attrs),
            Err(WriteError::ShapeMismatch(_))
        ));
        assert_eq!(c.store().child(sp.node, "mass").unwrap(), None);
    }

    #[test]
    fn weighting_is_dataset_with_attributes() {
        let (mut c, sp) = species(4);
        let w = Array1::from(vec![1.0, 2.0, 3.0, 4.0]);
        let attrs = ParticleRecordAttributes::new(Quantity::Weighting.unit_dimension(), true, 1.0);
        let node = c
            .write_scalar_record(&sp, "weighting", w.view(), 1.0, &attrs)
            .unwrap();
        let s = c.store();
        let ds = s.dataset(node).unwrap();
        assert_eq!(ds.data.as_f32().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.attr(node, "macroWeighted").unwrap(), Some(&AttrValue::U32(1)));
        assert_eq!(s.attr(node, "unitSI").unwrap(), Some(&AttrValue::F64(1.0)));
    }

    #[test]
    fn position_offset_constant_axes() {
        let (mut c, sp) = species(3);
        let attrs = ParticleRecordAttributes::new(Quantity::Length.unit_dimension(), true, 0.0);
        let group = c
            .write_vector_record(
                &sp,
                "positionOffset",
                &[
                    ParticleComponent::constant("x", 0.0, units::NANOMETER),
                    ParticleComponent::constant("z", 100.0, units::NANOMETER),
                ],
                &attrs,
            )
            .unwrap();
        let s = c.store();
        let z = s.child(group, "z").unwrap().unwrap();
        assert_eq!(s.attr(z, "value").unwrap(), Some(&AttrValue::F32(100.0)));
        assert_eq!(s.attr(z, "shape").unwrap(), Some(&AttrValue::U64Array(vec![3])));
        assert_eq!(s.attr(z, "unitSI").unwrap(), Some(&AttrValue::F64(1e-9)));
        assert_eq!(s.attr(group, "weightingPower").unwrap(), Some(&AttrValue::F64(0.0)));
    }

    #[test]
    fn constant_axis_takes_declared_shape() {
        let (mut c, sp) = species(6);
        let attrs = ParticleRecordAttributes::new(Quantity::Length.unit_dimension(), true, 0.0);
        let group = c
            .write_vector_record(
                &sp,
                "positionOffset",
                &[
                    ParticleComponent::constant_shaped("x", 0.0, &[2, 3], 1.0),
                    ParticleComponent::constant_shaped("y", 5.0, &[2, 3], 1.0),
                ],
                &attrs,
            )
            .unwrap();
        let s = c.store();
        let y = s.child(group, "y").unwrap().unwrap();
        assert_eq!(s.attr(y, "shape").unwrap(), Some(&AttrValue::U64Array(vec![2, 3])));
    }

    #[test]
    fn declared_shape_must_agree_with_siblings() {
        let (mut c, sp) = species(6);
        let x = Array1::<f64>::zeros(6);
        let attrs = ParticleRecordAttributes::new(Quantity::Length.unit_dimension(), true, 0.0);
        let before = c.store().node_count();
        let err = c
            .write_vector_record(
                &sp,
                "position",
                &[
                    ParticleComponent::variable("x", x.view(), 1.0),
                    ParticleComponent::constant_shaped("y", 0.0, &[2, 3], 1.0),
                ],
                &attrs,
            )
            .unwrap_err();
        assert!(matches!(err, WriteError::ShapeMismatch(ref m) if m.what == "position/y"));
        assert!(matches!(
            c.write_vector_record(
                &sp,
                "position",
                &[ParticleComponent::constant_shaped("x", 0.0, &[4], 1.0)],
                &attrs,
            ),
            Err(WriteError::ShapeMismatch(_))
        ));
        assert_eq!(c.store().node_count(), before);
    }

    #[test]
    fn variable_axis_length_checked_before_write() {
        let (mut c, sp) = species(4);
        let good = Array1::<f64>::zeros(4);
        let short = Array1::<f64>::zeros(3);
        let before = c.store().node_count();
        let err = c
            .write_vector_record(
                &sp,
                "momentum",
                &[
                    ParticleComponent::variable("x", good.view(), 1.0),
                    ParticleComponent::variable("y", short.view(), 1.0),
                ],
                &ParticleRecordAttributes::new(Quantity::Momentum.unit_dimension(), true, 1.0),
            )
            .unwrap_err();
        match err {
            WriteError::ShapeMismatch(m) => {
                assert_eq!(m.what, "momentum/y");
                assert_eq!(m.found, vec![3]);
            }
            other => panic!("unexpected {other}"),
        }
        assert_eq!(c.store().node_count(), before);
    }

    #[test]
    fn duplicate_component_rejected() {
        let (mut c, sp) = species(1);
        let err = c
            .write_vector_record(
                &sp,
                "position",
                &[
                    ParticleComponent::constant("x", 0.0, 1.0),
                    ParticleComponent::constant("x", 1.0, 1.0),
                ],
                &ParticleRecordAttributes::new(Quantity::Length.unit_dimension(), true, 0.0),
            )
            .unwrap_err();
        assert!(matches!(err, WriteError::Config(ConfigError::InvalidField { .. })));
    }
}
