//! Typed attribute sets, one per node kind.
//!
//! Each struct names exactly the attributes its node carries, checks them
//! in `validate()`, and writes them in a fixed order in `apply()`. Writers
//! validate every set they will touch before creating any node.

use opmd_core::{AttrValue, ConfigError, DataOrder, NodeId, Smoothing, UnitDimension};
use opmd_store::{Store, StoreError};

fn finite(name: &str, v: f64) -> Result<(), ConfigError> {
    if !v.is_finite() {
        return Err(ConfigError::InvalidField {
            reason: format!("{name} must be finite, got {v}"),
        });
    }
    Ok(())
}

fn positive(name: &str, v: f64) -> Result<(), ConfigError> {
    if !(v.is_finite() && v > 0.0) {
        return Err(ConfigError::InvalidField {
            reason: format!("{name} must be finite and positive, got {v}"),
        });
    }
    Ok(())
}

/// Write a smoothing choice as `<name>` plus `<name>Parameters`.
pub(crate) fn apply_smoothing<S: Store + ?Sized>(
    store: &mut S,
    node: NodeId,
    attr: &str,
    smoothing: &Smoothing,
) -> Result<(), StoreError> {
    store.set_attr(node, attr, smoothing.name().into())?;
    if let Some(params) = smoothing.parameters() {
        store.set_attr(node, &format!("{attr}Parameters"), params.into())?;
    }
    Ok(())
}

// ── Iteration ──────────────────────────────────────────────────────

/// Attributes of an iteration group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationAttributes {
    /// `time`, in units of `timeUnitSI`.
    pub time: f64,
    /// `dt`, in units of `timeUnitSI`.
    pub dt: f64,
    /// `timeUnitSI`: seconds per time unit.
    pub time_unit_si: f64,
}

impl IterationAttributes {
    /// Time and step expressed in femtoseconds.
    pub fn femtoseconds(time: f64, dt: f64) -> Self {
        Self {
            time,
            dt,
            time_unit_si: opmd_core::units::FEMTOSECOND,
        }
    }

    /// `time` finite, `dt` and `timeUnitSI` finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("time", self.time)?;
        positive("dt", self.dt)?;
        positive("timeUnitSI", self.time_unit_si)
    }

    pub(crate) fn apply<S: Store + ?Sized>(
        &self,
        store: &mut S,
        node: NodeId,
    ) -> Result<(), StoreError> {
        store.set_attr(node, "time", AttrValue::F64(self.time))?;
        store.set_attr(node, "dt", AttrValue::F64(self.dt))?;
        store.set_attr(node, "timeUnitSI", AttrValue::F64(self.time_unit_si))
    }
}

// ── Mesh record ────────────────────────────────────────────────────

/// Attributes shared by every component of one mesh record.
///
/// Geometry is not part of the set: each mesh writer path fixes its own.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshRecordAttributes {
    /// `gridSpacing`, one entry per spatial axis.
    pub grid_spacing: Vec<f32>,
    /// `gridGlobalOffset`, one entry per spatial axis.
    pub grid_global_offset: Vec<f32>,
    /// `gridUnitSI`: meters per grid unit.
    pub grid_unit_si: f64,
    /// `dataOrder`.
    pub data_order: DataOrder,
    /// `axisLabels`, one entry per spatial axis, in storage order.
    pub axis_labels: Vec<String>,
    /// `unitDimension`.
    pub unit_dimension: UnitDimension,
    /// `timeOffset` relative to the iteration's `time`.
    pub time_offset: f64,
    /// ED-PIC `fieldSmoothing`; written only when the extension is on.
    pub field_smoothing: Smoothing,
    /// Optional `comment`.
    pub comment: Option<String>,
}

impl MeshRecordAttributes {
    /// Unit-spaced grid at the origin with the given axis labels.
    pub fn unit_grid(axis_labels: &[&str], unit_dimension: UnitDimension) -> Self {
        let n = axis_labels.len();
        Self {
            grid_spacing: vec![1.0; n],
            grid_global_offset: vec![0.0; n],
            grid_unit_si: 1.0,
            data_order: DataOrder::C,
            axis_labels: axis_labels.iter().map(|s| s.to_string()).collect(),
            unit_dimension,
            time_offset: 0.0,
            field_smoothing: Smoothing::None,
            comment: None,
        }
    }

    /// Builder-style `timeOffset`.
    pub fn with_time_offset(mut self, time_offset: f64) -> Self {
        self.time_offset = time_offset;
        self
    }

    /// Builder-style `comment`.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Number of spatial axes.
    pub fn rank(&self) -> usize {
        self.axis_labels.len()
    }

    /// Every per-axis list has `rank` entries; spacing is positive.
    pub fn validate(&self, rank: usize) -> Result<(), ConfigError> {
        for (name, len) in [
            ("axisLabels", self.axis_labels.len()),
            ("gridSpacing", self.grid_spacing.len()),
            ("gridGlobalOffset", self.grid_global_offset.len()),
        ] {
            if len != rank {
                return Err(ConfigError::InvalidField {
                    reason: format!("{name} has {len} entries, mesh has {rank} axes"),
                });
            }
        }
        for &s in &self.grid_spacing {
            positive("gridSpacing", f64::from(s))?;
        }
        for &o in &self.grid_global_offset {
            finite("gridGlobalOffset", f64::from(o))?;
        }
        positive("gridUnitSI", self.grid_unit_si)?;
        finite("timeOffset", self.time_offset)?;
        if self.axis_labels.iter().any(|l| l.is_empty()) {
            return Err(ConfigError::InvalidField {
                reason: "axis labels must be non-empty".into(),
            });
        }
        Ok(())
    }

    pub(crate) fn apply<S: Store + ?Sized>(
        &self,
        store: &mut S,
        node: NodeId,
        ed_pic: bool,
    ) -> Result<(), StoreError> {
        if let Some(comment) = &self.comment {
            store.set_attr(node, "comment", comment.as_str().into())?;
        }
        store.set_attr(node, "gridSpacing", AttrValue::F32Array(self.grid_spacing.clone()))?;
        store.set_attr(
            node,
            "gridGlobalOffset",
            AttrValue::F32Array(self.grid_global_offset.clone()),
        )?;
        store.set_attr(node, "gridUnitSI", AttrValue::F64(self.grid_unit_si))?;
        store.set_attr(node, "dataOrder", self.data_order.name().into())?;
        store.set_attr(node, "axisLabels", AttrValue::StrArray(self.axis_labels.clone()))?;
        store.set_attr(
            node,
            "unitDimension",
            AttrValue::F64Array(self.unit_dimension.to_vec()),
        )?;
        store.set_attr(node, "timeOffset", AttrValue::F64(self.time_offset))?;
        if ed_pic {
            apply_smoothing(store, node, "fieldSmoothing", &self.field_smoothing)?;
        }
        Ok(())
    }
}

// ── Mesh component ─────────────────────────────────────────────────

/// Attributes of one mesh record component.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshComponentAttributes {
    /// `position`: staggered in-cell offset per spatial axis, each in `[0, 1)`.
    pub position: Vec<f32>,
    /// `unitSI` of this component.
    pub unit_si: f64,
}

impl MeshComponentAttributes {
    /// Component at the given in-cell position.
    pub fn new(position: &[f32], unit_si: f64) -> Self {
        Self {
            position: position.to_vec(),
            unit_si,
        }
    }

    /// `position` has `rank` entries in `[0, 1)`; `unitSI` positive.
    pub fn validate(&self, rank: usize) -> Result<(), ConfigError> {
        if self.position.len() != rank {
            return Err(ConfigError::InvalidField {
                reason: format!(
                    "position has {} entries, mesh has {rank} axes",
                    self.position.len()
                ),
            });
        }
        if let Some(p) = self.position.iter().find(|p| !(0.0..1.0).contains(*p)) {
            return Err(ConfigError::InvalidField {
                reason: format!("staggered position {p} outside [0, 1)"),
            });
        }
        positive("unitSI", self.unit_si)
    }

    pub(crate) fn apply<S: Store + ?Sized>(
        &self,
        store: &mut S,
        node: NodeId,
    ) -> Result<(), StoreError> {
        store.set_attr(node, "position", AttrValue::F32Array(self.position.clone()))?;
        store.set_attr(node, "unitSI", AttrValue::F64(self.unit_si))
    }
}

// ── Particle record ────────────────────────────────────────────────

/// Attributes of one particle record.
///
/// `macro_weighted` and `weighting_power` describe how the stored value
/// scales with the number of real particles a macro-particle stands for.
/// They are metadata only; no value is rescaled on write.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleRecordAttributes {
    /// `unitDimension`.
    pub unit_dimension: UnitDimension,
    /// `macroWeighted`: whether the value is for the whole macro-particle.
    pub macro_weighted: bool,
    /// `weightingPower`: exponent of the weighting the value scales with.
    pub weighting_power: f64,
    /// `timeOffset` relative to the iteration's `time`.
    pub time_offset: f64,
}

impl ParticleRecordAttributes {
    /// A record with zero time offset.
    pub fn new(unit_dimension: UnitDimension, macro_weighted: bool, weighting_power: f64) -> Self {
        Self {
            unit_dimension,
            macro_weighted,
            weighting_power,
            time_offset: 0.0,
        }
    }

    /// Builder-style `timeOffset`.
    pub fn with_time_offset(mut self, time_offset: f64) -> Self {
        self.time_offset = time_offset;
        self
    }

    /// `weightingPower` and `timeOffset` are finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("weightingPower", self.weighting_power)?;
        finite("timeOffset", self.time_offset)
    }

    pub(crate) fn apply<S: Store + ?Sized>(
        &self,
        store: &mut S,
        node: NodeId,
    ) -> Result<(), StoreError> {
        store.set_attr(node, "macroWeighted", AttrValue::U32(u32::from(self.macro_weighted)))?;
        store.set_attr(node, "weightingPower", AttrValue::F64(self.weighting_power))?;
        store.set_attr(node, "timeOffset", AttrValue::F64(self.time_offset))?;
        store.set_attr(
            node,
            "unitDimension",
            AttrValue::F64Array(self.unit_dimension.to_vec()),
        )
    }
}

/// `unitSI` must be finite and positive.
pub(crate) fn validate_unit_si(unit_si: f64) -> Result<(), ConfigError> {
    positive("unitSI", unit_si)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opmd_core::Quantity;
    use opmd_store::TreeStore;

    #[test]
    fn iteration_validation() {
        IterationAttributes::femtoseconds(0.0, 0.5).validate().unwrap();
        assert!(IterationAttributes::femtoseconds(0.0, 0.0).validate().is_err());
        assert!(IterationAttributes::femtoseconds(f64::NAN, 0.5).validate().is_err());
    }

    #[test]
    fn mesh_record_rank_checked() {
        let attrs =
            MeshRecordAttributes::unit_grid(&["x", "y"], Quantity::ElectricField.unit_dimension());
        attrs.validate(2).unwrap();
        assert!(attrs.validate(3).is_err());
    }

    #[test]
    fn staggered_position_must_be_in_unit_interval() {
        MeshComponentAttributes::new(&[0.0, 0.5], 1.0).validate(2).unwrap();
        assert!(MeshComponentAttributes::new(&[0.0, 1.0], 1.0).validate(2).is_err());
        assert!(MeshComponentAttributes::new(&[-0.1, 0.0], 1.0).validate(2).is_err());
        assert!(MeshComponentAttributes::new(&[0.0, 0.0], 0.0).validate(2).is_err());
    }

    #[test]
    fn mesh_record_apply_writes_smoothing_only_with_ed_pic() {
        let mut attrs = MeshRecordAttributes::unit_grid(&["r", "z"], UnitDimension::DIMENSIONLESS);
        attrs.field_smoothing = Smoothing::Binomial {
            period: 10,
            num_passes: 4,
            compensator: true,
        };
        let mut s = TreeStore::new();
        let root = s.root();
        let with = s.create_group(root, "with").unwrap();
        let without = s.create_group(root, "without").unwrap();
        attrs.apply(&mut s, with, true).unwrap();
        attrs.apply(&mut s, without, false).unwrap();
        assert_eq!(
            s.attr(with, "fieldSmoothingParameters").unwrap(),
            Some(&AttrValue::Str("period=10;numPasses=4;compensator=true".into()))
        );
        assert_eq!(s.attr(without, "fieldSmoothing").unwrap(), None);
        assert_eq!(
            s.attr(with, "unitDimension").unwrap(),
            Some(&AttrValue::F64Array(vec![0.0; 7]))
        );
    }

    #[test]
    fn particle_record_flags_are_u32() {
        let mut s = TreeStore::new();
        let root = s.root();
        ParticleRecordAttributes::new(Quantity::Charge.unit_dimension(), false, 1.0)
            .apply(&mut s, root)
            .unwrap();
        assert_eq!(s.attr(root, "macroWeighted").unwrap(), Some(&AttrValue::U32(0)));
        assert_eq!(s.attr(root, "weightingPower").unwrap(), Some(&AttrValue::F64(1.0)));
    }
}
