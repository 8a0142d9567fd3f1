//! Particle patches: the per-rank decomposition table of a species.
//!
//! The particle index space `[0, N)` and the grid along one axis are
//! split into `R` contiguous blocks. Every rank owns `N / R` particles
//! and `extent / R` cells; when a division is inexact the last rank
//! takes the remainder. Blocks are gap-free and non-overlapping.

use log::{debug, warn};
use opmd_core::{AttrValue, ConfigError, DataBuffer, NodeId, Shape};
use opmd_store::Store;

use crate::container::{Container, Species};
use crate::error::WriteError;
use crate::schema::validate_unit_si;

/// Largest cell count an f32 `offset`/`extent` entry holds exactly.
pub const MAX_PATCH_EXTENT: u64 = 1 << 24;

/// Spatial decomposition of a species over writer ranks.
#[derive(Clone, Debug, PartialEq)]
pub struct PatchLayout {
    /// Number of ranks (patches).
    pub num_ranks: u64,
    /// Global grid extent in cells, one entry per position axis.
    pub global_extent: Vec<u64>,
    /// Index into `global_extent` of the decomposed axis.
    pub decomposition_axis: usize,
    /// Component names of `offset` and `extent`, matching `global_extent`.
    pub axis_labels: Vec<String>,
    /// `unitSI` of every offset and extent component.
    pub unit_si: f64,
}

impl PatchLayout {
    /// A layout over `axis_labels`, decomposed along the first axis.
    pub fn along_first_axis(
        num_ranks: u64,
        global_extent: &[u64],
        axis_labels: &[&str],
        unit_si: f64,
    ) -> Self {
        Self {
            num_ranks,
            global_extent: global_extent.to_vec(),
            decomposition_axis: 0,
            axis_labels: axis_labels.iter().map(|s| s.to_string()).collect(),
            unit_si,
        }
    }

    /// Check the layout is decomposable.
    ///
    /// Every extent entry must be at most [`MAX_PATCH_EXTENT`], since the
    /// written table stores cell counts as f32. The rank count is bounded
    /// by the decomposed extent, and so by the same limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bad = |reason: String| Err(ConfigError::InvalidPatchLayout { reason });
        if self.num_ranks == 0 {
            return bad("at least one rank is required".into());
        }
        if self.global_extent.is_empty() {
            return bad("global extent has no axes".into());
        }
        if self.axis_labels.len() != self.global_extent.len() {
            return bad(format!(
                "{} axis labels for {} extent axes",
                self.axis_labels.len(),
                self.global_extent.len()
            ));
        }
        for (i, label) in self.axis_labels.iter().enumerate() {
            if label.is_empty() || label.contains('/') || self.axis_labels[..i].contains(label) {
                return bad(format!("axis label {label:?} is empty, nested or repeated"));
            }
        }
        if let Some(&extent) = self.global_extent.iter().find(|&&e| e > MAX_PATCH_EXTENT) {
            return bad(format!("axis extent {extent} exceeds {MAX_PATCH_EXTENT} cells"));
        }
        let Some(&extent) = self.global_extent.get(self.decomposition_axis) else {
            return bad(format!(
                "decomposition axis {} out of range for {} axes",
                self.decomposition_axis,
                self.global_extent.len()
            ));
        };
        if extent < self.num_ranks {
            return bad(format!(
                "axis extent {extent} cannot be split over {} ranks",
                self.num_ranks
            ));
        }
        validate_unit_si(self.unit_si).or_else(|e| bad(e.to_string()))
    }
}

/// The computed per-rank table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchTable {
    /// `numParticles` per rank.
    pub num_particles: Vec<u64>,
    /// `numParticlesOffset` per rank.
    pub num_particles_offset: Vec<u64>,
    /// Cell offset along the decomposed axis, per rank.
    pub axis_offset: Vec<u64>,
    /// Cell extent along the decomposed axis, per rank.
    pub axis_extent: Vec<u64>,
}

/// Split `total` into `ranks` contiguous blocks; the last absorbs the
/// remainder. Returns `(offsets, sizes)`.
fn split(total: u64, ranks: u64) -> (Vec<u64>, Vec<u64>) {
    let block = total / ranks;
    let remainder = total % ranks;
    let offsets = (0..ranks).map(|r| r * block).collect();
    let mut sizes = vec![block; ranks as usize];
    if let Some(last) = sizes.last_mut() {
        *last += remainder;
    }
    (offsets, sizes)
}

impl PatchTable {
    /// Partition `global_num_particles` and the decomposed axis of
    /// `layout` over its ranks.
    pub fn partition(
        global_num_particles: u64,
        layout: &PatchLayout,
    ) -> Result<Self, ConfigError> {
        layout.validate()?;
        let ranks = layout.num_ranks;
        let extent = layout.global_extent[layout.decomposition_axis];
        if global_num_particles % ranks != 0 {
            warn!(
                "{global_num_particles} particles do not split evenly over {ranks} ranks; \
                 last rank takes {} extra",
                global_num_particles % ranks
            );
        }
        if extent % ranks != 0 {
            warn!(
                "axis extent {extent} does not split evenly over {ranks} ranks; \
                 last rank takes {} extra cells",
                extent % ranks
            );
        }
        let (num_particles_offset, num_particles) = split(global_num_particles, ranks);
        let (axis_offset, axis_extent) = split(extent, ranks);
        Ok(Self {
            num_particles,
            num_particles_offset,
            axis_offset,
            axis_extent,
        })
    }

    /// Number of ranks in the table.
    pub fn num_ranks(&self) -> usize {
        self.num_particles.len()
    }
}

impl<S: Store> Container<S> {
    fn write_patch_axes(
        &mut self,
        parent: NodeId,
        name: &str,
        layout: &PatchLayout,
        decomposed: &[u64],
        other: impl Fn(u64) -> f32,
    ) -> Result<(), WriteError> {
        let ranks = layout.num_ranks;
        let group = self.store.create_group(parent, name)?;
        for (axis, label) in layout.axis_labels.iter().enumerate() {
            let node = if axis == layout.decomposition_axis {
                self.store.create_dataset(
                    group,
                    label,
                    DataBuffer::F32(decomposed.iter().map(|&v| v as f32).collect()),
                    Shape::from_slice(&[ranks]),
                )?
            } else {
                let node = self.store.create_group(group, label)?;
                self.store.set_attr(
                    node,
                    "value",
                    AttrValue::F32(other(layout.global_extent[axis])),
                )?;
                self.store.set_attr(node, "shape", AttrValue::U64Array(vec![ranks]))?;
                node
            };
            self.store.set_attr(node, "unitSI", AttrValue::F64(layout.unit_si))?;
        }
        Ok(())
    }

    /// Write the `particlePatches` group of `species`.
    ///
    /// `global_num_particles` must equal the species' particle count.
    /// Axes other than the decomposed one are written as constant
    /// components: zero offset and full extent for every rank.
    pub fn write_patches(
        &mut self,
        species: &Species,
        global_num_particles: u64,
        layout: &PatchLayout,
    ) -> Result<PatchTable, WriteError> {
        self.check_free(species.node, "particlePatches")?;
        if global_num_particles != species.num_particles {
            return Err(ConfigError::InvalidPatchLayout {
                reason: format!(
                    "{global_num_particles} patch particles for a species of {}",
                    species.num_particles
                ),
            }
            .into());
        }
        let table = PatchTable::partition(global_num_particles, layout)?;
        let ranks = Shape::from_slice(&[layout.num_ranks]);

        let group = self.store.create_group(species.node, "particlePatches")?;
        self.store.create_dataset(
            group,
            "numParticles",
            DataBuffer::U64(table.num_particles.clone()),
            ranks.clone(),
        )?;
        self.store.create_dataset(
            group,
            "numParticlesOffset",
            DataBuffer::U64(table.num_particles_offset.clone()),
            ranks,
        )?;
        self.write_patch_axes(group, "offset", layout, &table.axis_offset, |_| 0.0)?;
        self.write_patch_axes(group, "extent", layout, &table.axis_extent, |full| full as f32)?;
        debug!(
            "patches {} over {} ranks",
            self.store.path_of(group)?,
            table.num_ranks()
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::SpeciesAttributes;
    use crate::test_support::container;
    use opmd_store::NodeKind;
    use proptest::prelude::*;

    fn layout(ranks: u64, extent: &[u64]) -> PatchLayout {
        PatchLayout::along_first_axis(ranks, extent, &["x", "y", "z"][..extent.len()], 1e-9)
    }

    #[test]
    fn even_split_matches_reference_layout() {
        let table = PatchTable::partition(128, &layout(4, &[512, 128, 1])).unwrap();
        assert_eq!(table.num_particles, vec![32; 4]);
        assert_eq!(table.num_particles_offset, vec![0, 32, 64, 96]);
        assert_eq!(table.axis_offset, vec![0, 128, 256, 384]);
        assert_eq!(table.axis_extent, vec![128; 4]);
    }

    #[test]
    fn extent_beyond_exact_f32_is_rejected() {
        let big = MAX_PATCH_EXTENT + 1;
        assert!(matches!(
            PatchTable::partition(8, &layout(2, &[2 * big, 8])),
            Err(ConfigError::InvalidPatchLayout { .. })
        ));
        // A non-decomposed axis is written as f32 too.
        assert!(layout(2, &[8, big]).validate().is_err());
        // The largest exact extent still tiles without loss.
        let table = PatchTable::partition(8, &layout(2, &[MAX_PATCH_EXTENT, 8])).unwrap();
        let last = table.num_ranks() - 1;
        let end = table.axis_offset[last] as f32 + table.axis_extent[last] as f32;
        assert_eq!(end as u64, MAX_PATCH_EXTENT);
    }

    #[test]
    fn rank_count_is_bounded_by_extent() {
        assert!(matches!(
            PatchTable::partition(8, &layout(1 << 40, &[MAX_PATCH_EXTENT])),
            Err(ConfigError::InvalidPatchLayout { .. })
        ));
        assert!(layout(1 << 40, &[1 << 41]).validate().is_err());
    }

    #[test]
    fn remainder_goes_to_last_rank() {
        let table = PatchTable::partition(10, &layout(4, &[9])).unwrap();
        assert_eq!(table.num_particles, vec![2, 2, 2, 4]);
        assert_eq!(table.num_particles_offset, vec![0, 2, 4, 6]);
        assert_eq!(table.axis_extent, vec![2, 2, 2, 3]);
    }

    #[test]
    fn invalid_layouts() {
        assert!(PatchTable::partition(8, &layout(0, &[8])).is_err());
        assert!(PatchTable::partition(8, &layout(4, &[3])).is_err());
        let mut l = layout(2, &[8, 8]);
        l.decomposition_axis = 2;
        assert!(matches!(
            PatchTable::partition(8, &l),
            Err(ConfigError::InvalidPatchLayout { .. })
        ));
        let mut l = layout(2, &[8, 8]);
        l.axis_labels[1] = "x".into();
        assert!(l.validate().is_err());
    }

    #[test]
    fn written_table_layout() {
        let (mut c, it) = container(false);
        let sp = c
            .begin_species(
                &it,
                "electrons",
                &SpeciesAttributes {
                    num_particles: 128,
                    ..SpeciesAttributes::default()
                },
            )
            .unwrap();
        c.write_patches(&sp, 128, &layout(4, &[512, 128, 1])).unwrap();
        let s = c.store();
        let patches = s.child(sp.node, "particlePatches").unwrap().unwrap();
        let n = s.child(patches, "numParticles").unwrap().unwrap();
        assert_eq!(s.dataset(n).unwrap().data.as_u64().unwrap(), &[32, 32, 32, 32]);

        let extent = s.child(patches, "extent").unwrap().unwrap();
        let ex = s.child(extent, "x").unwrap().unwrap();
        assert_eq!(s.kind(ex).unwrap(), NodeKind::Dataset);
        assert_eq!(s.dataset(ex).unwrap().data.as_f32().unwrap(), &[128.0; 4]);
        let ey = s.child(extent, "y").unwrap().unwrap();
        assert_eq!(s.attr(ey, "value").unwrap(), Some(&AttrValue::F32(128.0)));
        assert_eq!(s.attr(ey, "shape").unwrap(), Some(&AttrValue::U64Array(vec![4])));
        assert_eq!(s.attr(ey, "unitSI").unwrap(), Some(&AttrValue::F64(1e-9)));

        let offset = s.child(patches, "offset").unwrap().unwrap();
        let oz = s.child(offset, "z").unwrap().unwrap();
        assert_eq!(s.attr(oz, "value").unwrap(), Some(&AttrValue::F32(0.0)));
    }

    #[test]
    fn particle_count_must_match_species() {
        let (mut c, it) = container(false);
        let sp = c
            .begin_species(
                &it,
                "ions",
                &SpeciesAttributes {
                    num_particles: 16,
                    ..SpeciesAttributes::default()
                },
            )
            .unwrap();
        assert!(matches!(
            c.write_patches(&sp, 17, &layout(2, &[4])),
            Err(WriteError::Config(ConfigError::InvalidPatchLayout { .. }))
        ));
        assert_eq!(c.store().child(sp.node, "particlePatches").unwrap(), None);
    }

    proptest! {
        #[test]
        fn partition_is_gap_free(
            particles in 0u64..100_000,
            ranks in 1u64..64,
            extra in 0u64..1_000,
        ) {
            let extent = ranks + extra;
            let table = PatchTable::partition(particles, &layout(ranks, &[extent])).unwrap();
            prop_assert_eq!(table.num_ranks() as u64, ranks);
            prop_assert_eq!(table.num_particles.iter().sum::<u64>(), particles);
            prop_assert_eq!(table.axis_extent.iter().sum::<u64>(), extent);
            for r in 1..table.num_ranks() {
                prop_assert_eq!(
                    table.num_particles_offset[r],
                    table.num_particles_offset[r - 1] + table.num_particles[r - 1]
                );
                prop_assert_eq!(
                    table.axis_offset[r],
                    table.axis_offset[r - 1] + table.axis_extent[r - 1]
                );
            }
            prop_assert_eq!(table.num_particles_offset[0], 0);
            prop_assert!(table.axis_extent.iter().all(|&e| e > 0));
        }
    }
}
