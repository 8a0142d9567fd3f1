//! The reference PIC snapshot.
//!
//! One iteration of a small 2-D simulation with every record kind the
//! writers support: a thetaMode charge density, a fully variable electric
//! field, a magnetic field with constant components, and one electron
//! species with constant, scalar and vector records plus a 4-rank patch
//! table. Field and particle values come from a [`DataProvider`].

use opmd_core::{
    ChargeCorrection, ConfigError, Extension, FieldBoundary, FieldSolver, IterationIndex,
    ParticleBoundary, Quantity, Smoothing,
};
use opmd_store::Store;

use crate::config::RootConfig;
use crate::container::{Container, Iteration, SpeciesAttributes};
use crate::error::WriteError;
use crate::extension::{MeshesExtension, ParticleExtension};
use crate::mesh::{CartesianComponent, ComponentData};
use crate::particle::ParticleComponent;
use crate::patches::PatchLayout;
use crate::provider::DataProvider;
use crate::schema::{
    IterationAttributes, MeshComponentAttributes, MeshRecordAttributes, ParticleRecordAttributes,
};

/// Mesh shape `(nr, nz)` / `(nx, ny)` of every field.
pub const GRID: (usize, usize) = (32, 64);
/// Macro-particles in the electron species.
pub const NUM_PARTICLES: u64 = 128;
/// Ranks in the patch table.
pub const NUM_RANKS: u64 = 4;
/// Global grid in cells described by the patch table.
pub const GLOBAL_GRID: [u64; 3] = [512, 128, 1];

/// `unitSI` of the electric field components.
const E_UNIT_SI: f64 = 1.0e9;
/// `unitSI` of the magnetic field components.
const B_UNIT_SI: f64 = 3.3;

/// Root configuration of the sample: openPMD 1.1.0 with ED-PIC, grouped
/// iterations under `/data/%T/`, and provenance for this machine and now.
pub fn sample_root_config() -> Result<RootConfig, ConfigError> {
    let machine = std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string());
    RootConfig::builder()
        .extension(Extension::EdPic)
        .author("openPMD sample writer")
        .software("opmd create_sample", env!("CARGO_PKG_VERSION"))
        .dependency("opmd", env!("CARGO_PKG_VERSION"))
        .machine(machine)
        .date_now()
        .comment("This is a dummy file for test purposes.")
        .build()
}

/// ED-PIC settings of the sample's meshes group.
pub fn sample_meshes_extension() -> MeshesExtension {
    MeshesExtension {
        field_solver: FieldSolver::Yee,
        field_boundary: vec![
            FieldBoundary::Periodic,
            FieldBoundary::Periodic,
            FieldBoundary::Open,
            FieldBoundary::Open,
        ],
        particle_boundary: vec![
            ParticleBoundary::Periodic,
            ParticleBoundary::Periodic,
            ParticleBoundary::Absorbing,
            ParticleBoundary::Absorbing,
        ],
        current_smoothing: Smoothing::Binomial {
            period: 1,
            num_passes: 2,
            compensator: false,
        },
        charge_correction: ChargeCorrection::None,
    }
}

/// Write the sample with [`sample_root_config`].
pub fn write_sample_container<S: Store>(
    container: &mut Container<S>,
    provider: &mut dyn DataProvider,
    iteration: IterationIndex,
) -> Result<(), WriteError> {
    let config = sample_root_config()?;
    write_sample_with(container, &config, provider, iteration)
}

/// Write root attributes from `config`, then one sample iteration.
pub fn write_sample_with<S: Store>(
    container: &mut Container<S>,
    config: &RootConfig,
    provider: &mut dyn DataProvider,
    iteration: IterationIndex,
) -> Result<(), WriteError> {
    container.write_root(config)?;
    let it = container.begin_iteration(iteration, &IterationAttributes::femtoseconds(0.0, 0.5))?;
    write_sample_meshes(container, &it, config.ed_pic(), provider)?;
    write_sample_particles(container, &it, config.ed_pic(), provider)
}

fn write_sample_meshes<S: Store>(
    container: &mut Container<S>,
    it: &Iteration,
    ed_pic: bool,
    provider: &mut dyn DataProvider,
) -> Result<(), WriteError> {
    let extension = sample_meshes_extension();
    let meshes = container.meshes(it, ed_pic.then_some(&extension))?;

    let rho0 = provider.real_field("rho mode 0", GRID);
    let rho1 = provider.complex_field("rho mode 1", GRID);
    container.write_cylindrical_scalar(
        &meshes,
        "rho",
        rho0.view(),
        rho1.view(),
        &MeshRecordAttributes::unit_grid(&["r", "z"], Quantity::ChargeDensity.unit_dimension())
            .with_comment("Density of electrons in azimuthal decomposition"),
        &MeshComponentAttributes::new(&[0.0, 0.0], Quantity::ChargeDensity.default_unit_si()),
    )?;

    let ex = provider.real_field("E x", GRID);
    let ey = provider.real_field("E y", GRID);
    let ez = provider.real_field("E z", GRID);
    let e_component = |name, view, position: &[f32]| CartesianComponent {
        name,
        data: ComponentData::Variable(view),
        attrs: MeshComponentAttributes::new(position, E_UNIT_SI),
    };
    container.write_cartesian_vector(
        &meshes,
        "E",
        &MeshRecordAttributes::unit_grid(&["x", "y"], Quantity::ElectricField.unit_dimension()),
        &[
            e_component("x", ex.view(), &[0.0, 0.5]),
            e_component("y", ey.view(), &[0.5, 0.0]),
            e_component("z", ez.view(), &[0.0, 0.0]),
        ],
        None,
    )?;

    let bz = provider.real_field("B z", GRID);
    container.write_cartesian_vector(
        &meshes,
        "B",
        &MeshRecordAttributes::unit_grid(&["x", "y"], Quantity::MagneticField.unit_dimension())
            .with_time_offset(0.25),
        &[
            CartesianComponent {
                name: "x",
                data: ComponentData::Uniform(0.0),
                attrs: MeshComponentAttributes::new(&[0.0, 0.0], B_UNIT_SI),
            },
            CartesianComponent {
                name: "y",
                data: ComponentData::Uniform(0.0),
                attrs: MeshComponentAttributes::new(&[0.0, 0.0], B_UNIT_SI),
            },
            CartesianComponent {
                name: "z",
                data: ComponentData::Variable(bz.view()),
                attrs: MeshComponentAttributes::new(&[0.5, 0.5], B_UNIT_SI),
            },
        ],
        None,
    )?;
    Ok(())
}

fn write_sample_particles<S: Store>(
    container: &mut Container<S>,
    it: &Iteration,
    ed_pic: bool,
    provider: &mut dyn DataProvider,
) -> Result<(), WriteError> {
    let n = NUM_PARTICLES;
    let len = n as usize;
    let species = container.begin_species(
        it,
        "electrons",
        &SpeciesAttributes {
            num_particles: n,
            comment: Some("My first electron species".into()),
            extension: ed_pic.then(ParticleExtension::default),
        },
    )?;

    container.write_constant_scalar(
        &species,
        "charge",
        -1.0,
        &[n],
        Quantity::Charge.default_unit_si(),
        &ParticleRecordAttributes::new(Quantity::Charge.unit_dimension(), false, 1.0),
    )?;
    container.write_constant_scalar(
        &species,
        "mass",
        1.0,
        &[n],
        Quantity::Mass.default_unit_si(),
        &ParticleRecordAttributes::new(Quantity::Mass.unit_dimension(), false, 1.0),
    )?;

    let weighting = provider.particle_values("weighting", len);
    container.write_scalar_record(
        &species,
        "weighting",
        weighting.view(),
        Quantity::Weighting.default_unit_si(),
        &ParticleRecordAttributes::new(Quantity::Weighting.unit_dimension(), true, 1.0),
    )?;

    let length = Quantity::Length.default_unit_si();
    let position_attrs =
        ParticleRecordAttributes::new(Quantity::Length.unit_dimension(), true, 0.0);
    let (px, py, pz) = (
        provider.particle_values("position x", len),
        provider.particle_values("position y", len),
        provider.particle_values("position z", len),
    );
    container.write_vector_record(
        &species,
        "position",
        &[
            ParticleComponent::variable("x", px.view(), length),
            ParticleComponent::variable("y", py.view(), length),
            ParticleComponent::variable("z", pz.view(), length),
        ],
        &position_attrs,
    )?;
    container.write_vector_record(
        &species,
        "positionOffset",
        &[
            ParticleComponent::constant("x", 0.0, length),
            ParticleComponent::constant("y", 0.0, length),
            ParticleComponent::constant("z", 100.0, length),
        ],
        &position_attrs,
    )?;

    let momentum = Quantity::Momentum.default_unit_si();
    let (ux, uy, uz) = (
        provider.particle_values("momentum x", len),
        provider.particle_values("momentum y", len),
        provider.particle_values("momentum z", len),
    );
    container.write_vector_record(
        &species,
        "momentum",
        &[
            ParticleComponent::variable("x", ux.view(), momentum),
            ParticleComponent::variable("y", uy.view(), momentum),
            ParticleComponent::variable("z", uz.view(), momentum),
        ],
        &ParticleRecordAttributes::new(Quantity::Momentum.unit_dimension(), true, 1.0)
            .with_time_offset(0.25),
    )?;

    container.write_patches(
        &species,
        n,
        &PatchLayout::along_first_axis(NUM_RANKS, &GLOBAL_GRID, &["x", "y", "z"], length),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SeededProvider;
    use opmd_core::AttrValue;
    use opmd_store::TreeStore;

    #[test]
    fn sample_root_is_valid_and_ed_pic() {
        let config = sample_root_config().unwrap();
        assert!(config.ed_pic());
        assert_eq!(config.openpmd_version, "1.1.0");
        assert!(config.provenance.date.is_some());
    }

    #[test]
    fn sample_tree_has_every_record() {
        let mut c = Container::new(TreeStore::new());
        write_sample_container(&mut c, &mut SeededProvider::new(0), IterationIndex(0)).unwrap();
        let s = c.store();
        for path in [
            "/data/0/meshes/rho",
            "/data/0/meshes/E/x",
            "/data/0/meshes/B/y",
            "/data/0/particles/electrons/charge",
            "/data/0/particles/electrons/weighting",
            "/data/0/particles/electrons/positionOffset/z",
            "/data/0/particles/electrons/momentum/z",
            "/data/0/particles/electrons/particlePatches/extent/x",
        ] {
            assert!(s.lookup(path).is_some(), "missing {path}");
        }
        let iteration = s.lookup("/data/0").unwrap();
        assert_eq!(s.attr(iteration, "dt").unwrap(), Some(&AttrValue::F64(0.5)));
        let electrons = s.lookup("/data/0/particles/electrons").unwrap();
        assert_eq!(
            s.attr(electrons, "currentDeposition").unwrap(),
            Some(&AttrValue::from("Esirkepov"))
        );
    }

    #[test]
    fn sample_without_ed_pic_has_no_extension_attributes() {
        let config = RootConfig::builder().build().unwrap();
        let mut c = Container::new(TreeStore::new());
        write_sample_with(&mut c, &config, &mut SeededProvider::new(0), IterationIndex(3)).unwrap();
        let s = c.store();
        let meshes = s.lookup("/data/3/meshes").unwrap();
        assert_eq!(s.attr(meshes, "fieldSolver").unwrap(), None);
        let rho = s.lookup("/data/3/meshes/rho").unwrap();
        assert_eq!(s.attr(rho, "fieldSmoothing").unwrap(), None);
    }
}
