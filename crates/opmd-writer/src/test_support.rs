//! Shared fixtures for the in-crate unit tests.

use opmd_core::{
    ChargeCorrection, Extension, FieldBoundary, FieldSolver, IterationIndex, ParticleBoundary,
    Smoothing,
};
use opmd_store::TreeStore;

use crate::config::RootConfig;
use crate::container::{Container, Iteration};
use crate::extension::MeshesExtension;
use crate::schema::IterationAttributes;

pub(crate) fn container(ed_pic: bool) -> (Container<TreeStore>, Iteration) {
    let mut builder = RootConfig::builder();
    if ed_pic {
        builder = builder.extension(Extension::EdPic);
    }
    let mut c = Container::new(TreeStore::new());
    c.write_root(&builder.build().unwrap()).unwrap();
    let it = c
        .begin_iteration(IterationIndex(0), &IterationAttributes::femtoseconds(0.0, 0.5))
        .unwrap();
    (c, it)
}

pub(crate) fn yee_2d() -> MeshesExtension {
    MeshesExtension {
        field_solver: FieldSolver::Yee,
        field_boundary: vec![FieldBoundary::Periodic; 4],
        particle_boundary: vec![ParticleBoundary::Periodic; 4],
        current_smoothing: Smoothing::None,
        charge_correction: ChargeCorrection::None,
    }
}
