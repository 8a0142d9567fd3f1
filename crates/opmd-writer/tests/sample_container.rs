//! Integration test: the reference snapshot, end to end.
//!
//! Builds the sample container from ramp data and a pinned root
//! configuration, then checks the attribute layout node by node, the
//! packed thetaMode layers, the patch table, and that the content hash is
//! reproducible and survives a round trip through a file.

use opmd_core::{AttrValue, IterationIndex};
use opmd_store::{content_hash, FileStore, NodeKind, Store, TreeStore};
use opmd_test_utils::fixtures::{fixed_root_config, scratch_path, FIXED_DATE};
use opmd_test_utils::FixtureProvider;
use opmd_writer::sample::{write_sample_with, GRID};
use opmd_writer::Container;

fn build() -> TreeStore {
    let mut c = Container::new(TreeStore::new());
    write_sample_with(
        &mut c,
        &fixed_root_config(),
        &mut FixtureProvider::new(),
        IterationIndex(0),
    )
    .unwrap();
    c.close().unwrap();
    c.into_store()
}

fn attr<'a>(s: &'a TreeStore, path: &str, name: &str) -> Option<&'a AttrValue> {
    let node = s.lookup(path).unwrap_or_else(|| panic!("missing {path}"));
    s.attr(node, name).unwrap()
}

fn f32s(values: &[f32]) -> AttrValue {
    AttrValue::F32Array(values.to_vec())
}

// ── Root and iteration ───────────────────────────────────────────────

#[test]
fn root_attributes() {
    let s = build();
    assert_eq!(attr(&s, "/", "openPMD"), Some(&AttrValue::from("1.1.0")));
    assert_eq!(attr(&s, "/", "openPMDextension"), Some(&AttrValue::U32(1)));
    assert_eq!(attr(&s, "/", "basePath"), Some(&AttrValue::from("/data/%T/")));
    assert_eq!(attr(&s, "/", "iterationEncoding"), Some(&AttrValue::from("groupBased")));
    assert_eq!(attr(&s, "/", "date"), Some(&AttrValue::from(FIXED_DATE)));
    assert_eq!(
        attr(&s, "/", "softwareDependencies"),
        Some(&AttrValue::from("opmd@0.0.0"))
    );
}

#[test]
fn iteration_time_attributes() {
    let s = build();
    assert_eq!(attr(&s, "/data/0", "time"), Some(&AttrValue::F64(0.0)));
    assert_eq!(attr(&s, "/data/0", "dt"), Some(&AttrValue::F64(0.5)));
    assert_eq!(attr(&s, "/data/0", "timeUnitSI"), Some(&AttrValue::F64(1e-15)));
}

// ── Meshes ───────────────────────────────────────────────────────────

#[test]
fn meshes_group_carries_ed_pic_scheme() {
    let s = build();
    let m = "/data/0/meshes";
    assert_eq!(attr(&s, m, "fieldSolver"), Some(&AttrValue::from("Yee")));
    assert_eq!(
        attr(&s, m, "fieldBoundary"),
        Some(&AttrValue::StrArray(vec![
            "periodic".into(),
            "periodic".into(),
            "open".into(),
            "open".into()
        ]))
    );
    assert_eq!(attr(&s, m, "currentSmoothing"), Some(&AttrValue::from("Binomial")));
    assert_eq!(
        attr(&s, m, "currentSmoothingParameters"),
        Some(&AttrValue::from("period=1;numPasses=2;compensator=false"))
    );
    assert_eq!(attr(&s, m, "chargeCorrection"), Some(&AttrValue::from("none")));
}

#[test]
fn rho_is_packed_theta_mode_dataset() {
    let s = build();
    let rho = s.lookup("/data/0/meshes/rho").unwrap();
    assert_eq!(s.kind(rho).unwrap(), NodeKind::Dataset);
    let ds = s.dataset(rho).unwrap();
    let (nr, nz) = GRID;
    assert_eq!(ds.shape.as_slice(), &[3, nr as u64, nz as u64]);

    let data = ds.data.as_f32().unwrap();
    let at = |layer: usize, r: usize, z: usize| data[(layer * nr + r) * nz + z];
    assert_eq!(at(0, 2, 5), (2 * nz + 5) as f32);
    assert_eq!(at(1, 2, 5), 2.0);
    assert_eq!(at(2, 2, 5), -5.0);

    let p = "/data/0/meshes/rho";
    assert_eq!(attr(&s, p, "geometry"), Some(&AttrValue::from("thetaMode")));
    assert_eq!(attr(&s, p, "geometryParameters"), Some(&AttrValue::from("m=1; imag=+")));
    assert_eq!(
        attr(&s, p, "comment"),
        Some(&AttrValue::from("Density of electrons in azimuthal decomposition"))
    );
    assert_eq!(
        attr(&s, p, "axisLabels"),
        Some(&AttrValue::StrArray(vec!["r".into(), "z".into()]))
    );
    assert_eq!(
        attr(&s, p, "unitDimension"),
        Some(&AttrValue::F64Array(vec![-3.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0]))
    );
    assert_eq!(attr(&s, p, "position"), Some(&f32s(&[0.0, 0.0])));
    assert_eq!(attr(&s, p, "fieldSmoothing"), Some(&AttrValue::from("none")));
}

#[test]
fn e_field_is_yee_staggered() {
    let s = build();
    assert_eq!(attr(&s, "/data/0/meshes/E", "geometry"), Some(&AttrValue::from("cartesian")));
    assert_eq!(attr(&s, "/data/0/meshes/E", "timeOffset"), Some(&AttrValue::F64(0.0)));
    for (axis, position) in [("x", [0.0, 0.5]), ("y", [0.5, 0.0]), ("z", [0.0, 0.0])] {
        let path = format!("/data/0/meshes/E/{axis}");
        assert_eq!(attr(&s, &path, "position"), Some(&f32s(&position)), "{path}");
        assert_eq!(attr(&s, &path, "unitSI"), Some(&AttrValue::F64(1e9)), "{path}");
        let node = s.lookup(&path).unwrap();
        assert_eq!(s.kind(node).unwrap(), NodeKind::Dataset);
    }
}

#[test]
fn b_field_has_constant_transverse_components() {
    let s = build();
    let (nx, ny) = GRID;
    assert_eq!(attr(&s, "/data/0/meshes/B", "timeOffset"), Some(&AttrValue::F64(0.25)));
    for axis in ["x", "y"] {
        let path = format!("/data/0/meshes/B/{axis}");
        let node = s.lookup(&path).unwrap();
        assert_eq!(s.kind(node).unwrap(), NodeKind::Group);
        assert_eq!(attr(&s, &path, "value"), Some(&AttrValue::F64(0.0)));
        assert_eq!(
            attr(&s, &path, "shape"),
            Some(&AttrValue::U64Array(vec![nx as u64, ny as u64]))
        );
        assert_eq!(attr(&s, &path, "unitSI"), Some(&AttrValue::F64(3.3)));
    }
    assert_eq!(attr(&s, "/data/0/meshes/B/z", "position"), Some(&f32s(&[0.5, 0.5])));
}

// ── Particles ────────────────────────────────────────────────────────

#[test]
fn electron_species_records() {
    let s = build();
    let e = "/data/0/particles/electrons";
    assert_eq!(attr(&s, e, "comment"), Some(&AttrValue::from("My first electron species")));
    assert_eq!(attr(&s, e, "particleShape"), Some(&AttrValue::F64(3.0)));
    assert_eq!(attr(&s, e, "particleInterpolation"), Some(&AttrValue::from("uniform")));

    let charge = format!("{e}/charge");
    assert_eq!(attr(&s, &charge, "value"), Some(&AttrValue::F64(-1.0)));
    assert_eq!(attr(&s, &charge, "shape"), Some(&AttrValue::U64Array(vec![128])));
    assert_eq!(attr(&s, &charge, "macroWeighted"), Some(&AttrValue::U32(0)));
    assert_eq!(attr(&s, &charge, "unitSI"), Some(&AttrValue::F64(1.602_176_57e-19)));

    let mass = format!("{e}/mass");
    assert_eq!(attr(&s, &mass, "unitSI"), Some(&AttrValue::F64(9.109_382_91e-31)));

    let weighting = s.lookup(&format!("{e}/weighting")).unwrap();
    let ds = s.dataset(weighting).unwrap();
    assert_eq!(ds.shape.as_slice(), &[128]);
    assert_eq!(ds.data.as_f32().unwrap()[127], 127.0);

    let offset_z = format!("{e}/positionOffset/z");
    assert_eq!(attr(&s, &offset_z, "value"), Some(&AttrValue::F32(100.0)));
    assert_eq!(
        attr(&s, &format!("{e}/positionOffset"), "weightingPower"),
        Some(&AttrValue::F64(0.0))
    );

    let momentum = format!("{e}/momentum");
    assert_eq!(attr(&s, &momentum, "timeOffset"), Some(&AttrValue::F64(0.25)));
    assert_eq!(
        attr(&s, &momentum, "unitDimension"),
        Some(&AttrValue::F64Array(vec![1.0, 1.0, -1.0, 0.0, 0.0, 0.0, 0.0]))
    );
}

#[test]
fn patch_table() {
    let s = build();
    let p = "/data/0/particles/electrons/particlePatches";
    let offsets = s.lookup(&format!("{p}/numParticlesOffset")).unwrap();
    assert_eq!(
        s.dataset(offsets).unwrap().data.as_u64().unwrap(),
        &[0, 32, 64, 96]
    );
    let ox = s.lookup(&format!("{p}/offset/x")).unwrap();
    assert_eq!(
        s.dataset(ox).unwrap().data.as_f32().unwrap(),
        &[0.0, 128.0, 256.0, 384.0]
    );
    assert_eq!(attr(&s, &format!("{p}/extent/y"), "value"), Some(&AttrValue::F32(128.0)));
    assert_eq!(attr(&s, &format!("{p}/extent/z"), "value"), Some(&AttrValue::F32(1.0)));
    assert_eq!(attr(&s, &format!("{p}/offset/x"), "unitSI"), Some(&AttrValue::F64(1e-9)));
}

// ── Determinism and persistence ──────────────────────────────────────

#[test]
fn hash_is_reproducible() {
    assert_eq!(content_hash(&build()).unwrap(), content_hash(&build()).unwrap());
}

#[test]
fn file_round_trip_preserves_hash() {
    let path = scratch_path("sample_round_trip");
    let mut c = Container::new(FileStore::create(&path));
    write_sample_with(
        &mut c,
        &fixed_root_config(),
        &mut FixtureProvider::new(),
        IterationIndex(0),
    )
    .unwrap();
    c.close().unwrap();

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(
        content_hash(&reopened).unwrap(),
        content_hash(&build()).unwrap()
    );
    std::fs::remove_file(&path).unwrap();
}
