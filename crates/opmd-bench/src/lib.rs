//! Benchmark profiles for the opmd writer.
//!
//! - [`bench_root_config`]: the sample root set with pinned provenance
//! - [`sample_tree`]: the full reference snapshot in memory
//! - [`mode_inputs`]: seeded azimuthal-mode arrays of any size

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use ndarray::Array2;
use num_complex::Complex64;
use opmd_core::{Extension, IterationIndex};
use opmd_store::TreeStore;
use opmd_writer::sample::write_sample_with;
use opmd_writer::{Container, DataProvider, RootConfig, SeededProvider, WriteError};

/// Root configuration with ED-PIC and fixed provenance, so repeated
/// builds produce identical trees.
pub fn bench_root_config() -> RootConfig {
    let mut config = RootConfig::default();
    config.extensions.insert(Extension::EdPic);
    config.provenance.software = Some("opmd-bench".into());
    config.provenance.software_version = Some(env!("CARGO_PKG_VERSION").into());
    config.provenance.date = Some("2015-12-02 17:30:00 +0100".into());
    config
}

/// Build the reference snapshot from seeded data.
pub fn sample_tree(seed: u64) -> Result<TreeStore, WriteError> {
    let mut container = Container::new(TreeStore::new());
    write_sample_with(
        &mut container,
        &bench_root_config(),
        &mut SeededProvider::new(seed),
        IterationIndex(0),
    )?;
    container.close()?;
    Ok(container.into_store())
}

/// Mode-0 and mode-1 arrays of shape `(nr, nz)`.
pub fn mode_inputs(nr: usize, nz: usize, seed: u64) -> (Array2<f64>, Array2<Complex64>) {
    let mut provider = SeededProvider::new(seed);
    (
        provider.real_field("mode 0", (nr, nz)),
        provider.complex_field("mode 1", (nr, nz)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use opmd_store::content_hash;

    #[test]
    fn bench_config_is_valid() {
        bench_root_config().validate().unwrap();
    }

    #[test]
    fn sample_tree_is_deterministic() {
        let a = content_hash(&sample_tree(3).unwrap()).unwrap();
        let b = content_hash(&sample_tree(3).unwrap()).unwrap();
        let c = content_hash(&sample_tree(4).unwrap()).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
