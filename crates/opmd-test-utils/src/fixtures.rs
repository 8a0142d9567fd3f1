//! Fixed configurations and scratch paths.
//!
//! - [`fixed_root_config`]: the sample's root set with a pinned date
//!   and machine, so content hashes are reproducible.
//! - [`scratch_path`]: a per-process file under the temp directory.

use std::path::PathBuf;

use opmd_core::Extension;
use opmd_writer::RootConfig;

pub const FIXED_DATE: &str = "2015-12-02 17:30:00 +0100";
pub const FIXED_MACHINE: &str = "fixture-host";

/// ED-PIC root configuration with every provenance field set to a
/// constant.
pub fn fixed_root_config() -> RootConfig {
    RootConfig::builder()
        .extension(Extension::EdPic)
        .author("Fixture Author <fixture@example.org>")
        .software("opmd fixtures", "0.0.0")
        .dependency("opmd", "0.0.0")
        .machine(FIXED_MACHINE)
        .date(FIXED_DATE)
        .comment("This is a dummy file for test purposes.")
        .build()
        .expect("fixture root config is valid")
}

/// Plain root configuration: no extensions, no provenance.
pub fn minimal_root_config() -> RootConfig {
    RootConfig::default()
}

/// A unique scratch file path for integration tests.
pub fn scratch_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("opmd_{tag}_{}.opmd", std::process::id()))
}
