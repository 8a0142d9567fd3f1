//! Write the reference PIC snapshot to disk.
//!
//! Demonstrates:
//!   1. Building the root configuration with ED-PIC and provenance
//!   2. Writing rho (thetaMode), E and B (cartesian) and one electron
//!      species with a 4-rank patch table
//!   3. Committing the container and re-reading it to check the hash
//!
//! Run with:
//!   cargo run --example create_sample -- [path]
//!
//! Set `RUST_LOG=debug` to see every record as it is written.

use std::error::Error;

use opmd_core::IterationIndex;
use opmd_store::{content_hash, FileStore};
use opmd_writer::sample::{write_sample_container, NUM_PARTICLES};
use opmd_writer::{Container, SeededProvider};

// ---- Parameters --------------------------------------------------------

const DEFAULT_PATH: &str = "sample.opmd";
const SEED: u64 = 42;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PATH.to_string());

    let mut container = Container::new(FileStore::create(&path));
    let mut provider = SeededProvider::new(SEED);
    write_sample_container(&mut container, &mut provider, IterationIndex(0))?;
    container.close()?;
    let written = content_hash(container.store())?;

    let reopened = FileStore::open(&path)?;
    let reread = content_hash(&reopened)?;
    if written != reread {
        return Err(format!("hash changed on reopen: {written:#018x} vs {reread:#018x}").into());
    }

    println!("File {path} created!");
    println!(
        "  {} nodes, {NUM_PARTICLES} electrons, content hash {written:#018x}",
        reopened.tree().node_count()
    );
    Ok(())
}
