//! Root metadata.

use log::info;
use opmd_core::{AttrValue, ConfigError, NodeId};
use opmd_store::{Store, StoreError};

use crate::config::RootConfig;
use crate::container::{Container, RootState};
use crate::error::WriteError;

fn set_opt<S: Store + ?Sized>(
    store: &mut S,
    node: NodeId,
    name: &str,
    value: Option<&str>,
) -> Result<(), StoreError> {
    match value {
        Some(v) => store.set_attr(node, name, v.into()),
        None => Ok(()),
    }
}

/// Write the root attribute set of `config` onto `store`'s root group.
///
/// Callers validate first; [`Container::write_root`] does.
fn write_root_attributes<S: Store + ?Sized>(
    store: &mut S,
    config: &RootConfig,
) -> Result<(), StoreError> {
    let root = store.root();
    store.set_attr(root, "openPMD", config.openpmd_version.as_str().into())?;
    store.set_attr(root, "openPMDextension", AttrValue::U32(config.extensions.bits()))?;
    store.set_attr(root, "basePath", config.base_path.as_str().into())?;
    store.set_attr(root, "meshesPath", config.meshes_path.as_str().into())?;
    store.set_attr(root, "particlesPath", config.particles_path.as_str().into())?;
    store.set_attr(root, "iterationEncoding", config.iteration_encoding.name().into())?;
    store.set_attr(root, "iterationFormat", config.iteration_format.as_str().into())?;

    let p = &config.provenance;
    set_opt(store, root, "author", p.author.as_deref())?;
    set_opt(store, root, "software", p.software.as_deref())?;
    set_opt(store, root, "softwareVersion", p.software_version.as_deref())?;
    set_opt(
        store,
        root,
        "softwareDependencies",
        p.dependencies_attr().as_deref(),
    )?;
    set_opt(store, root, "machine", p.machine.as_deref())?;
    set_opt(store, root, "date", p.date.as_deref())?;
    set_opt(store, root, "comment", p.comment.as_deref())
}

impl<S: Store> Container<S> {
    /// Write the container's root attributes. Allowed exactly once, and
    /// before any iteration.
    pub fn write_root(&mut self, config: &RootConfig) -> Result<(), WriteError> {
        let root = self.store.root();
        if self.root.is_some() || self.store.attr(root, "openPMD")?.is_some() {
            return Err(ConfigError::RootAlreadyWritten.into());
        }
        config.validate()?;
        write_root_attributes(&mut self.store, config)?;
        self.root = Some(RootState {
            extensions: config.extensions,
            encoding: config.iteration_encoding,
        });
        info!(
            "root written: openPMD {} ({}), extensions {:#x}",
            config.openpmd_version,
            config.iteration_encoding,
            config.extensions.bits()
        );
        Ok(())
    }
}
