//! Iteration path resolution.
//!
//! The root `basePath` attribute is a template holding exactly one `%T`
//! placeholder. Resolving it for an iteration substitutes the decimal
//! iteration index.

use opmd_core::{AttrValue, ConfigError, IterationIndex};
use opmd_store::Store;

use crate::error::WriteError;

/// The iteration placeholder token.
pub const PLACEHOLDER: &str = "%T";

/// Check that `template` holds exactly one [`PLACEHOLDER`].
pub fn check_template(template: &str) -> Result<(), ConfigError> {
    match template.matches(PLACEHOLDER).count() {
        1 => Ok(()),
        0 => Err(ConfigError::MissingPlaceholder {
            template: template.to_string(),
        }),
        count => Err(ConfigError::MultiplePlaceholders {
            template: template.to_string(),
            count,
        }),
    }
}

/// Substitute `iteration` into a template.
pub fn substitute(template: &str, iteration: IterationIndex) -> Result<String, ConfigError> {
    check_template(template)?;
    Ok(template.replacen(PLACEHOLDER, &iteration.to_string(), 1))
}

fn root_str<'a, S: Store + ?Sized>(store: &'a S, name: &str) -> Result<&'a str, WriteError> {
    match store.attr(store.root(), name)? {
        Some(AttrValue::Str(s)) => Ok(s.as_str()),
        Some(other) => Err(ConfigError::MalformedAttribute {
            name: name.to_string(),
            reason: format!("expected string, found {}", other.type_name()),
        }
        .into()),
        None => Err(ConfigError::MissingAttribute {
            name: name.to_string(),
        }
        .into()),
    }
}

/// Path of an iteration's group, read from the container's `basePath`.
pub fn resolve_path<S: Store + ?Sized>(
    store: &S,
    iteration: IterationIndex,
) -> Result<String, WriteError> {
    Ok(substitute(root_str(store, "basePath")?, iteration)?)
}

/// Path of an iteration's meshes group: base path plus `meshesPath`.
pub fn resolve_meshes_path<S: Store + ?Sized>(
    store: &S,
    iteration: IterationIndex,
) -> Result<String, WriteError> {
    let base = resolve_path(store, iteration)?;
    Ok(join(&base, root_str(store, "meshesPath")?))
}

/// Path of an iteration's particles group: base path plus `particlesPath`.
pub fn resolve_particles_path<S: Store + ?Sized>(
    store: &S,
    iteration: IterationIndex,
) -> Result<String, WriteError> {
    let base = resolve_path(store, iteration)?;
    Ok(join(&base, root_str(store, "particlesPath")?))
}

fn join(base: &str, relative: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{relative}")
    } else {
        format!("{base}/{relative}")
    }
}
