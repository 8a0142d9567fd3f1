//! The writer's error type.

use std::error::Error;
use std::fmt;

use opmd_core::{ConfigError, ShapeMismatch};
use opmd_store::StoreError;

/// Errors surfaced by every writer operation.
///
/// Nothing is retried and nothing is rolled back: a record left half
/// written by a [`WriteError::Store`] stays in the container.
#[derive(Debug)]
pub enum WriteError {
    /// Malformed, contradictory or repeated configuration.
    Config(ConfigError),
    /// Two arrays that must agree in shape do not.
    ShapeMismatch(ShapeMismatch),
    /// Propagated unchanged from the backing store.
    Store(StoreError),
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::ShapeMismatch(e) => write!(f, "{e}"),
            Self::Store(e) => write!(f, "store: {e}"),
        }
    }
}

impl Error for WriteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::ShapeMismatch(e) => Some(e),
            Self::Store(e) => Some(e),
        }
    }
}

impl From<ConfigError> for WriteError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ShapeMismatch> for WriteError {
    fn from(e: ShapeMismatch) -> Self {
        Self::ShapeMismatch(e)
    }
}

impl From<StoreError> for WriteError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
