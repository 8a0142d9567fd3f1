//! openPMD extensions and the `openPMDextension` bitmask.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A recognized openPMD extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Extension {
    /// Electro-dynamic particle-in-cell extension (`ED-PIC`, bit 1).
    EdPic,
}

impl Extension {
    /// Every extension this crate knows, in bit order.
    pub const ALL: [Extension; 1] = [Extension::EdPic];

    /// Bit this extension occupies in the `openPMDextension` mask.
    pub fn bit(self) -> u32 {
        match self {
            Self::EdPic => 1,
        }
    }

    /// Canonical extension identifier.
    pub fn name(self) -> &'static str {
        match self {
            Self::EdPic => "ED-PIC",
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Extension {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| ConfigError::UnrecognizedValue {
                kind: "extension",
                value: s.to_string(),
            })
    }
}

/// A set of enabled extensions, serialized as a `u32` bitmask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ExtensionSet {
    bits: u32,
}

impl ExtensionSet {
    /// No extensions enabled (`openPMDextension = 0`).
    pub fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Enable an extension.
    pub fn insert(&mut self, ext: Extension) {
        self.bits |= ext.bit();
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, ext: Extension) -> Self {
        self.insert(ext);
        self
    }

    /// Whether an extension is enabled.
    pub fn contains(&self, ext: Extension) -> bool {
        self.bits & ext.bit() != 0
    }

    /// The bitmask written to the root `openPMDextension` attribute.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Decode a stored bitmask. Bits that name no known extension are
    /// a configuration error.
    pub fn from_bits(bits: u32) -> Result<Self, ConfigError> {
        let known = Extension::ALL.iter().fold(0, |acc, e| acc | e.bit());
        if bits & !known != 0 {
            return Err(ConfigError::UnrecognizedValue {
                kind: "openPMDextension bitmask",
                value: format!("{bits:#x}"),
            });
        }
        Ok(Self { bits })
    }

    /// Iterate over enabled extensions in bit order.
    pub fn iter(&self) -> impl Iterator<Item = Extension> + '_ {
        Extension::ALL.into_iter().filter(|e| self.contains(*e))
    }
}

impl FromIterator<Extension> for ExtensionSet {
    fn from_iter<I: IntoIterator<Item = Extension>>(iter: I) -> Self {
        let mut set = Self::empty();
        for ext in iter {
            set.insert(ext);
        }
        set
    }
}
