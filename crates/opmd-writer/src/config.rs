//! Container-level configuration and validation.
//!
//! [`RootConfig`] is the input to [`Container::write_root`]. It is built
//! with [`RootConfig::builder`] and checked by
//! [`validate()`](RootConfig::validate) before anything is written.
//!
//! [`Container::write_root`]: crate::Container::write_root

use std::fmt;

use chrono::{DateTime, Local};
use opmd_core::{ConfigError, Extension, ExtensionSet, IterationEncoding};

use crate::path::{check_template, PLACEHOLDER};

/// `strftime` format of the root `date` attribute.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

// ── SoftwareDependency ─────────────────────────────────────────────

/// One entry of `softwareDependencies`, rendered as `name@version`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoftwareDependency {
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
}

impl SoftwareDependency {
    /// Create a dependency entry.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let bad = |part: &str| part.is_empty() || part.contains(';') || part.contains('@');
        if bad(&self.name) || bad(&self.version) {
            return Err(ConfigError::InvalidField {
                reason: format!(
                    "software dependency {:?}@{:?} must be non-empty and free of ';' and '@'",
                    self.name, self.version
                ),
            });
        }
        Ok(())
    }
}

impl fmt::Display for SoftwareDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

// ── Provenance ─────────────────────────────────────────────────────

/// Recommended root attributes describing who wrote the container.
///
/// Every field is optional; absent fields are not written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Provenance {
    /// `author`, e.g. `"Jane Doe <jane@example.org>"`.
    pub author: Option<String>,
    /// `software`: name of the writing code.
    pub software: Option<String>,
    /// `softwareVersion`.
    pub software_version: Option<String>,
    /// `softwareDependencies`, joined with `;`.
    pub software_dependencies: Vec<SoftwareDependency>,
    /// `machine`: host the container was written on.
    pub machine: Option<String>,
    /// `date` in [`DATE_FORMAT`].
    pub date: Option<String>,
    /// `comment`: free text.
    pub comment: Option<String>,
}

impl Provenance {
    /// The current local time in [`DATE_FORMAT`].
    pub fn date_now() -> String {
        Local::now().format(DATE_FORMAT).to_string()
    }

    /// The `softwareDependencies` attribute value, or `None` if there are
    /// no dependencies.
    pub fn dependencies_attr(&self) -> Option<String> {
        if self.software_dependencies.is_empty() {
            return None;
        }
        Some(
            self.software_dependencies
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(";"),
        )
    }

    /// Check dependency spelling and the date format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for dep in &self.software_dependencies {
            dep.validate()?;
        }
        if let Some(date) = &self.date {
            DateTime::parse_from_str(date, DATE_FORMAT).map_err(|e| {
                ConfigError::MalformedAttribute {
                    name: "date".into(),
                    reason: format!("{date:?} does not match {DATE_FORMAT:?}: {e}"),
                }
            })?;
        }
        Ok(())
    }
}

// ── RootConfig ─────────────────────────────────────────────────────

/// Required and recommended root attributes of one container.
#[derive(Clone, Debug, PartialEq)]
pub struct RootConfig {
    /// `openPMD`: standard version, `MAJOR.MINOR.PATCH`. Default `"1.1.0"`.
    pub openpmd_version: String,
    /// `openPMDextension` bitmask. Default: none.
    pub extensions: ExtensionSet,
    /// `basePath` template; exactly one `%T`. Default `"/data/%T/"`.
    pub base_path: String,
    /// `meshesPath`, relative to the base path. Default `"meshes/"`.
    pub meshes_path: String,
    /// `particlesPath`, relative to the base path. Default `"particles/"`.
    pub particles_path: String,
    /// `iterationEncoding`. Default `groupBased`.
    pub iteration_encoding: IterationEncoding,
    /// `iterationFormat`; exactly one `%T`. Default `"/data/%T/"`.
    pub iteration_format: String,
    /// Recommended attributes.
    pub provenance: Provenance,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            openpmd_version: "1.1.0".into(),
            extensions: ExtensionSet::empty(),
            base_path: "/data/%T/".into(),
            meshes_path: "meshes/".into(),
            particles_path: "particles/".into(),
            iteration_encoding: IterationEncoding::GroupBased,
            iteration_format: "/data/%T/".into(),
            provenance: Provenance::default(),
        }
    }
}

impl RootConfig {
    /// Start from the defaults.
    pub fn builder() -> RootConfigBuilder {
        RootConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check every structural invariant of the root attribute set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut parts = self.openpmd_version.split('.');
        let numeric = |p: Option<&str>| {
            p.is_some_and(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
        };
        if !(numeric(parts.next()) && numeric(parts.next()) && numeric(parts.next()))
            || parts.next().is_some()
        {
            return Err(ConfigError::InvalidField {
                reason: format!(
                    "openPMD version {:?} is not MAJOR.MINOR.PATCH",
                    self.openpmd_version
                ),
            });
        }

        check_template(&self.base_path)?;
        check_template(&self.iteration_format)?;
        if self.iteration_encoding == IterationEncoding::GroupBased
            && self.iteration_format != self.base_path
        {
            return Err(ConfigError::InvalidField {
                reason: format!(
                    "groupBased iterationFormat {:?} must equal basePath {:?}",
                    self.iteration_format, self.base_path
                ),
            });
        }

        for (name, path) in [
            ("meshesPath", &self.meshes_path),
            ("particlesPath", &self.particles_path),
        ] {
            if path.is_empty()
                || path.starts_with('/')
                || !path.ends_with('/')
                || path.contains(PLACEHOLDER)
            {
                return Err(ConfigError::InvalidField {
                    reason: format!(
                        "{name} {path:?} must be a relative path ending in '/' without %T"
                    ),
                });
            }
        }
        if self.meshes_path == self.particles_path {
            return Err(ConfigError::InvalidField {
                reason: "meshesPath and particlesPath must differ".into(),
            });
        }

        self.provenance.validate()
    }

    /// Whether the ED-PIC extension is enabled.
    pub fn ed_pic(&self) -> bool {
        self.extensions.contains(Extension::EdPic)
    }
}

/// Builder for [`RootConfig`].
#[derive(Clone, Debug)]
pub struct RootConfigBuilder {
    config: RootConfig,
}

impl RootConfigBuilder {
    /// Set the openPMD standard version.
    pub fn openpmd_version(mut self, version: impl Into<String>) -> Self {
        self.config.openpmd_version = version.into();
        self
    }

    /// Enable an extension.
    pub fn extension(mut self, ext: Extension) -> Self {
        self.config.extensions.insert(ext);
        self
    }

    /// Set the `basePath` template. For `groupBased` encoding this also
    /// sets `iterationFormat`.
    pub fn base_path(mut self, template: impl Into<String>) -> Self {
        let template = template.into();
        if self.config.iteration_encoding == IterationEncoding::GroupBased {
            self.config.iteration_format = template.clone();
        }
        self.config.base_path = template;
        self
    }

    /// Set `meshesPath`.
    pub fn meshes_path(mut self, path: impl Into<String>) -> Self {
        self.config.meshes_path = path.into();
        self
    }

    /// Set `particlesPath`.
    pub fn particles_path(mut self, path: impl Into<String>) -> Self {
        self.config.particles_path = path.into();
        self
    }

    /// Set the iteration encoding and its `iterationFormat`.
    pub fn iteration_encoding(
        mut self,
        encoding: IterationEncoding,
        format: impl Into<String>,
    ) -> Self {
        self.config.iteration_encoding = encoding;
        self.config.iteration_format = format.into();
        self
    }

    /// Set `author`.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.config.provenance.author = Some(author.into());
        self
    }

    /// Set `software` and `softwareVersion`.
    pub fn software(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.config.provenance.software = Some(name.into());
        self.config.provenance.software_version = Some(version.into());
        self
    }

    /// Append a `softwareDependencies` entry.
    pub fn dependency(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.config
            .provenance
            .software_dependencies
            .push(SoftwareDependency::new(name, version));
        self
    }

    /// Set `machine`.
    pub fn machine(mut self, machine: impl Into<String>) -> Self {
        self.config.provenance.machine = Some(machine.into());
        self
    }

    /// Set `date` explicitly (must be in [`DATE_FORMAT`]).
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.config.provenance.date = Some(date.into());
        self
    }

    /// Set `date` to [`Provenance::date_now`].
    pub fn date_now(mut self) -> Self {
        self.config.provenance.date = Some(Provenance::date_now());
        self
    }

    /// Set `comment`.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.config.provenance.comment = Some(comment.into());
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<RootConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
