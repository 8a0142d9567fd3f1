//! Error types shared by the store and the writers.
//!
//! Two kinds originate in the schema layer: [`ConfigError`] for
//! malformed or contradictory configuration, and [`ShapeMismatch`] for
//! arrays that must agree in shape but do not. Both are detected before
//! any data for the affected record is committed.

use std::error::Error;
use std::fmt;

/// Configuration errors, raised at the point of detection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A path template has no `%T` placeholder.
    MissingPlaceholder {
        /// The offending template.
        template: String,
    },
    /// A path template has more than one `%T` placeholder.
    MultiplePlaceholders {
        /// The offending template.
        template: String,
        /// Number of placeholder occurrences found.
        count: usize,
    },
    /// A required root attribute is absent from the container.
    MissingAttribute {
        /// Attribute name.
        name: String,
    },
    /// An attribute is present but has the wrong type or content.
    MalformedAttribute {
        /// Attribute name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
    /// Root attributes were already written for this container.
    RootAlreadyWritten,
    /// Iteration-scoped data was requested before the root was written.
    RootNotWritten,
    /// Text does not name a recognized value of a closed enumeration.
    UnrecognizedValue {
        /// The enumeration being parsed (e.g. `"geometry"`).
        kind: &'static str,
        /// The unrecognized text.
        value: String,
    },
    /// A node with this name already exists under the parent.
    DuplicateRecord {
        /// Container path of the existing node.
        path: String,
    },
    /// A configuration field failed validation.
    InvalidField {
        /// Description of the validation failure.
        reason: String,
    },
    /// A particle-patch layout cannot be partitioned as requested.
    InvalidPatchLayout {
        /// Description of the layout problem.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPlaceholder { template } => {
                write!(f, "path template {template:?} has no %T placeholder")
            }
            Self::MultiplePlaceholders { template, count } => {
                write!(
                    f,
                    "path template {template:?} has {count} %T placeholders, expected one"
                )
            }
            Self::MissingAttribute { name } => {
                write!(f, "required root attribute '{name}' is missing")
            }
            Self::MalformedAttribute { name, reason } => {
                write!(f, "attribute '{name}' is malformed: {reason}")
            }
            Self::RootAlreadyWritten => write!(f, "root attributes already written"),
            Self::RootNotWritten => write!(f, "root attributes have not been written"),
            Self::UnrecognizedValue { kind, value } => {
                write!(f, "unrecognized {kind} {value:?}")
            }
            Self::DuplicateRecord { path } => write!(f, "'{path}' already exists"),
            Self::InvalidField { reason } => write!(f, "invalid field: {reason}"),
            Self::InvalidPatchLayout { reason } => {
                write!(f, "invalid patch layout: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Two arrays that must share a shape do not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeMismatch {
    /// What was being compared (e.g. `"rho mode 1"`).
    pub what: String,
    /// The shape the array was required to have.
    pub expected: Vec<u64>,
    /// The shape it actually had.
    pub found: Vec<u64>,
}

impl ShapeMismatch {
    /// Build a mismatch report from any two shape-like slices.
    pub fn new(what: impl Into<String>, expected: &[u64], found: &[u64]) -> Self {
        Self {
            what: what.into(),
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shape mismatch for {}: expected {:?}, found {:?}",
            self.what, self.expected, self.found
        )
    }
}

impl Error for ShapeMismatch {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_template() {
        let e = ConfigError::MissingPlaceholder {
            template: "/data/".into(),
        };
        assert_eq!(e.to_string(), "path template \"/data/\" has no %T placeholder");
    }

    #[test]
    fn shape_mismatch_reports_both_shapes() {
        let e = ShapeMismatch::new("rho mode 1", &[32, 64], &[32, 63]);
        assert_eq!(
            e.to_string(),
            "shape mismatch for rho mode 1: expected [32, 64], found [32, 63]"
        );
    }
}
