//! Closed enumerations for string-valued schema attributes.
//!
//! Each enumeration has a fixed set of recognized spellings. Parsing any
//! other text fails with [`ConfigError::UnrecognizedValue`]; text that
//! reaches the container is always produced by [`name`](Geometry::name).

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every recognized value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The spelling written to the container.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    _ => Err(ConfigError::UnrecognizedValue {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

text_enum! {
    /// Mesh geometry (`geometry` attribute).
    Geometry, "geometry" {
        /// Cartesian grid.
        Cartesian => "cartesian",
        /// Cylindrical r-z grid with azimuthal mode decomposition.
        ThetaMode => "thetaMode",
        /// Full cylindrical r-theta-z grid.
        Cylindrical => "cylindrical",
        /// Spherical r-theta-phi grid.
        Spherical => "spherical",
    }
}

text_enum! {
    /// How iterations are laid out (`iterationEncoding` attribute).
    IterationEncoding, "iteration encoding" {
        /// All iterations share one container, one group each.
        GroupBased => "groupBased",
        /// One container per iteration.
        FileBased => "fileBased",
    }
}

text_enum! {
    /// Memory layout of multi-dimensional datasets (`dataOrder`).
    DataOrder, "data order" {
        /// Row-major; the last axis varies fastest.
        C => "C",
        /// Column-major; the first axis varies fastest.
        F => "F",
    }
}

text_enum! {
    /// Maxwell solver (`fieldSolver`, ED-PIC).
    FieldSolver, "field solver" {
        /// Yee finite-difference time-domain scheme.
        Yee => "Yee",
        /// Cole-Karkkainen scheme.
        Ck => "CK",
        /// Lehe dispersion-reduced scheme.
        Lehe => "Lehe",
        /// Directional splitting.
        Ds => "DS",
        /// Pseudo-spectral time domain.
        Pstd => "PSTD",
        /// Pseudo-spectral analytical time domain.
        Psatd => "PSATD",
        /// Generalized pseudo-spectral time domain.
        Gpstd => "GPSTD",
        /// No field solver (static fields).
        None => "none",
    }
}

text_enum! {
    /// Boundary condition for fields (`fieldBoundary`, ED-PIC).
    FieldBoundary, "field boundary" {
        /// Periodic wrap.
        Periodic => "periodic",
        /// Open (absorbing) boundary.
        Open => "open",
        /// Perfectly reflecting boundary.
        Reflecting => "reflecting",
    }
}

text_enum! {
    /// Boundary condition for particles (`particleBoundary`, ED-PIC).
    ParticleBoundary, "particle boundary" {
        /// Periodic wrap.
        Periodic => "periodic",
        /// Particles leaving the domain are removed.
        Absorbing => "absorbing",
        /// Particles are mirrored back into the domain.
        Reflecting => "reflecting",
        /// Particles are re-injected with fresh momenta.
        Reinjecting => "reinjecting",
    }
}

text_enum! {
    /// Current deposition scheme (`currentDeposition`, ED-PIC).
    CurrentDeposition, "current deposition" {
        /// Charge-conserving Esirkepov scheme.
        Esirkepov => "Esirkepov",
        /// Villasenor-Buneman scheme.
        VillasenorBuneman => "VillasenorBuneman",
        /// Zig-zag scheme.
        ZigZag => "ZigZag",
        /// Direct (non charge-conserving) deposition.
        Direct => "direct",
    }
}

text_enum! {
    /// Particle pusher (`particlePush`, ED-PIC).
    ParticlePush, "particle push" {
        /// Boris rotation.
        Boris => "Boris",
        /// Vay pusher.
        Vay => "Vay",
        /// Higuera-Cary pusher.
        HigueraCary => "Higuera-Cary",
    }
}

text_enum! {
    /// Field-to-particle interpolation (`particleInterpolation`, ED-PIC).
    ParticleInterpolation, "particle interpolation" {
        /// Uniform (momentum-conserving) gather.
        Uniform => "uniform",
        /// Energy-conserving gather.
        EnergyConserving => "energyConserving",
    }
}

text_enum! {
    /// Charge-conservation correction (`chargeCorrection`, ED-PIC).
    ChargeCorrection, "charge correction" {
        /// No correction.
        None => "none",
        /// Marder correction.
        Marder => "Marder",
        /// Boris correction.
        Boris => "Boris",
    }
}

/// A smoothing filter applied to fields, currents or particles.
///
/// Serialized as a name attribute plus, for anything but `none`, a
/// `...Parameters` attribute of `key=value` pairs joined by `;`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Smoothing {
    /// No smoothing.
    None,
    /// Binomial filter.
    Binomial {
        /// Apply the filter every `period` steps.
        period: u32,
        /// Filter passes per application.
        num_passes: u32,
        /// Whether a compensation pass follows.
        compensator: bool,
    },
}

impl Smoothing {
    /// The spelling written to the name attribute.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Binomial { .. } => "Binomial",
        }
    }

    /// The parameter string, or `None` for [`Smoothing::None`].
    pub fn parameters(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Binomial {
                period,
                num_passes,
                compensator,
            } => Some(format!(
                "period={period};numPasses={num_passes};compensator={compensator}"
            )),
        }
    }

    /// Parse a name and its optional parameter string.
    pub fn parse(name: &str, parameters: Option<&str>) -> Result<Self, ConfigError> {
        match name {
            "none" => Ok(Self::None),
            "Binomial" => {
                let params = parameters.ok_or_else(|| ConfigError::MalformedAttribute {
                    name: "smoothingParameters".into(),
                    reason: "Binomial smoothing requires parameters".into(),
                })?;
                parse_binomial(params)
            }
            other => Err(ConfigError::UnrecognizedValue {
                kind: "smoothing",
                value: other.to_string(),
            }),
        }
    }
}

fn parse_binomial(params: &str) -> Result<Smoothing, ConfigError> {
    let malformed = |reason: String| ConfigError::MalformedAttribute {
        name: "smoothingParameters".into(),
        reason,
    };
    let mut period = None;
    let mut num_passes = None;
    let mut compensator = None;
    for pair in params.split(';').filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| malformed(format!("expected key=value, got {pair:?}")))?;
        match key {
            "period" => {
                period =
                    Some(value.parse().map_err(|_| malformed(format!("bad period {value:?}")))?)
            }
            "numPasses" => {
                num_passes =
                    Some(value.parse().map_err(|_| malformed(format!("bad numPasses {value:?}")))?)
            }
            "compensator" => {
                compensator = Some(
                    value
                        .parse()
                        .map_err(|_| malformed(format!("bad compensator {value:?}")))?,
                )
            }
            other => return Err(malformed(format!("unknown key {other:?}"))),
        }
    }
    match (period, num_passes, compensator) {
        (Some(period), Some(num_passes), Some(compensator)) => Ok(Smoothing::Binomial {
            period,
            num_passes,
            compensator,
        }),
        _ => Err(malformed(
            "period, numPasses and compensator are all required".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for g in Geometry::ALL {
            assert_eq!(g.name().parse::<Geometry>(), Ok(*g));
        }
        for s in FieldSolver::ALL {
            assert_eq!(s.name().parse::<FieldSolver>(), Ok(*s));
        }
        for p in ParticlePush::ALL {
            assert_eq!(p.name().parse::<ParticlePush>(), Ok(*p));
        }
    }

    #[test]
    fn unrecognized_text_is_config_error() {
        let err = "Cartesian".parse::<Geometry>().unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnrecognizedValue {
                kind: "geometry",
                value: "Cartesian".into()
            }
        );
    }

    #[test]
    fn binomial_parameters_string() {
        let s = Smoothing::Binomial {
            period: 1,
            num_passes: 2,
            compensator: false,
        };
        assert_eq!(s.name(), "Binomial");
        assert_eq!(
            s.parameters().as_deref(),
            Some("period=1;numPasses=2;compensator=false")
        );
        assert_eq!(Smoothing::None.parameters(), None);
    }

    #[test]
    fn smoothing_parse_round_trips() {
        let s = Smoothing::Binomial {
            period: 10,
            num_passes: 4,
            compensator: true,
        };
        let params = s.parameters().unwrap();
        assert_eq!(Smoothing::parse(s.name(), Some(&params)), Ok(s));
        assert_eq!(Smoothing::parse("none", None), Ok(Smoothing::None));
    }

    #[test]
    fn smoothing_parse_rejects_incomplete_parameters() {
        assert!(Smoothing::parse("Binomial", None).is_err());
        assert!(Smoothing::parse("Binomial", Some("period=1;numPasses=2")).is_err());
        assert!(Smoothing::parse("Gaussian", None).is_err());
    }
}
