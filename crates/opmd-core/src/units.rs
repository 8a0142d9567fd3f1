//! SI dimension vectors and scale factors.
//!
//! A [`UnitDimension`] holds the seven SI base-unit exponents of a
//! quantity in the fixed order length, mass, time, electric current,
//! thermodynamic temperature, amount of substance, luminous intensity.

/// Elementary charge in coulombs.
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_57e-19;

/// Electron rest mass in kilograms.
pub const ELECTRON_MASS: f64 = 9.109_382_91e-31;

/// One nanometer in meters.
pub const NANOMETER: f64 = 1e-9;

/// One femtosecond in seconds.
pub const FEMTOSECOND: f64 = 1e-15;

/// Exponents of the seven SI base units, `(L, M, T, I, Θ, N, J)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitDimension(pub [f64; 7]);

impl UnitDimension {
    /// Number of base units.
    pub const WIDTH: usize = 7;

    /// A dimensionless quantity.
    pub const DIMENSIONLESS: Self = Self([0.0; 7]);

    /// Build from integer exponents in `(L, M, T, I, Θ, N, J)` order.
    pub const fn from_exponents(e: [i8; 7]) -> Self {
        Self([
            e[0] as f64,
            e[1] as f64,
            e[2] as f64,
            e[3] as f64,
            e[4] as f64,
            e[5] as f64,
            e[6] as f64,
        ])
    }

    /// Exponent of length.
    pub fn length(&self) -> f64 {
        self.0[0]
    }

    /// Exponent of mass.
    pub fn mass(&self) -> f64 {
        self.0[1]
    }

    /// Exponent of time.
    pub fn time(&self) -> f64 {
        self.0[2]
    }

    /// Exponent of electric current.
    pub fn current(&self) -> f64 {
        self.0[3]
    }

    /// Dimension of the product of two quantities.
    pub fn product(self, other: Self) -> Self {
        let mut out = self.0;
        for (o, b) in out.iter_mut().zip(other.0) {
            *o += b;
        }
        Self(out)
    }

    /// The vector as written to the `unitDimension` attribute.
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}

/// Physical quantities written by the PIC writers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Charge density, C/m³.
    ChargeDensity,
    /// Electric field, V/m.
    ElectricField,
    /// Magnetic flux density, T.
    MagneticField,
    /// Electric charge, C.
    Charge,
    /// Mass, kg.
    Mass,
    /// Length, m.
    Length,
    /// Time, s.
    Time,
    /// Momentum, kg·m/s.
    Momentum,
    /// Macro-particle weighting (number of real particles).
    Weighting,
}

impl Quantity {
    /// SI dimension of the quantity.
    pub fn unit_dimension(self) -> UnitDimension {
        let e = match self {
            Self::ChargeDensity => [-3, 0, 1, 1, 0, 0, 0],
            Self::ElectricField => [1, 1, -3, -1, 0, 0, 0],
            Self::MagneticField => [0, 1, -2, -1, 0, 0, 0],
            Self::Charge => [0, 0, 1, 1, 0, 0, 0],
            Self::Mass => [0, 1, 0, 0, 0, 0, 0],
            Self::Length => [1, 0, 0, 0, 0, 0, 0],
            Self::Time => [0, 0, 1, 0, 0, 0, 0],
            Self::Momentum => [1, 1, -1, 0, 0, 0, 0],
            Self::Weighting => [0, 0, 0, 0, 0, 0, 0],
        };
        UnitDimension::from_exponents(e)
    }

    /// Conventional `unitSI` for data stored in simulation units:
    /// charge in e, mass in mₑ, lengths in nm, momentum in e·(kg·m/s)/C,
    /// everything else already SI.
    pub fn default_unit_si(self) -> f64 {
        match self {
            Self::Charge | Self::Momentum => ELEMENTARY_CHARGE,
            Self::Mass => ELECTRON_MASS,
            Self::Length => NANOMETER,
            Self::Time => FEMTOSECOND,
            Self::ChargeDensity | Self::ElectricField | Self::MagneticField | Self::Weighting => {
                1.0
            }
        }
    }
}
