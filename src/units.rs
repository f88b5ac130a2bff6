//! Energy and volume unit conversions.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Joules per kBtu.
const J_PER_KBTU: f64 = 1_055_055.852_62;

/// Cubic meters per US gallon.
const M3_PER_GAL: f64 = 0.003_785_411_784;

/// Units accepted on the time-series inputs and used as native fuel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Joule,
    WattHour,
    KilowattHour,
    Kbtu,
    Mbtu,
    Therm,
    CubicMeter,
    Gallon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Energy,
    Volume,
}

/// Unit conversion failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// The unit string is not recognised.
    #[error("unknown unit \"{0}\"")]
    Unknown(String),
    /// No conversion path exists between the two units.
    #[error("unsupported unit conversion from {from} to {to}")]
    Unsupported { from: Unit, to: Unit },
}

impl Unit {
    /// Dimension and factor to the dimension's base unit (J or m³).
    fn base(self) -> (Dimension, f64) {
        match self {
            Self::Joule => (Dimension::Energy, 1.0),
            Self::WattHour => (Dimension::Energy, 3_600.0),
            Self::KilowattHour => (Dimension::Energy, 3_600_000.0),
            Self::Kbtu => (Dimension::Energy, J_PER_KBTU),
            Self::Mbtu => (Dimension::Energy, J_PER_KBTU * 1_000.0),
            Self::Therm => (Dimension::Energy, J_PER_KBTU * 100.0),
            Self::CubicMeter => (Dimension::Volume, 1.0),
            Self::Gallon => (Dimension::Volume, M3_PER_GAL),
        }
    }

    /// Whether this unit measures energy (as opposed to volume).
    pub fn is_energy(self) -> bool {
        self.base().0 == Dimension::Energy
    }

    /// Short symbol, as written in input headers.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Joule => "J",
            Self::WattHour => "Wh",
            Self::KilowattHour => "kWh",
            Self::Kbtu => "kBtu",
            Self::Mbtu => "MBtu",
            Self::Therm => "therm",
            Self::CubicMeter => "m^3",
            Self::Gallon => "gal",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "j" => Ok(Self::Joule),
            "wh" => Ok(Self::WattHour),
            "kwh" => Ok(Self::KilowattHour),
            "kbtu" => Ok(Self::Kbtu),
            "mbtu" => Ok(Self::Mbtu),
            "therm" | "therms" => Ok(Self::Therm),
            "m^3" | "m3" | "m³" => Ok(Self::CubicMeter),
            "gal" | "gallon" | "gallons" => Ok(Self::Gallon),
            _ => Err(UnitError::Unknown(s.to_string())),
        }
    }
}

/// Converts `value` expressed in `from` into `to`.
///
/// # Errors
///
/// Returns [`UnitError::Unsupported`] when the units measure different quantities.
///
/// # Examples
///
/// ```
/// use utility_bills::units::{convert, Unit};
///
/// let kwh = convert(3_600_000.0, Unit::Joule, Unit::KilowattHour).unwrap();
/// assert!((kwh - 1.0).abs() < 1e-12);
/// ```
pub fn convert(value: f64, from: Unit, to: Unit) -> Result<f64, UnitError> {
    if from == to {
        return Ok(value);
    }
    let (from_dim, from_factor) = from.base();
    let (to_dim, to_factor) = to.base();
    if from_dim != to_dim {
        return Err(UnitError::Unsupported { from, to });
    }
    Ok(value * from_factor / to_factor)
}

/// Same as [`convert`] but takes unit symbols.
///
/// # Errors
///
/// Returns [`UnitError::Unknown`] for unrecognised symbols, or [`UnitError::Unsupported`].
pub fn convert_str(value: f64, from: &str, to: &str) -> Result<f64, UnitError> {
    convert(value, from.parse()?, to.parse()?)
}
