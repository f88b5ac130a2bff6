//! Fuel catalogue: billed fuel types and their native units.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::units::{self, Unit, UnitError};

/// Fuel billed by the utility bill calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Electricity,
    NaturalGas,
    FuelOil,
    Propane,
    WoodCord,
    WoodPellets,
    Coal,
}

impl FuelType {
    /// All fuels in report order.
    pub const ALL: [FuelType; 7] = [
        FuelType::Electricity,
        FuelType::NaturalGas,
        FuelType::FuelOil,
        FuelType::Propane,
        FuelType::WoodCord,
        FuelType::WoodPellets,
        FuelType::Coal,
    ];

    /// Display name used in report keys.
    pub fn name(self) -> &'static str {
        match self {
            Self::Electricity => "Electricity",
            Self::NaturalGas => "Natural Gas",
            Self::FuelOil => "Fuel Oil",
            Self::Propane => "Propane",
            Self::WoodCord => "Wood Cord",
            Self::WoodPellets => "Wood Pellets",
            Self::Coal => "Coal",
        }
    }

    /// Lower-case label used in warnings and rate queries.
    pub fn label(self) -> &'static str {
        match self {
            Self::Electricity => "electricity",
            Self::NaturalGas => "natural gas",
            Self::FuelOil => "fuel oil",
            Self::Propane => "propane",
            Self::WoodCord => "wood cord",
            Self::WoodPellets => "wood pellets",
            Self::Coal => "coal",
        }
    }

    /// Unit in which consumption is aggregated and rates are quoted.
    pub fn native_unit(self) -> Unit {
        match self {
            Self::Electricity => Unit::KilowattHour,
            Self::NaturalGas => Unit::Therm,
            Self::FuelOil | Self::Propane => Unit::Gallon,
            Self::WoodCord | Self::WoodPellets | Self::Coal => Unit::Kbtu,
        }
    }

    /// Heat content (kBtu/gal) for fuels billed by volume.
    pub fn heat_content_kbtu_per_gal(self) -> Option<f64> {
        match self {
            Self::FuelOil => Some(139.0),
            Self::Propane => Some(91.6),
            _ => None,
        }
    }

    /// Converts a quantity into this fuel's native unit.
    ///
    /// Energy quantities of fuels billed by volume go through the heat content.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::Unsupported`] when no conversion path exists, e.g. a volume of
    /// electricity.
    pub fn to_native(self, value: f64, unit: Unit) -> Result<f64, UnitError> {
        let native = self.native_unit();
        match self.heat_content_kbtu_per_gal() {
            Some(heat_content) if unit.is_energy() => {
                Ok(units::convert(value, unit, Unit::Kbtu)? / heat_content)
            }
            _ => units::convert(value, unit, native),
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FuelType {
    type Err = String;

    /// Accepts display names, labels and snake_case identifiers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', " ");
        Self::ALL
            .into_iter()
            .find(|fuel| fuel.label() == wanted)
            .ok_or_else(|| format!("unknown fuel type \"{s}\""))
    }
}
