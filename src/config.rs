//! TOML building description: simulation period, location, PV systems and bill scenarios.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::bill::calendar::{PeriodError, SimulationPeriod};
use crate::bill::types::{ExcessSellback, GridConnectionFee, PvCompensation, PvSettings, PvSystem};
use crate::fuel::FuelType;
use crate::rates::RateOverrides;

/// Building description parsed from TOML.
///
/// Every table is optional. Load with [`BuildingConfig::from_toml_file`] and check with
/// [`BuildingConfig::validate`] before use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildingConfig {
    pub simulation: SimulationConfig,
    pub location: LocationConfig,
    pub hvac: HvacConfig,
    pub bills: BillsConfig,
    pub pv_systems: Vec<PvSystemConfig>,
    /// Bill scenarios in report order.
    pub scenarios: Vec<ScenarioConfig>,
}

/// Run period within one calendar year, both ends inclusive.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub begin_month: u32,
    pub begin_day: u32,
    pub end_month: u32,
    pub end_day: u32,
    pub calendar_year: i32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            begin_month: 1,
            begin_day: 1,
            end_month: 12,
            end_day: 31,
            calendar_year: 2007,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocationConfig {
    /// Jurisdiction code used for auto rates, e.g. `"CO"`; `"US"` for national averages.
    pub state_code: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            state_code: "US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HvacConfig {
    /// Heating or cooling modeled with a distribution system efficiency.
    pub uses_distribution_system_efficiency: bool,
}

/// Electricity bill calculation method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillType {
    #[default]
    Simple,
    Detailed,
}

/// Source of a detailed electricity tariff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilityRateType {
    UserSpecified,
    Sample,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BillsConfig {
    pub electricity_bill_type: BillType,
    pub electricity_utility_rate_type: Option<UtilityRateType>,
    pub electricity_utility_rate_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PvSystemConfig {
    pub max_power_output_kw: f64,
}

/// User rate values of one fuel; omitted values are looked up.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuelRateConfig {
    /// $/month.
    pub fixed_charge: Option<f64>,
    /// $ per native unit.
    pub marginal_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationType {
    #[default]
    NetMetering,
    FeedInTariff,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellbackRateType {
    #[default]
    UserSpecified,
    RetailElectricityCost,
}

/// PV compensation of a scenario.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PvConfig {
    pub compensation_type: CompensationType,
    pub net_metering_annual_excess_sellback_rate_type: SellbackRateType,
    /// $/kWh.
    pub net_metering_annual_excess_sellback_rate: f64,
    /// $/kWh.
    pub feed_in_tariff_rate: f64,
    pub monthly_grid_connection_fee_dollars_per_kw: Option<f64>,
    pub monthly_grid_connection_fee_dollars: Option<f64>,
}

impl Default for PvConfig {
    fn default() -> Self {
        Self {
            compensation_type: CompensationType::NetMetering,
            net_metering_annual_excess_sellback_rate_type: SellbackRateType::UserSpecified,
            net_metering_annual_excess_sellback_rate: 0.03,
            feed_in_tariff_rate: 0.12,
            monthly_grid_connection_fee_dollars_per_kw: None,
            monthly_grid_connection_fee_dollars: None,
        }
    }
}

impl PvConfig {
    /// Converts to the calculator's PV settings.
    pub fn settings(&self) -> PvSettings {
        let sellback = match self.net_metering_annual_excess_sellback_rate_type {
            SellbackRateType::UserSpecified => {
                ExcessSellback::UserSpecified(self.net_metering_annual_excess_sellback_rate)
            }
            SellbackRateType::RetailElectricityCost => ExcessSellback::RetailElectricityCost,
        };
        let compensation = match self.compensation_type {
            CompensationType::FeedInTariff => {
                PvCompensation::FeedInTariff(self.feed_in_tariff_rate)
            }
            CompensationType::NetMetering => PvCompensation::NetMetering(sellback),
        };
        let grid_connection_fee = self
            .monthly_grid_connection_fee_dollars_per_kw
            .map(GridConnectionFee::PerKw)
            .or(self.monthly_grid_connection_fee_dollars.map(GridConnectionFee::Flat));

        PvSettings {
            compensation,
            grid_connection_fee,
        }
    }
}

/// One named set of tariffs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub name: String,
    pub electricity: FuelRateConfig,
    pub natural_gas: FuelRateConfig,
    pub fuel_oil: FuelRateConfig,
    pub propane: FuelRateConfig,
    pub wood_cord: FuelRateConfig,
    pub wood_pellets: FuelRateConfig,
    pub coal: FuelRateConfig,
    pub pv: PvConfig,
}

impl ScenarioConfig {
    /// Scenario with every rate on auto.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn fuel_rate(&self, fuel: FuelType) -> &FuelRateConfig {
        match fuel {
            FuelType::Electricity => &self.electricity,
            FuelType::NaturalGas => &self.natural_gas,
            FuelType::FuelOil => &self.fuel_oil,
            FuelType::Propane => &self.propane,
            FuelType::WoodCord => &self.wood_cord,
            FuelType::WoodPellets => &self.wood_pellets,
            FuelType::Coal => &self.coal,
        }
    }

    pub fn fuel_rate_mut(&mut self, fuel: FuelType) -> &mut FuelRateConfig {
        match fuel {
            FuelType::Electricity => &mut self.electricity,
            FuelType::NaturalGas => &mut self.natural_gas,
            FuelType::FuelOil => &mut self.fuel_oil,
            FuelType::Propane => &mut self.propane,
            FuelType::WoodCord => &mut self.wood_cord,
            FuelType::WoodPellets => &mut self.wood_pellets,
            FuelType::Coal => &mut self.coal,
        }
    }

    pub fn overrides(&self, fuel: FuelType) -> RateOverrides {
        let rate = self.fuel_rate(fuel);
        RateOverrides {
            fixed_charge: rate.fixed_charge,
            marginal_rate: rate.marginal_rate,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"scenarios[0].name"`).
    pub field: String,
    pub message: String,
}

impl BuildingConfig {
    /// Parses a building from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "building".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a building from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use utility_bills::config::BuildingConfig;
    ///
    /// let cfg = BuildingConfig::from_toml_str(
    ///     r#"
    /// [location]
    /// state_code = "CO"
    ///
    /// [[scenarios]]
    /// name = "Bills"
    /// electricity = { fixed_charge = 8.0 }
    /// "#,
    /// )
    /// .unwrap();
    /// assert_eq!(cfg.scenarios[0].electricity.fixed_charge, Some(8.0));
    /// assert!(cfg.validate().is_empty());
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Simulation period described by `[simulation]`.
    ///
    /// # Errors
    ///
    /// Returns a [`PeriodError`] for impossible dates or an end before the beginning.
    pub fn period(&self) -> Result<SimulationPeriod, PeriodError> {
        let s = &self.simulation;
        SimulationPeriod::new(
            s.calendar_year,
            (s.begin_month, s.begin_day),
            (s.end_month, s.end_day),
        )
    }

    pub fn pv_systems(&self) -> Vec<PvSystem> {
        self.pv_systems
            .iter()
            .map(|pv| PvSystem {
                max_power_output_kw: pv.max_power_output_kw,
            })
            .collect()
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Err(e) = self.period() {
            errors.push(ConfigError {
                field: "simulation".into(),
                message: e.to_string(),
            });
        }

        if self.location.state_code.trim().is_empty() {
            errors.push(ConfigError {
                field: "location.state_code".into(),
                message: "must not be empty".into(),
            });
        }

        for (i, pv) in self.pv_systems.iter().enumerate() {
            if !(pv.max_power_output_kw >= 0.0) {
                errors.push(ConfigError {
                    field: format!("pv_systems[{i}].max_power_output_kw"),
                    message: "must be >= 0".into(),
                });
            }
        }

        let mut names = HashSet::new();
        for (i, scenario) in self.scenarios.iter().enumerate() {
            let prefix = format!("scenarios[{i}]");
            if scenario.name.trim().is_empty() {
                errors.push(ConfigError {
                    field: format!("{prefix}.name"),
                    message: "must not be empty".into(),
                });
            } else if !names.insert(scenario.name.as_str()) {
                errors.push(ConfigError {
                    field: format!("{prefix}.name"),
                    message: format!("duplicate scenario name \"{}\"", scenario.name),
                });
            }

            for fuel in FuelType::ALL {
                let rate = scenario.fuel_rate(fuel);
                let key = fuel.label().replace(' ', "_");
                for (value, what) in [
                    (rate.fixed_charge, "fixed_charge"),
                    (rate.marginal_rate, "marginal_rate"),
                ] {
                    if value.is_some_and(|v| !(v >= 0.0)) {
                        errors.push(ConfigError {
                            field: format!("{prefix}.{key}.{what}"),
                            message: "must be >= 0".into(),
                        });
                    }
                }
            }

            let pv = &scenario.pv;
            if pv.monthly_grid_connection_fee_dollars_per_kw.is_some()
                && pv.monthly_grid_connection_fee_dollars.is_some()
            {
                errors.push(ConfigError {
                    field: format!("{prefix}.pv.monthly_grid_connection_fee_dollars"),
                    message:
                        "must not be set together with monthly_grid_connection_fee_dollars_per_kw"
                            .into(),
                });
            }
            for (value, what) in [
                (
                    Some(pv.net_metering_annual_excess_sellback_rate),
                    "net_metering_annual_excess_sellback_rate",
                ),
                (Some(pv.feed_in_tariff_rate), "feed_in_tariff_rate"),
                (
                    pv.monthly_grid_connection_fee_dollars_per_kw,
                    "monthly_grid_connection_fee_dollars_per_kw",
                ),
                (
                    pv.monthly_grid_connection_fee_dollars,
                    "monthly_grid_connection_fee_dollars",
                ),
            ] {
                if value.is_some_and(|v| !(v >= 0.0)) {
                    errors.push(ConfigError {
                        field: format!("{prefix}.pv.{what}"),
                        message: "must be >= 0".into(),
                    });
                }
            }
        }

        errors
    }
}
