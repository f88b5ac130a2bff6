//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use std::path::Path;

use utility_bills::bill::{FuelSeries, MonthlyFuels, SimulationPeriod, aggregate_monthly};
use utility_bills::config::{BuildingConfig, ScenarioConfig};
use utility_bills::fuel::FuelType;
use utility_bills::io::load_timeseries;
use utility_bills::rates::RateTable;

/// Reference rates compiled into the crate.
pub fn rate_table() -> RateTable {
    RateTable::embedded().expect("embedded rate data should load")
}

/// Rate table without any rows, as for a location outside the dataset.
pub fn empty_rate_table() -> RateTable {
    RateTable::from_csv_readers(
        "jurisdiction,fuel,average_rate,household_consumption\n".as_bytes(),
        "state_code,state_name,region\n".as_bytes(),
    )
    .expect("empty rate data should load")
}

/// Loads a building file under `scenarios/`.
pub fn building(name: &str) -> BuildingConfig {
    BuildingConfig::from_toml_file(&Path::new("scenarios").join(name))
        .expect("building file should parse")
}

/// Loads and aggregates a time-series file under `scenarios/` for `config`'s period.
pub fn monthly_from_file(config: &BuildingConfig, name: &str) -> MonthlyFuels {
    let series = load_timeseries(&Path::new("scenarios").join(name))
        .expect("time series should load");
    let period = config.period().expect("period should be valid");
    aggregate_monthly(&series, &period).expect("series should aggregate")
}

/// Building in `state_code` for calendar year `year` with the given scenarios.
pub fn building_with(
    state_code: &str,
    year: i32,
    scenarios: Vec<ScenarioConfig>,
) -> BuildingConfig {
    let mut cfg = BuildingConfig {
        scenarios,
        ..BuildingConfig::default()
    };
    cfg.simulation.calendar_year = year;
    cfg.location.state_code = state_code.to_string();
    cfg
}

/// Constant hourly use of `fuel` totalling `annual` native units over the period.
pub fn hourly_series(
    period: &SimulationPeriod,
    fuel: FuelType,
    is_production: bool,
    annual: f64,
) -> FuelSeries {
    let steps = period.num_days() as usize * 24;
    FuelSeries::native(fuel, is_production, vec![annual / steps as f64; steps])
}

/// Aggregates constant hourly series of `(fuel, annual)` consumption for `config`.
pub fn flat_monthly(config: &BuildingConfig, fuels: &[(FuelType, f64)]) -> MonthlyFuels {
    let period = config.period().expect("period should be valid");
    let series: Vec<FuelSeries> = fuels
        .iter()
        .map(|&(fuel, annual)| hourly_series(&period, fuel, false, annual))
        .collect();
    aggregate_monthly(&series, &period).expect("series should aggregate")
}
