//! Runs every bill scenario of a building against its monthly fuel totals.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info};

use crate::bill::aggregate::MonthlyFuels;
use crate::bill::calculator::BillCalculator;
use crate::bill::types::{FuelRate, ScenarioBill};
use crate::config::{BillType, BuildingConfig, ScenarioConfig, UtilityRateType};
use crate::error::{BillError, Result};
use crate::fuel::FuelType;
use crate::rates::{RateResolver, RateTable, RateWarning};

/// A scenario that could not be billed.
#[derive(Debug)]
pub struct ScenarioFailure {
    pub name: String,
    pub errors: Vec<BillError>,
}

/// A rate notice raised while resolving a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioWarning {
    pub scenario: String,
    pub warning: RateWarning,
}

impl fmt::Display for ScenarioWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.scenario, self.warning)
    }
}

/// Outcome of a bill run.
#[derive(Debug, Default)]
pub struct BillReport {
    /// Successful scenarios in configuration order.
    pub bills: Vec<ScenarioBill>,
    pub failures: Vec<ScenarioFailure>,
    pub warnings: Vec<ScenarioWarning>,
}

/// Checks run-wide requirements that no scenario can work around.
///
/// # Errors
///
/// Returns [`BillError::Configuration`] for distribution system efficiency HVAC and for
/// detailed electricity bills.
pub fn check_preconditions(config: &BuildingConfig) -> Result<()> {
    if config.hvac.uses_distribution_system_efficiency {
        return Err(BillError::Configuration(
            "DSE is not currently supported when calculating utility bills.".into(),
        ));
    }

    let bills = &config.bills;
    if bills.electricity_bill_type == BillType::Detailed {
        if bills.electricity_utility_rate_type == Some(UtilityRateType::UserSpecified)
            && bills.electricity_utility_rate_path.is_none()
        {
            return Err(BillError::Configuration(
                "Must specify a utility rate json path when choosing User-Specified utility rate type."
                    .into(),
            ));
        }
        return Err(BillError::Configuration(
            "Detailed electricity bills are not supported; use the Simple bill type.".into(),
        ));
    }

    Ok(())
}

/// Fuels that appear on a scenario's bill.
fn billed_fuels(monthly: &MonthlyFuels, scenario: &ScenarioConfig) -> Vec<FuelType> {
    FuelType::ALL
        .into_iter()
        .filter(|&fuel| {
            monthly.annual(fuel, false) != 0.0
                || (fuel == FuelType::Electricity && monthly.annual(fuel, true) != 0.0)
                || !scenario.overrides(fuel).is_empty()
        })
        .collect()
}

/// Resolves the concrete rate of every billed fuel.
///
/// Every fuel in use without a marginal rate is reported, not just the first.
fn scenario_rates(
    resolver: &RateResolver<'_>,
    state_code: &str,
    monthly: &MonthlyFuels,
    scenario: &ScenarioConfig,
    warnings: &mut Vec<RateWarning>,
) -> std::result::Result<BTreeMap<FuelType, FuelRate>, Vec<BillError>> {
    let mut rates = BTreeMap::new();
    let mut errors = Vec::new();

    for fuel in billed_fuels(monthly, scenario) {
        let resolution = resolver.resolve(fuel, state_code, &scenario.overrides(fuel));
        warnings.extend(resolution.warnings);

        let marginal_rate = match resolution.marginal_rate {
            Some(rate) => rate,
            None if monthly.annual(fuel, false) != 0.0 => {
                errors.push(BillError::MissingMarginalRate { fuel });
                continue;
            }
            None => 0.0,
        };
        rates.insert(
            fuel,
            FuelRate {
                fixed_charge: resolution.fixed_charge,
                marginal_rate,
            },
        );
    }

    if errors.is_empty() {
        Ok(rates)
    } else {
        Err(errors)
    }
}

/// Bills every scenario of `config`.
///
/// Scenarios are independent: one scenario failing to resolve a rate leaves the others
/// untouched and is reported in [`BillReport::failures`].
///
/// # Arguments
///
/// * `config` - Building description with scenarios, location and PV systems
/// * `monthly` - Monthly fuel totals in native units
/// * `table` - Reference rates for auto lookups
///
/// # Errors
///
/// Returns a run-fatal [`BillError`] when a precondition fails or the simulation period is
/// invalid; no scenario is evaluated in that case.
pub fn run_bills(
    config: &BuildingConfig,
    monthly: &MonthlyFuels,
    table: &RateTable,
) -> Result<BillReport> {
    check_preconditions(config)?;
    let period = config.period()?;
    let pv_systems = config.pv_systems();
    let calculator = BillCalculator::new(&period, monthly, &pv_systems);
    let resolver = RateResolver::new(table);
    let state_code = config.location.state_code.as_str();

    let mut report = BillReport::default();
    for scenario in &config.scenarios {
        let mut warnings = Vec::new();
        let rates = scenario_rates(&resolver, state_code, monthly, scenario, &mut warnings);
        report
            .warnings
            .extend(warnings.into_iter().map(|warning| ScenarioWarning {
                scenario: scenario.name.clone(),
                warning,
            }));

        match rates {
            Ok(rates) => {
                let bill =
                    calculator.scenario_bill(&scenario.name, &rates, &scenario.pv.settings());
                debug!(scenario = %scenario.name, total = bill.total(), "scenario billed");
                report.bills.push(bill);
            }
            Err(errors) => report.failures.push(ScenarioFailure {
                name: scenario.name.clone(),
                errors,
            }),
        }
    }

    info!(
        billed = report.bills.len(),
        failed = report.failures.len(),
        "bill run complete"
    );
    Ok(report)
}
