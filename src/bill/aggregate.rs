//! Compression of per-timestep fuel series into calendar months.

use std::collections::BTreeMap;

use crate::bill::calendar::SimulationPeriod;
use crate::error::BillError;
use crate::fuel::FuelType;
use crate::units::Unit;

/// Number of months in a billing year.
pub const MONTHS: usize = 12;

/// Series identity: fuel and whether the values are on-site production.
pub type FuelKey = (FuelType, bool);

/// One fuel's per-timestep values in its native unit.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelSeries {
    pub fuel: FuelType,
    pub is_production: bool,
    pub values: Vec<f64>,
}

impl FuelSeries {
    /// Builds a series from values already in the fuel's native unit.
    pub fn native(fuel: FuelType, is_production: bool, values: Vec<f64>) -> Self {
        Self {
            fuel,
            is_production,
            values,
        }
    }

    /// Builds a series by converting `values` from `unit` into the fuel's native unit.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::Unit`] when `unit` cannot express this fuel.
    pub fn convert(
        fuel: FuelType,
        is_production: bool,
        unit: Unit,
        values: &[f64],
    ) -> Result<Self, BillError> {
        let factor = fuel.to_native(1.0, unit)?;
        Ok(Self::native(
            fuel,
            is_production,
            values.iter().map(|v| v * factor).collect(),
        ))
    }

    pub fn key(&self) -> FuelKey {
        (self.fuel, self.is_production)
    }
}

/// Monthly totals for every fuel, consumption and production.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyFuels {
    months: BTreeMap<FuelKey, [f64; MONTHS]>,
}

impl MonthlyFuels {
    /// Builds monthly totals directly, e.g. from metered monthly data.
    ///
    /// Keys not given read as zero.
    pub fn from_months(months: impl IntoIterator<Item = (FuelKey, [f64; MONTHS])>) -> Self {
        Self {
            months: months.into_iter().collect(),
        }
    }

    /// Monthly consumption (or production) of `fuel`, zeros if absent.
    pub fn get(&self, fuel: FuelType, is_production: bool) -> [f64; MONTHS] {
        self.months
            .get(&(fuel, is_production))
            .copied()
            .unwrap_or([0.0; MONTHS])
    }

    /// Annual sum for `fuel`.
    pub fn annual(&self, fuel: FuelType, is_production: bool) -> f64 {
        self.get(fuel, is_production).iter().sum()
    }
}

/// Sums each series into 12 calendar months of the simulation period.
///
/// Series cover the simulation period only; the number of timesteps per day is derived from
/// the series length. Month `m` receives the next `simulated_days_in_month(m) *
/// timesteps_per_day` values, so months outside the period stay at zero. Fuels missing from
/// `series` are zero in every month.
///
/// # Errors
///
/// Returns [`BillError::SeriesLengthMismatch`] when series differ in length, and
/// [`BillError::PartialDay`] when the length is not a whole number of days.
pub fn aggregate_monthly(
    series: &[FuelSeries],
    period: &SimulationPeriod,
) -> Result<MonthlyFuels, BillError> {
    let Some(first) = series.first() else {
        return Ok(MonthlyFuels::default());
    };
    let len = first.values.len();
    if let Some(other) = series.iter().find(|s| s.values.len() != len) {
        return Err(BillError::SeriesLengthMismatch {
            fuel: other.fuel,
            expected: len,
            actual: other.values.len(),
        });
    }

    let num_days = period.num_days() as usize;
    if len % num_days != 0 {
        return Err(BillError::PartialDay {
            timesteps: len,
            days: num_days,
        });
    }
    let timesteps_per_day = len / num_days;

    let mut months = BTreeMap::new();
    for s in series {
        let mut totals = [0.0; MONTHS];
        let mut start = 0;
        for (idx, total) in totals.iter_mut().enumerate() {
            let days = period.simulated_days_in_month(idx as u32 + 1) as usize;
            let end = start + days * timesteps_per_day;
            *total = s.values[start..end].iter().sum();
            start = end;
        }
        let entry = months.entry(s.key()).or_insert([0.0; MONTHS]);
        for (acc, v) in entry.iter_mut().zip(totals) {
            *acc += v;
        }
    }

    Ok(MonthlyFuels { months })
}
