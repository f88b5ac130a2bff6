//! Tariff inputs and the bill ledger produced by the calculator.

use std::fmt;

use crate::bill::aggregate::MONTHS;
use crate::fuel::FuelType;

/// Concrete rate for one fuel after resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelRate {
    /// Monthly fixed charge ($/month).
    pub fixed_charge: f64,
    /// Price per native unit of the fuel.
    pub marginal_rate: f64,
}

/// Valuation of net excess production under net metering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExcessSellback {
    /// Banked excess is credited once a year at the given $/kWh (annual true-up).
    UserSpecified(f64),
    /// Excess is credited at the retail marginal rate in the month it occurs.
    RetailElectricityCost,
}

/// How on-site electricity production is compensated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PvCompensation {
    NetMetering(ExcessSellback),
    /// All production is paid at the given $/kWh.
    FeedInTariff(f64),
}

/// Monthly fee for connecting PV to the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridConnectionFee {
    /// $/month.
    Flat(f64),
    /// $/month per kW of installed PV.
    PerKw(f64),
}

impl GridConnectionFee {
    /// Monthly fee for the given installed PV capacity.
    pub fn monthly(self, pv_capacity_kw: f64) -> f64 {
        match self {
            Self::Flat(dollars) => dollars,
            Self::PerKw(dollars_per_kw) => dollars_per_kw * pv_capacity_kw,
        }
    }
}

/// PV settings of a scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PvSettings {
    pub compensation: PvCompensation,
    pub grid_connection_fee: Option<GridConnectionFee>,
}

impl Default for PvSettings {
    fn default() -> Self {
        Self {
            compensation: PvCompensation::NetMetering(ExcessSellback::UserSpecified(0.03)),
            grid_connection_fee: None,
        }
    }
}

/// An installed PV system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PvSystem {
    pub max_power_output_kw: f64,
}

/// One month of one fuel's bill.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthlyLedgerEntry {
    /// 1-based calendar month.
    pub month: u32,
    /// Consumption in native units.
    pub consumption: f64,
    /// Production in native units (electricity only).
    pub production: f64,
    pub fixed: f64,
    pub marginal: f64,
    /// Credit for production posted this month (<= 0).
    pub pv_credit: f64,
    /// Net excess production banked for the annual true-up (kWh).
    pub banked_excess: f64,
}

/// Annual bill of one fuel.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelBill {
    pub fuel: FuelType,
    pub rate: FuelRate,
    pub monthly: Vec<MonthlyLedgerEntry>,
    pub annual_fixed: f64,
    pub annual_marginal: f64,
    /// Sum of monthly credits plus the annual true-up credit (<= 0).
    pub annual_pv_credit: f64,
    /// Part of `annual_pv_credit` posted by the annual true-up.
    pub true_up_credit: f64,
    /// Whether the report carries a fixed charge line for this fuel.
    pub has_fixed_line: bool,
    /// Whether the report carries a PV credit line for this fuel.
    pub has_pv_line: bool,
}

impl FuelBill {
    /// Fixed plus marginal plus PV credit.
    pub fn total(&self) -> f64 {
        self.annual_fixed + self.annual_marginal + self.annual_pv_credit
    }
}

/// Bills of all fuels for one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioBill {
    pub name: String,
    /// Billed fuels in [`FuelType::ALL`] order.
    pub fuels: Vec<FuelBill>,
}

impl ScenarioBill {
    pub fn fuel(&self, fuel: FuelType) -> Option<&FuelBill> {
        self.fuels.iter().find(|b| b.fuel == fuel)
    }

    /// Sum of all fuel totals.
    pub fn total(&self) -> f64 {
        self.fuels.iter().map(FuelBill::total).sum()
    }
}

impl fmt::Display for ScenarioBill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} ---", self.name)?;
        for bill in &self.fuels {
            writeln!(
                f,
                "{:<14} fixed {:>9.2}  marginal {:>9.2}  pv {:>9.2}  total {:>9.2}",
                bill.fuel.name(),
                bill.annual_fixed,
                bill.annual_marginal,
                bill.annual_pv_credit,
                bill.total()
            )?;
        }
        write!(f, "Total ($):     {:.2}", self.total())
    }
}

/// Twelve zeroed ledger entries, one per month.
pub(crate) fn empty_ledger() -> Vec<MonthlyLedgerEntry> {
    (1..=MONTHS as u32)
        .map(|month| MonthlyLedgerEntry {
            month,
            ..MonthlyLedgerEntry::default()
        })
        .collect()
}
