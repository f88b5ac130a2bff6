//! Monthly aggregation, proration and bill calculation.

/// Fuel series compression into calendar months.
pub mod aggregate;
/// Simulation period and fixed charge proration.
pub mod calendar;
pub mod calculator;
pub mod types;

pub use aggregate::{FuelSeries, MonthlyFuels, aggregate_monthly};
pub use calculator::BillCalculator;
pub use calendar::SimulationPeriod;
pub use types::{
    ExcessSellback, FuelBill, FuelRate, GridConnectionFee, PvCompensation, PvSettings, PvSystem,
    ScenarioBill,
};
