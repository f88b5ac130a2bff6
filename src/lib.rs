//! Utility bill calculation from simulated fuel use.
//!
//! Per-timestep fuel series are aggregated into calendar months, rates are resolved from
//! user input or a reference table with state, region and national fallback, and each bill
//! scenario is priced with fixed, marginal and PV compensation charges.

/// Monthly aggregation, proration and the bill ledger.
pub mod bill;
pub mod config;
pub mod error;
pub mod fuel;
pub mod io;
pub mod rates;
pub mod runner;
pub mod units;
