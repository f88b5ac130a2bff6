//! Error types for bill calculation.

use thiserror::Error;

use crate::bill::calendar::PeriodError;
use crate::fuel::FuelType;
use crate::units::UnitError;

/// Result type alias using [`BillError`].
pub type Result<T> = std::result::Result<T, BillError>;

/// Errors raised while reading inputs or computing bills.
#[derive(Debug, Error)]
pub enum BillError {
    /// Unsupported billing setup; fatal to the whole run.
    #[error("{0}")]
    Configuration(String),

    /// No marginal rate at any lookup tier for a fuel in use; fatal to the scenario.
    #[error("Could not find a marginal {fuel} rate.")]
    MissingMarginalRate { fuel: FuelType },

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error("invalid simulation period: {0}")]
    Period(#[from] PeriodError),

    #[error("{fuel} series has {actual} timesteps, expected {expected}")]
    SeriesLengthMismatch {
        fuel: FuelType,
        expected: usize,
        actual: usize,
    },

    #[error("{timesteps} timesteps do not divide evenly into {days} simulated days")]
    PartialDay { timesteps: usize, days: usize },

    #[error("unrecognised time series column \"{0}\"")]
    UnknownColumn(String),

    #[error("invalid number \"{value}\" in column \"{column}\" at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
