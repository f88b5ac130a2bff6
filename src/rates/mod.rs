//! Reference rate data and tariff resolution.

pub mod resolver;
pub mod table;

pub use resolver::{
    Fallback, RateOverrides, RateQuote, RateResolver, RateWarning, Resolution,
    default_fixed_charge,
};
pub use table::{AverageRate, NATIONAL, RateTable, RateTableError};
