//! Report export and time-series input.

pub mod export;
pub mod timeseries;

pub use export::{OutputFormat, export_report};
pub use timeseries::{load_timeseries, read_timeseries};
