//! Reference dataset of average fuel rates by jurisdiction and PADD region.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;

use serde::Deserialize;
use thiserror::Error;

use crate::fuel::FuelType;

const AVERAGE_RATES_CSV: &str = include_str!("../../data/average_rates.csv");
const REGIONS_CSV: &str = include_str!("../../data/regions.csv");

/// Jurisdiction code of the national averages.
pub const NATIONAL: &str = "US";

/// Errors raised while loading rate data.
#[derive(Debug, Error)]
pub enum RateTableError {
    #[error("rate data: {0}")]
    Csv(#[from] csv::Error),

    #[error("rate data: jurisdiction \"{jurisdiction}\" lists {fuel} twice")]
    Duplicate {
        jurisdiction: String,
        fuel: FuelType,
    },
}

/// Average rate of one fuel in one jurisdiction or region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageRate {
    /// Average total cost per native unit, fixed charges included.
    pub rate: f64,
    /// Average annual household consumption in native units (electricity and natural gas).
    pub household_consumption: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RateRecord {
    jurisdiction: String,
    fuel: FuelType,
    average_rate: f64,
    household_consumption: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RegionRecord {
    state_code: String,
    state_name: String,
    region: String,
}

#[derive(Debug, Clone)]
struct Jurisdiction {
    name: String,
    region: String,
}

/// Immutable lookup table of average rates.
///
/// Keys are jurisdiction codes (`"CO"`), PADD region names (`"PADD 1C"`) or [`NATIONAL`].
#[derive(Debug, Clone)]
pub struct RateTable {
    rates: HashMap<(String, FuelType), AverageRate>,
    jurisdictions: BTreeMap<String, Jurisdiction>,
}

impl RateTable {
    /// Loads the dataset compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns [`RateTableError`] if the embedded CSV is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use utility_bills::fuel::FuelType;
    /// use utility_bills::rates::RateTable;
    ///
    /// let table = RateTable::embedded().unwrap();
    /// assert_eq!(table.region_of("CO"), Some("PADD 4"));
    /// assert!(table.lookup("US", FuelType::Propane).is_some());
    /// ```
    pub fn embedded() -> Result<Self, RateTableError> {
        Self::from_csv_readers(AVERAGE_RATES_CSV.as_bytes(), REGIONS_CSV.as_bytes())
    }

    /// Loads rates and the state-to-region map from CSV sources.
    ///
    /// # Arguments
    ///
    /// * `rates` - `jurisdiction,fuel,average_rate,household_consumption` records
    /// * `regions` - `state_code,state_name,region` records
    ///
    /// # Errors
    ///
    /// Returns [`RateTableError`] on malformed records or a repeated (jurisdiction, fuel) pair.
    pub fn from_csv_readers(rates: impl Read, regions: impl Read) -> Result<Self, RateTableError> {
        let mut table = Self {
            rates: HashMap::new(),
            jurisdictions: BTreeMap::new(),
        };

        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(regions);
        for record in reader.deserialize() {
            let record: RegionRecord = record?;
            table.jurisdictions.insert(
                record.state_code,
                Jurisdiction {
                    name: record.state_name,
                    region: record.region,
                },
            );
        }

        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rates);
        for record in reader.deserialize() {
            let record: RateRecord = record?;
            let rate = AverageRate {
                rate: record.average_rate,
                household_consumption: record.household_consumption,
            };
            let key = (record.jurisdiction, record.fuel);
            if table.rates.contains_key(&key) {
                return Err(RateTableError::Duplicate {
                    jurisdiction: key.0,
                    fuel: key.1,
                });
            }
            table.rates.insert(key, rate);
        }

        Ok(table)
    }

    /// Average rate row for a jurisdiction, region or [`NATIONAL`].
    pub fn lookup(&self, key: &str, fuel: FuelType) -> Option<AverageRate> {
        self.rates.get(&(key.to_string(), fuel)).copied()
    }

    /// National average row for `fuel`.
    pub fn national(&self, fuel: FuelType) -> Option<AverageRate> {
        self.lookup(NATIONAL, fuel)
    }

    /// PADD region of a jurisdiction.
    pub fn region_of(&self, code: &str) -> Option<&str> {
        self.jurisdictions.get(code).map(|j| j.region.as_str())
    }

    /// Full name of a jurisdiction.
    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.jurisdictions.get(code).map(|j| j.name.as_str())
    }

    /// Known jurisdiction codes in alphabetical order, excluding [`NATIONAL`].
    pub fn jurisdiction_codes(&self) -> impl Iterator<Item = &str> {
        self.jurisdictions.keys().map(String::as_str)
    }
}
