//! Fixed charge and marginal rate resolution with state → region → national fallback.

use std::fmt;

use crate::fuel::FuelType;
use crate::rates::table::{AverageRate, RateTable};

/// Default monthly fixed charge ($/month) when none is given.
pub fn default_fixed_charge(fuel: FuelType) -> f64 {
    match fuel {
        FuelType::Electricity | FuelType::NaturalGas => 12.0,
        _ => 0.0,
    }
}

/// User-supplied rate values for one fuel; `None` means auto.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateOverrides {
    pub fixed_charge: Option<f64>,
    pub marginal_rate: Option<f64>,
}

impl RateOverrides {
    pub fn is_empty(&self) -> bool {
        self.fixed_charge.is_none() && self.marginal_rate.is_none()
    }
}

/// Tier that finally supplied a rate when the jurisdiction had none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    Region(String),
    National,
}

/// Non-fatal notice raised while resolving a rate.
#[derive(Debug, Clone, PartialEq)]
pub enum RateWarning {
    /// The rate came from a broader tier than requested.
    Fallback {
        fuel: FuelType,
        /// Jurisdiction name, or the raw code when unknown.
        state_name: String,
        fallback: Fallback,
    },
    /// The fixed charges alone exceed the average rate, so the marginal rate is zero.
    FixedChargeExceedsAverage {
        fuel: FuelType,
        fixed_charge: f64,
        average_rate: f64,
    },
}

impl RateWarning {
    pub fn fuel(&self) -> FuelType {
        match self {
            Self::Fallback { fuel, .. } | Self::FixedChargeExceedsAverage { fuel, .. } => *fuel,
        }
    }

    /// Tier that supplied the rate, for fallback notices.
    pub fn fallback(&self) -> Option<&Fallback> {
        match self {
            Self::Fallback { fallback, .. } => Some(fallback),
            Self::FixedChargeExceedsAverage { .. } => None,
        }
    }
}

impl fmt::Display for RateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fallback {
                fuel,
                state_name,
                fallback,
            } => {
                write!(
                    f,
                    "Could not find state average {} rate based on {state_name}; ",
                    fuel.label()
                )?;
                match fallback {
                    Fallback::Region(region) => write!(f, "using region ({region}) average."),
                    Fallback::National => f.write_str("using national average."),
                }
            }
            Self::FixedChargeExceedsAverage {
                fuel,
                fixed_charge,
                average_rate,
            } => write!(
                f,
                "Fixed charge of ${fixed_charge:.2}/month exceeds the average {} rate of \
                 {average_rate}; using a marginal rate of 0.",
                fuel.label()
            ),
        }
    }
}

/// Rates of one fuel after resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub fixed_charge: f64,
    /// `None` when no tier has a rate for the fuel.
    pub marginal_rate: Option<f64>,
    /// At most one fallback notice, plus a notice when the marginal rate was clamped.
    pub warnings: Vec<RateWarning>,
}

/// Marginal and average rates of one fuel, as reported by the rates query.
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuote {
    pub fuel: FuelType,
    pub marginal_rate: Option<f64>,
    pub average_rate: Option<f64>,
    pub warnings: Vec<RateWarning>,
}

/// Resolves rates against an immutable [`RateTable`].
#[derive(Debug, Clone, Copy)]
pub struct RateResolver<'a> {
    table: &'a RateTable,
}

impl<'a> RateResolver<'a> {
    pub fn new(table: &'a RateTable) -> Self {
        Self { table }
    }

    /// Resolves the fixed charge and marginal rate of `fuel` in jurisdiction `code`.
    ///
    /// User values win; the table is only consulted for an auto marginal rate. A derived
    /// marginal rate never drops below zero. The result and its warnings depend only on the
    /// arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use utility_bills::fuel::FuelType;
    /// use utility_bills::rates::{RateOverrides, RateResolver, RateTable};
    ///
    /// let table = RateTable::embedded().unwrap();
    /// let resolver = RateResolver::new(&table);
    /// let res = resolver.resolve(FuelType::FuelOil, "FL", &RateOverrides::default());
    /// assert!(res.marginal_rate.is_some());
    /// assert_eq!(res.warnings.len(), 1);
    /// ```
    pub fn resolve(&self, fuel: FuelType, code: &str, overrides: &RateOverrides) -> Resolution {
        let fixed_charge = overrides
            .fixed_charge
            .unwrap_or_else(|| default_fixed_charge(fuel));

        if let Some(marginal) = overrides.marginal_rate {
            return Resolution {
                fixed_charge,
                marginal_rate: Some(marginal),
                warnings: Vec::new(),
            };
        }

        match self.average_row(fuel, code) {
            Some((row, warning)) => {
                let (marginal, clamped) = marginal_from_average(fuel, row, fixed_charge);
                Resolution {
                    fixed_charge,
                    marginal_rate: Some(marginal),
                    warnings: warning.into_iter().chain(clamped).collect(),
                }
            }
            None => Resolution {
                fixed_charge,
                marginal_rate: None,
                warnings: Vec::new(),
            },
        }
    }

    /// Marginal and average rates for a fixed charge and an optional user marginal rate.
    ///
    /// For electricity and natural gas the fixed charges spread over the average household's
    /// annual consumption make up the difference between the two.
    pub fn quote(
        &self,
        fuel: FuelType,
        code: &str,
        fixed_charge: f64,
        marginal_rate: Option<f64>,
    ) -> RateQuote {
        let found = self.average_row(fuel, code);
        let mut warnings: Vec<RateWarning> = found
            .as_ref()
            .and_then(|(_, w)| w.clone())
            .into_iter()
            .collect();
        let row = found.map(|(row, _)| row);

        let (marginal_rate, average_rate) = match (marginal_rate, row) {
            (Some(marginal), Some(row)) => (
                Some(marginal),
                Some(marginal + fixed_share(fuel, row, fixed_charge)),
            ),
            (Some(marginal), None) => (Some(marginal), None),
            (None, Some(row)) => {
                let (marginal, clamped) = marginal_from_average(fuel, row, fixed_charge);
                warnings.extend(clamped);
                (Some(marginal), Some(row.rate))
            }
            (None, None) => (None, None),
        };

        RateQuote {
            fuel,
            marginal_rate,
            average_rate,
            warnings,
        }
    }

    /// Walks jurisdiction, region and national tiers; the first row found wins.
    fn average_row(
        &self,
        fuel: FuelType,
        code: &str,
    ) -> Option<(AverageRate, Option<RateWarning>)> {
        if let Some(row) = self.table.lookup(code, fuel) {
            return Some((row, None));
        }

        let state_name = self.table.name_of(code).unwrap_or(code).to_string();
        let warning = |fallback| RateWarning::Fallback {
            fuel,
            state_name: state_name.clone(),
            fallback,
        };

        if let Some(region) = self.table.region_of(code)
            && let Some(row) = self.table.lookup(region, fuel)
        {
            return Some((row, Some(warning(Fallback::Region(region.to_string())))));
        }

        self.table
            .national(fuel)
            .map(|row| (row, Some(warning(Fallback::National))))
    }
}

/// Per-unit share of the fixed charges in the average rate.
fn fixed_share(fuel: FuelType, row: AverageRate, fixed_charge: f64) -> f64 {
    match (fuel, row.household_consumption) {
        (FuelType::Electricity | FuelType::NaturalGas, Some(annual)) if annual > 0.0 => {
            12.0 * fixed_charge / annual
        }
        _ => 0.0,
    }
}

/// Average rate less the fixed share, floored at zero.
fn marginal_from_average(
    fuel: FuelType,
    row: AverageRate,
    fixed_charge: f64,
) -> (f64, Option<RateWarning>) {
    let marginal = row.rate - fixed_share(fuel, row, fixed_charge);
    if marginal >= 0.0 {
        return (marginal, None);
    }
    let warning = RateWarning::FixedChargeExceedsAverage {
        fuel,
        fixed_charge,
        average_rate: row.rate,
    };
    (0.0, Some(warning))
}
