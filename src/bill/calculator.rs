//! Monthly bill ledger with PV compensation and annual true-up.

use std::collections::BTreeMap;

use crate::bill::aggregate::MonthlyFuels;
use crate::bill::calendar::SimulationPeriod;
use crate::bill::types::{
    ExcessSellback, FuelBill, FuelRate, PvCompensation, PvSettings, PvSystem, ScenarioBill,
    empty_ledger,
};
use crate::fuel::FuelType;

/// Computes bills from monthly fuel totals for one building.
///
/// The calculator holds no state between calls; each scenario is computed independently.
#[derive(Debug, Clone, Copy)]
pub struct BillCalculator<'a> {
    period: &'a SimulationPeriod,
    monthly: &'a MonthlyFuels,
    pv_systems: &'a [PvSystem],
}

impl<'a> BillCalculator<'a> {
    pub fn new(
        period: &'a SimulationPeriod,
        monthly: &'a MonthlyFuels,
        pv_systems: &'a [PvSystem],
    ) -> Self {
        Self {
            period,
            monthly,
            pv_systems,
        }
    }

    /// Installed PV capacity summed over all systems (kW).
    pub fn pv_capacity_kw(&self) -> f64 {
        self.pv_systems.iter().map(|s| s.max_power_output_kw).sum()
    }

    fn has_pv(&self) -> bool {
        !self.pv_systems.is_empty() || self.monthly.annual(FuelType::Electricity, true) != 0.0
    }

    /// Bills every fuel in `rates` and collects them in report order.
    pub fn scenario_bill(
        &self,
        name: &str,
        rates: &BTreeMap<FuelType, FuelRate>,
        pv: &PvSettings,
    ) -> ScenarioBill {
        ScenarioBill {
            name: name.to_string(),
            fuels: rates
                .iter()
                .map(|(&fuel, &rate)| self.fuel_bill(fuel, rate, pv))
                .collect(),
        }
    }

    /// Walks months 1..=12 for one fuel.
    ///
    /// Fixed charges (plus the PV grid connection fee for electricity) are prorated by the
    /// fraction of each month inside the simulation period. Marginal charges bill gross
    /// consumption; the value of production is posted as a negative PV credit.
    pub fn fuel_bill(&self, fuel: FuelType, rate: FuelRate, pv: &PvSettings) -> FuelBill {
        let is_electricity = fuel == FuelType::Electricity;
        let consumption = self.monthly.get(fuel, false);
        let production = if is_electricity {
            self.monthly.get(fuel, true)
        } else {
            [0.0; 12]
        };

        let grid_fee = match pv.grid_connection_fee {
            Some(fee) if is_electricity && !self.pv_systems.is_empty() => {
                fee.monthly(self.pv_capacity_kw())
            }
            _ => 0.0,
        };

        let mut ledger = empty_ledger();
        for (idx, entry) in ledger.iter_mut().enumerate() {
            entry.consumption = consumption[idx];
            entry.production = production[idx];
            entry.fixed = (rate.fixed_charge + grid_fee) * self.period.prorate(entry.month);
            entry.marginal = entry.consumption * rate.marginal_rate;

            if !is_electricity || entry.production == 0.0 {
                continue;
            }
            match pv.compensation {
                PvCompensation::FeedInTariff(tariff) => {
                    entry.pv_credit = -entry.production * tariff;
                }
                PvCompensation::NetMetering(sellback) => {
                    let offset = entry.consumption.min(entry.production).max(0.0);
                    let excess = (entry.production - entry.consumption).max(0.0);
                    entry.pv_credit = -offset * rate.marginal_rate;
                    match sellback {
                        ExcessSellback::RetailElectricityCost => {
                            entry.pv_credit -= excess * rate.marginal_rate;
                        }
                        ExcessSellback::UserSpecified(_) => entry.banked_excess = excess,
                    }
                }
            }
        }

        let true_up_credit = match pv.compensation {
            PvCompensation::NetMetering(ExcessSellback::UserSpecified(sellback_rate))
                if is_electricity =>
            {
                let banked: f64 = ledger.iter().map(|e| e.banked_excess).sum();
                -banked * sellback_rate
            }
            _ => 0.0,
        };

        let annual_fixed = ledger.iter().map(|e| e.fixed).sum();
        let annual_marginal = ledger.iter().map(|e| e.marginal).sum();
        let monthly_credit: f64 = ledger.iter().map(|e| e.pv_credit).sum();

        FuelBill {
            fuel,
            rate,
            monthly: ledger,
            annual_fixed,
            annual_marginal,
            annual_pv_credit: monthly_credit + true_up_credit,
            true_up_credit,
            has_fixed_line: matches!(fuel, FuelType::Electricity | FuelType::NaturalGas)
                || rate.fixed_charge != 0.0,
            has_pv_line: is_electricity && self.has_pv(),
        }
    }
}
