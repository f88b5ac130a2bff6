//! End-to-end bill runs: time series in, scenario bills out.

mod common;

use approx::assert_relative_eq;

use utility_bills::bill::{MonthlyFuels, PvCompensation};
use utility_bills::config::{FuelRateConfig, ScenarioConfig};
use utility_bills::error::BillError;
use utility_bills::fuel::FuelType;
use utility_bills::io::{OutputFormat, export_report};
use utility_bills::rates::RateWarning;
use utility_bills::runner::run_bills;

#[test]
fn beopt_reference_bills() {
    let cfg = common::building("beopt.toml");
    let monthly = common::monthly_from_file(&cfg, "beopt_timeseries.csv");
    let report = run_bills(&cfg, &monthly, &common::rate_table()).expect("run should succeed");

    assert!(report.failures.is_empty());
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.bills.len(), 1);

    let bill = &report.bills[0];
    let total = |fuel| bill.fuel(fuel).map(|b| b.total()).unwrap_or_default();
    assert_relative_eq!(bill.total(), 1514.2, epsilon = 1.0);
    assert_relative_eq!(total(FuelType::Electricity), 725.27, epsilon = 1.0);
    assert_relative_eq!(total(FuelType::NaturalGas), 250.30, epsilon = 1.0);
    assert_relative_eq!(total(FuelType::FuelOil), 462.33, epsilon = 1.0);
    assert_relative_eq!(total(FuelType::Propane), 76.30, epsilon = 1.0);

    let elec = bill.fuel(FuelType::Electricity);
    assert_eq!(elec.map(|b| b.annual_fixed), Some(96.0));
    assert!(elec.is_some_and(|b| !b.has_pv_line));
    assert!(bill.fuel(FuelType::WoodCord).is_none());
}

#[test]
fn pv_credit_lowers_electricity_bill() {
    let cfg = common::building("pv.toml");
    let monthly = common::monthly_from_file(&cfg, "pv_timeseries.csv");
    let without_pv = MonthlyFuels::from_months([
        (
            (FuelType::Electricity, false),
            monthly.get(FuelType::Electricity, false),
        ),
        (
            (FuelType::NaturalGas, false),
            monthly.get(FuelType::NaturalGas, false),
        ),
    ]);
    let table = common::rate_table();

    let with = run_bills(&cfg, &monthly, &table).expect("run should succeed");
    let mut no_systems = cfg.clone();
    no_systems.pv_systems.clear();
    let without = run_bills(&no_systems, &without_pv, &table).expect("run should succeed");

    assert_eq!(with.bills.len(), 3);
    for (pv, plain) in with.bills.iter().zip(&without.bills) {
        let pv_elec = pv.fuel(FuelType::Electricity).expect("electricity billed");
        let plain_elec = plain.fuel(FuelType::Electricity).expect("electricity billed");
        assert!(pv_elec.annual_pv_credit <= 0.0);
        assert!(pv_elec.has_pv_line);
        assert!(!plain_elec.has_pv_line);
        assert!(
            pv_elec.total() <= plain_elec.total(),
            "{}: {} > {}",
            pv.name,
            pv_elec.total(),
            plain_elec.total()
        );
        assert_relative_eq!(
            pv_elec.total(),
            pv_elec.annual_fixed + pv_elec.annual_marginal + pv_elec.annual_pv_credit
        );
    }
}

#[test]
fn pv_compensation_schemes_differ() {
    let cfg = common::building("pv.toml");
    let monthly = common::monthly_from_file(&cfg, "pv_timeseries.csv");
    let report = run_bills(&cfg, &monthly, &common::rate_table()).expect("run should succeed");
    let elec = |idx: usize| {
        report.bills[idx]
            .fuel(FuelType::Electricity)
            .expect("electricity billed")
            .clone()
    };

    let user_specified = elec(0);
    let retail = elec(1);
    let feed_in = elec(2);

    // Summer production exceeds consumption, so some excess is banked.
    assert!(user_specified.true_up_credit < 0.0);
    assert!(user_specified.monthly.iter().any(|m| m.banked_excess > 0.0));
    assert!(retail.annual_pv_credit < user_specified.annual_pv_credit);
    assert_eq!(retail.true_up_credit, 0.0);

    let production = monthly.annual(FuelType::Electricity, true);
    assert_relative_eq!(feed_in.annual_pv_credit, -production * 0.12, epsilon = 1e-6);
    assert_relative_eq!(feed_in.annual_fixed, 12.0 * 12.0 + 2.5 * 4.0 * 12.0, epsilon = 1e-9);
    assert_eq!(
        cfg.scenarios[2].pv.settings().compensation,
        PvCompensation::FeedInTariff(0.12)
    );
}

#[test]
fn fixed_charge_above_average_rate_keeps_pv_credit_negative() {
    let mut cfg = common::building("pv.toml");
    cfg.location.state_code = "CO".into();
    for scenario in &mut cfg.scenarios {
        *scenario.fuel_rate_mut(FuelType::Electricity) = FuelRateConfig {
            fixed_charge: Some(100.0),
            marginal_rate: None,
        };
    }
    assert!(cfg.validate().is_empty());

    let monthly = common::monthly_from_file(&cfg, "pv_timeseries.csv");
    let report = run_bills(&cfg, &monthly, &common::rate_table()).expect("run should succeed");

    assert_eq!(report.bills.len(), 3);
    for bill in &report.bills {
        let elec = bill.fuel(FuelType::Electricity).expect("electricity billed");
        assert_eq!(elec.rate.marginal_rate, 0.0);
        assert_eq!(elec.annual_marginal, 0.0);
        assert!(elec.annual_pv_credit <= 0.0, "{}: {}", bill.name, elec.annual_pv_credit);
    }
    let clamped = report
        .warnings
        .iter()
        .filter(|w| matches!(w.warning, RateWarning::FixedChargeExceedsAverage { .. }))
        .count();
    assert_eq!(clamped, 3);
}

#[test]
fn wood_and_coal_bills_scale_with_marginal_rate() {
    let scenario = |name: &str, fuel: FuelType, rate: f64| {
        let mut s = ScenarioConfig::named(name);
        s.fuel_rate_mut(fuel).marginal_rate = Some(rate);
        s
    };
    let cfg = common::building_with(
        "CO",
        2002,
        vec![
            scenario("Pellets 1", FuelType::WoodPellets, 0.02),
            scenario("Pellets 2", FuelType::WoodPellets, 0.01),
        ],
    );
    let monthly = common::flat_monthly(&cfg, &[(FuelType::WoodPellets, 15_000.0)]);
    let report = run_bills(&cfg, &monthly, &common::rate_table()).expect("run should succeed");
    assert_relative_eq!(report.bills[0].total(), 300.0, epsilon = 1e-6);
    assert_relative_eq!(report.bills[1].total(), report.bills[0].total() / 2.0, epsilon = 1e-9);

    let cfg = common::building_with(
        "CO",
        2002,
        vec![
            scenario("Coal 1", FuelType::Coal, 0.05),
            scenario("Coal 2", FuelType::Coal, 0.1),
            scenario("Coal 3", FuelType::Coal, 0.025),
        ],
    );
    let monthly = common::flat_monthly(&cfg, &[(FuelType::Coal, 8_000.0)]);
    let report = run_bills(&cfg, &monthly, &common::rate_table()).expect("run should succeed");
    let base = report.bills[0].total();
    assert_relative_eq!(report.bills[1].total(), base * 2.0, epsilon = 1e-9);
    assert_relative_eq!(report.bills[2].total(), base / 2.0, epsilon = 1e-9);
    assert!(
        report.bills[0]
            .fuel(FuelType::Coal)
            .is_some_and(|b| !b.has_fixed_line)
    );
}

#[test]
fn leap_year_run() {
    let cfg = common::building_with("CO", 2012, vec![ScenarioConfig::named("Bills")]);
    let monthly = common::flat_monthly(&cfg, &[(FuelType::Electricity, 8_000.0)]);
    assert_relative_eq!(
        monthly.get(FuelType::Electricity, false)[1],
        8_000.0 * 29.0 / 366.0,
        epsilon = 1e-9
    );

    let report = run_bills(&cfg, &monthly, &common::rate_table()).expect("run should succeed");
    let elec = report.bills[0].fuel(FuelType::Electricity).expect("electricity billed");
    assert!(elec.total() > 0.0);
    assert_relative_eq!(elec.annual_fixed, 144.0, epsilon = 1e-9);
}

#[test]
fn one_month_run_charges_only_that_month() {
    let mut cfg = common::building_with("CO", 2002, vec![ScenarioConfig::named("Bills")]);
    cfg.simulation.begin_month = 2;
    cfg.simulation.end_month = 2;
    cfg.simulation.end_day = 28;
    let monthly = common::flat_monthly(
        &cfg,
        &[(FuelType::Electricity, 600.0), (FuelType::NaturalGas, 40.0)],
    );

    let report = run_bills(&cfg, &monthly, &common::rate_table()).expect("run should succeed");
    for bill in &report.bills[0].fuels {
        assert_relative_eq!(bill.annual_fixed, 12.0, epsilon = 1e-9);
        assert_relative_eq!(bill.monthly[1].fixed, 12.0, epsilon = 1e-9);
        assert!(
            bill.monthly
                .iter()
                .filter(|m| m.month != 2)
                .all(|m| m.fixed == 0.0 && m.consumption == 0.0)
        );
        assert!(bill.total() > 0.0);
    }
}

#[test]
fn partial_period_prorates_fixed_charges() {
    let mut cfg = common::building_with("CO", 2002, vec![ScenarioConfig::named("Bills")]);
    cfg.simulation.begin_month = 2;
    cfg.simulation.begin_day = 10;
    cfg.simulation.end_month = 4;
    cfg.simulation.end_day = 10;
    let monthly = common::flat_monthly(&cfg, &[(FuelType::Electricity, 1_000.0)]);

    let report = run_bills(&cfg, &monthly, &common::rate_table()).expect("run should succeed");
    let elec = report.bills[0].fuel(FuelType::Electricity).expect("electricity billed");
    assert_relative_eq!(
        elec.annual_fixed,
        12.0 * (19.0 / 28.0 + 1.0 + 10.0 / 30.0),
        epsilon = 1e-9
    );
    assert_eq!(elec.monthly[0].fixed, 0.0);
    assert_eq!(elec.monthly[4].fixed, 0.0);
}

#[test]
fn fallback_warnings_for_florida_oil_and_oregon_propane() {
    let table = common::rate_table();

    let cfg = common::building_with("FL", 2002, vec![ScenarioConfig::named("Bills")]);
    let monthly = common::flat_monthly(
        &cfg,
        &[(FuelType::Electricity, 9_000.0), (FuelType::FuelOil, 300.0)],
    );
    let report = run_bills(&cfg, &monthly, &table).expect("run should succeed");
    let messages: Vec<String> = report
        .warnings
        .iter()
        .map(|w| w.warning.to_string())
        .collect();
    assert_eq!(
        messages,
        [
            "Could not find state average fuel oil rate based on Florida; \
             using region (PADD 1C) average."
        ]
    );
    assert_eq!(report.bills.len(), 1);

    let cfg = common::building_with("OR", 2002, vec![ScenarioConfig::named("Bills")]);
    let monthly = common::flat_monthly(
        &cfg,
        &[(FuelType::Electricity, 9_000.0), (FuelType::Propane, 300.0)],
    );
    let report = run_bills(&cfg, &monthly, &table).expect("run should succeed");
    let messages: Vec<String> = report
        .warnings
        .iter()
        .map(|w| w.warning.to_string())
        .collect();
    assert_eq!(
        messages,
        ["Could not find state average propane rate based on Oregon; using national average."]
    );
}

#[test]
fn location_without_rates_fails_every_fuel_in_use() {
    let cfg = common::building_with("ZA", 2002, vec![ScenarioConfig::named("Bills")]);
    let monthly = common::flat_monthly(
        &cfg,
        &[(FuelType::Electricity, 4_000.0), (FuelType::NaturalGas, 300.0)],
    );
    let report =
        run_bills(&cfg, &monthly, &common::empty_rate_table()).expect("run should succeed");

    assert!(report.bills.is_empty());
    let messages: Vec<String> = report.failures[0]
        .errors
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        messages,
        [
            "Could not find a marginal Electricity rate.",
            "Could not find a marginal Natural Gas rate.",
        ]
    );

    let path =
        std::env::temp_dir().join(format!("utility-bills-no-rates-{}.csv", std::process::id()));
    let written =
        export_report(&report.bills, &path, OutputFormat::Csv).expect("export should succeed");
    assert!(!written);
    assert!(!path.exists());
}

#[test]
fn dse_stops_the_run() {
    let cfg = common::building("dse.toml");
    let monthly = common::flat_monthly(&cfg, &[(FuelType::Electricity, 4_000.0)]);
    let result = run_bills(&cfg, &monthly, &common::rate_table());
    assert!(matches!(result, Err(BillError::Configuration(_))));
}

#[test]
fn no_scenarios_write_no_report() {
    let cfg = common::building("no_bills.toml");
    let monthly = common::flat_monthly(&cfg, &[(FuelType::Electricity, 4_000.0)]);
    let report = run_bills(&cfg, &monthly, &common::rate_table()).expect("run should succeed");
    assert!(report.bills.is_empty());

    let path =
        std::env::temp_dir().join(format!("utility-bills-empty-{}.json", std::process::id()));
    std::fs::write(&path, "{\"Old\": {\"Total ($)\": 999.0}}\n").expect("seed report");
    let written =
        export_report(&report.bills, &path, OutputFormat::Json).expect("export should succeed");
    assert!(!written);
    assert!(!path.exists(), "a report from an earlier run was left behind");
}
