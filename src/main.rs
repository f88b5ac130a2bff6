//! Utility bill calculator entry point: CLI wiring for bill runs and rate queries.

mod cli;

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use utility_bills::bill::aggregate_monthly;
use utility_bills::config::BuildingConfig;
use utility_bills::fuel::FuelType;
use utility_bills::io::{export_report, load_timeseries};
use utility_bills::rates::{RateResolver, RateTable};
use utility_bills::runner::{check_preconditions, run_bills};

use crate::cli::{Args, BillsArgs, Command, RatesArgs};

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

fn bills(args: &BillsArgs, table: &RateTable) -> Result<()> {
    let building = BuildingConfig::from_toml_file(&args.building)?;
    let errors = building.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("{e}");
        }
        process::exit(1);
    }
    check_preconditions(&building)?;

    let series = load_timeseries(&args.timeseries)
        .with_context(|| format!("failed to read {}", args.timeseries.display()))?;
    let period = building.period()?;
    let monthly = aggregate_monthly(&series, &period)?;

    let report = run_bills(&building, &monthly, table)?;
    for warning in &report.warnings {
        warn!("{warning}");
    }
    for failure in &report.failures {
        for e in &failure.errors {
            error!(scenario = %failure.name, "{e}");
        }
    }
    for bill in &report.bills {
        println!("{bill}\n");
    }

    let path = args.output_path();
    if export_report(&report.bills, &path, args.format)
        .with_context(|| format!("failed to write {}", path.display()))?
    {
        info!("Bills written to {}", path.display());
    } else {
        warn!("No utility bills were calculated; no report written");
    }
    Ok(())
}

fn rates(args: &RatesArgs, table: &RateTable) {
    let resolver = RateResolver::new(table);
    let queries = [
        (
            FuelType::Electricity,
            &args.elec_state,
            args.elec_fixed_charge,
            args.elec_marginal(),
        ),
        (
            FuelType::NaturalGas,
            &args.gas_state,
            args.gas_fixed_charge,
            args.gas_marginal(),
        ),
        (FuelType::FuelOil, &args.oil_state, 0.0, None),
        (FuelType::Propane, &args.propane_state, 0.0, None),
    ];

    for (fuel, state, fixed_charge, marginal_rate) in queries {
        let quote = resolver.quote(fuel, state, fixed_charge, marginal_rate);
        for warning in &quote.warnings {
            warn!("{warning}");
        }
        match (quote.marginal_rate, quote.average_rate) {
            (Some(marginal), Some(average)) => {
                println!("{} {} {}", fuel.label(), round6(marginal), round6(average));
            }
            _ => error!("Could not find {} rates for {state}", fuel.label()),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .without_time()
        .compact()
        .init();

    let args = Args::parse();
    let table = RateTable::embedded().context("failed to load reference rates")?;

    match args.command {
        Command::Bills(args) => bills(&args, &table)?,
        Command::Rates(args) => rates(&args, &table),
    }
    Ok(())
}
