use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use utility_bills::io::OutputFormat;

#[derive(Debug, Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calculate annual utility bills for every scenario of a building.
    #[clap(name = "bills")]
    Bills(BillsArgs),

    /// Print marginal and average rates for given fixed charges.
    #[clap(name = "rates")]
    Rates(RatesArgs),
}

#[derive(Debug, ClapArgs)]
pub struct BillsArgs {
    /// Building description (TOML).
    #[clap(long)]
    pub building: PathBuf,

    /// Per-timestep fuel use (CSV).
    #[clap(long)]
    pub timeseries: PathBuf,

    /// Report path; defaults to `results_bills.<format>`.
    #[clap(long)]
    pub output: Option<PathBuf>,

    #[clap(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
}

impl BillsArgs {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("results_bills.{}", self.format.extension())))
    }
}

#[derive(Debug, ClapArgs)]
pub struct RatesArgs {
    #[clap(long)]
    pub elec_state: String,

    /// Electricity fixed charge ($/month).
    #[clap(long)]
    pub elec_fixed_charge: f64,

    /// Electricity marginal rate ($/kWh); looked up when omitted or 0.
    #[clap(long)]
    pub elec_marginal_rate: Option<f64>,

    #[clap(long)]
    pub gas_state: String,

    /// Natural gas fixed charge ($/month).
    #[clap(long)]
    pub gas_fixed_charge: f64,

    /// Natural gas marginal rate ($/therm); looked up when omitted or 0.
    #[clap(long)]
    pub gas_marginal_rate: Option<f64>,

    #[clap(long)]
    pub oil_state: String,

    #[clap(long)]
    pub propane_state: String,
}

impl RatesArgs {
    /// User electricity marginal rate; `None` means look it up.
    pub fn elec_marginal(&self) -> Option<f64> {
        self.elec_marginal_rate.filter(|&rate| rate != 0.0)
    }

    /// User natural gas marginal rate; `None` means look it up.
    pub fn gas_marginal(&self) -> Option<f64> {
        self.gas_marginal_rate.filter(|&rate| rate != 0.0)
    }
}
