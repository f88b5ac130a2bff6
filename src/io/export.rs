//! CSV and JSON export of annual bill summaries.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use serde_json::{Map, Value};

use crate::bill::types::{FuelBill, ScenarioBill};

/// Report file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// One `"<Scenario>: <Fuel>: <Charge> ($)"` line of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub key: String,
    /// Unrounded dollars.
    pub value: f64,
}

/// Charge lines of one fuel, in report order.
fn fuel_lines(bill: &FuelBill) -> Vec<(&'static str, f64)> {
    let mut lines = Vec::with_capacity(4);
    if bill.has_fixed_line {
        lines.push(("Fixed ($)", bill.annual_fixed));
    }
    lines.push(("Marginal ($)", bill.annual_marginal));
    if bill.has_pv_line {
        lines.push(("PV Credit ($)", bill.annual_pv_credit));
    }
    lines.push(("Total ($)", bill.total()));
    lines
}

/// Flattens scenario bills into keyed report rows.
///
/// Each scenario contributes its grand total followed by the charge lines of every billed
/// fuel.
pub fn report_rows(bills: &[ScenarioBill]) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    for scenario in bills {
        rows.push(ReportRow {
            key: format!("{}: Total ($)", scenario.name),
            value: scenario.total(),
        });
        for bill in &scenario.fuels {
            for (charge, value) in fuel_lines(bill) {
                rows.push(ReportRow {
                    key: format!("{}: {}: {charge}", scenario.name, bill.fuel),
                    value,
                });
            }
        }
    }
    rows
}

/// Rounds to cents for display, folding `-0.00` into `0.00`.
fn cents(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Writes the report to a file.
///
/// When no scenario was billed no report is written and any file left at `path` by an
/// earlier run is removed. Returns whether a file was written.
///
/// # Arguments
///
/// * `bills` - Successful scenario bills in report order
/// * `path` - Output file path
/// * `format` - CSV or JSON
///
/// # Errors
///
/// Returns an `io::Error` if file creation, writing or removal of a stale report fails.
pub fn export_report(
    bills: &[ScenarioBill],
    path: &Path,
    format: OutputFormat,
) -> io::Result<bool> {
    if bills.is_empty() {
        return match fs::remove_file(path) {
            Ok(()) => Ok(false),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        };
    }
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    match format {
        OutputFormat::Csv => write_csv(bills, buf)?,
        OutputFormat::Json => write_json(bills, buf)?,
    }
    Ok(true)
}

/// Writes `key,value` lines without a header row.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(bills: &[ScenarioBill], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    for row in report_rows(bills) {
        wtr.write_record([row.key, format!("{:.2}", cents(row.value))])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes a JSON object nested scenario → fuel → charge.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_json(bills: &[ScenarioBill], mut writer: impl Write) -> io::Result<()> {
    let mut root = Map::new();
    for scenario in bills {
        let mut fuels = Map::new();
        fuels.insert("Total ($)".into(), Value::from(cents(scenario.total())));
        for bill in &scenario.fuels {
            let charges: Map<String, Value> = fuel_lines(bill)
                .into_iter()
                .map(|(charge, value)| (charge.to_string(), Value::from(cents(value))))
                .collect();
            fuels.insert(bill.fuel.to_string(), Value::Object(charges));
        }
        root.insert(scenario.name.clone(), Value::Object(fuels));
    }

    serde_json::to_writer_pretty(&mut writer, &Value::Object(root))?;
    writeln!(writer)?;
    writer.flush()
}
