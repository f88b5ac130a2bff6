//! Reader for per-timestep fuel use exported by the building simulation.
//!
//! Columns are named `<Fuel>[: Production] [<unit>]`, e.g. `Electricity [J]` or
//! `Electricity: Production [kWh]`. Timestamp columns are skipped and repeated columns of
//! the same fuel are summed.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::bill::aggregate::FuelSeries;
use crate::error::BillError;
use crate::fuel::FuelType;
use crate::units::Unit;

const TIMESTAMP_COLUMNS: [&str; 2] = ["Date/Time", "Time"];
const PRODUCTION_SUFFIX: &str = ": Production";

#[derive(Debug, Clone, Copy, PartialEq)]
struct Column {
    fuel: FuelType,
    is_production: bool,
    unit: Unit,
}

/// Parses a header such as `Natural Gas [therm]`.
fn parse_column(header: &str) -> Result<Column, BillError> {
    let unknown = || BillError::UnknownColumn(header.to_string());

    let header = header.trim();
    let (name, unit) = header
        .strip_suffix(']')
        .and_then(|h| h.rsplit_once('['))
        .ok_or_else(unknown)?;
    let unit: Unit = unit.trim().parse()?;

    let name = name.trim();
    let (name, is_production) = match name.strip_suffix(PRODUCTION_SUFFIX) {
        Some(fuel) => (fuel, true),
        None => (name, false),
    };
    let fuel: FuelType = name.parse().map_err(|_| unknown())?;
    if is_production && fuel != FuelType::Electricity {
        return Err(unknown());
    }

    Ok(Column {
        fuel,
        is_production,
        unit,
    })
}

/// Loads fuel series from a CSV file.
///
/// # Errors
///
/// Returns a [`BillError`] if the file cannot be read or a column or value is invalid.
pub fn load_timeseries(path: &Path) -> Result<Vec<FuelSeries>, BillError> {
    read_timeseries(File::open(path)?)
}

/// Reads fuel series from CSV, converting every column into its fuel's native unit.
///
/// # Errors
///
/// Returns [`BillError::UnknownColumn`] for unrecognised headers, [`BillError::Unit`] for a
/// unit that cannot express the fuel, and [`BillError::InvalidValue`] for non-numeric cells.
///
/// # Examples
///
/// ```
/// use utility_bills::fuel::FuelType;
/// use utility_bills::io::timeseries::read_timeseries;
///
/// let csv = "Time,Electricity [Wh],Propane [gal]\n1,1500,0.5\n2,500,0.25\n";
/// let series = read_timeseries(csv.as_bytes()).unwrap();
/// assert_eq!(series[0].fuel, FuelType::Electricity);
/// assert_eq!(series[0].values, vec![1.5, 0.5]);
/// assert_eq!(series[1].values, vec![0.5, 0.25]);
/// ```
pub fn read_timeseries(reader: impl Read) -> Result<Vec<FuelSeries>, BillError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut columns = Vec::with_capacity(headers.len());
    for header in &headers {
        if TIMESTAMP_COLUMNS.contains(&header) {
            columns.push(None);
        } else {
            columns.push(Some(parse_column(header)?));
        }
    }

    let mut raw: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        for (idx, column) in columns.iter().enumerate() {
            if column.is_none() {
                continue;
            }
            let cell = record.get(idx).unwrap_or("");
            let value = cell.parse::<f64>().map_err(|_| BillError::InvalidValue {
                column: headers[idx].to_string(),
                row: row + 1,
                value: cell.to_string(),
            })?;
            raw[idx].push(value);
        }
    }

    let mut series: Vec<FuelSeries> = Vec::new();
    for (column, values) in columns.into_iter().zip(raw) {
        let Some(column) = column else { continue };
        let converted =
            FuelSeries::convert(column.fuel, column.is_production, column.unit, &values)?;
        match series.iter_mut().find(|s| s.key() == converted.key()) {
            Some(existing) => {
                for (sum, v) in existing.values.iter_mut().zip(&converted.values) {
                    *sum += v;
                }
            }
            None => series.push(converted),
        }
    }
    Ok(series)
}
