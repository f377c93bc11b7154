//! Spreadsheet export of the forecast table.
//!
//! The downloadable artifact is a two-column CSV `{date, prediction}`; the
//! importer reads it back so the round trip is testable.

use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;

use crate::core::{ForecastRow, ForecastTable};
use crate::error::{ForecastError, Result};

const COL_DATE: &str = "date";
const COL_PREDICTION: &str = "prediction";

/// Write the forecast table as `{date, prediction}` CSV.
pub fn write_forecast_csv<W: Write>(table: &ForecastTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record([COL_DATE, COL_PREDICTION])
        .map_err(|e| ForecastError::Io(e.to_string()))?;
    for row in table.iter() {
        csv_writer
            .write_record([row.date.to_string(), row.prediction.to_string()])
            .map_err(|e| ForecastError::Io(e.to_string()))?;
    }
    csv_writer.flush().map_err(|e| ForecastError::Io(e.to_string()))
}

/// Write the forecast table to a CSV file on disk.
pub fn write_forecast_csv_path(table: &ForecastTable, path: impl AsRef<Path>) -> Result<()> {
    let file =
        std::fs::File::create(path.as_ref()).map_err(|e| ForecastError::Io(e.to_string()))?;
    write_forecast_csv(table, file)
}

/// Read a `{date, prediction}` CSV back into a forecast table.
///
/// Interval bounds are not part of the export format, so imported rows carry
/// none.
pub fn read_forecast_csv<R: Read>(reader: R) -> Result<ForecastTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| ForecastError::Io(e.to_string()))?
        .clone();
    let col = |name: &str| headers.iter().position(|h| h == name);
    let date_idx = col(COL_DATE)
        .ok_or_else(|| ForecastError::Schema(format!("missing required column '{COL_DATE}'")))?;
    let pred_idx = col(COL_PREDICTION).ok_or_else(|| {
        ForecastError::Schema(format!("missing required column '{COL_PREDICTION}'"))
    })?;

    let mut rows = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| ForecastError::Io(e.to_string()))?;
        let line = row + 2;

        let raw_date = record.get(date_idx).unwrap_or("");
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|_| {
            ForecastError::Schema(format!("line {line}: unparsable date '{raw_date}'"))
        })?;
        let raw_pred = record.get(pred_idx).unwrap_or("");
        let prediction: f64 = raw_pred.parse().map_err(|_| {
            ForecastError::Schema(format!("line {line}: unparsable prediction '{raw_pred}'"))
        })?;

        rows.push(ForecastRow {
            date,
            prediction,
            lower: None,
            upper: None,
        });
    }

    Ok(ForecastTable::from_rows(rows))
}
