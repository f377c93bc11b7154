//! Raw transaction records and tabular ingestion.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{ForecastError, Result};

/// Required input columns.
const COL_DATE: &str = "issue_date";
const COL_AMOUNT: &str = "amount";
/// Optional columns enabling customer analytics.
const COL_CUSTOMER_ID: &str = "customer_id";
const COL_CUSTOMER_NAME: &str = "customer_name";

/// One raw sales line.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Calendar date the sale was issued.
    pub issue_date: NaiveDate,
    /// Final amount, non-negative.
    pub amount: f64,
    /// Customer identifier, when the source carries one.
    pub customer_id: Option<String>,
    /// Customer display name, when the source carries one.
    pub customer_name: Option<String>,
}

impl Transaction {
    /// Convenience constructor for anonymous transactions.
    pub fn new(issue_date: NaiveDate, amount: f64) -> Self {
        Self {
            issue_date,
            amount,
            customer_id: None,
            customer_name: None,
        }
    }

    /// Convenience constructor with customer attribution.
    pub fn with_customer(
        issue_date: NaiveDate,
        amount: f64,
        customer_id: impl Into<String>,
        customer_name: impl Into<String>,
    ) -> Self {
        Self {
            issue_date,
            amount,
            customer_id: Some(customer_id.into()),
            customer_name: Some(customer_name.into()),
        }
    }
}

/// Read transactions from CSV.
///
/// The header row must contain `issue_date` and `amount`; `customer_id` and
/// `customer_name` are picked up when present. Dates are ISO `YYYY-MM-DD`.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>> {
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
    let amount_idx = col(COL_AMOUNT)
        .ok_or_else(|| ForecastError::Schema(format!("missing required column '{COL_AMOUNT}'")))?;
    let id_idx = col(COL_CUSTOMER_ID);
    let name_idx = col(COL_CUSTOMER_NAME);

    let mut transactions = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| ForecastError::Io(e.to_string()))?;
        let line = row + 2; // header is line 1

        let raw_date = record.get(date_idx).unwrap_or("");
        let issue_date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|_| {
            ForecastError::Schema(format!("line {line}: unparsable date '{raw_date}'"))
        })?;

        let raw_amount = record.get(amount_idx).unwrap_or("");
        let amount: f64 = raw_amount.parse().map_err(|_| {
            ForecastError::Schema(format!("line {line}: unparsable amount '{raw_amount}'"))
        })?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(ForecastError::Schema(format!(
                "line {line}: amount must be a non-negative number, got '{raw_amount}'"
            )));
        }

        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        transactions.push(Transaction {
            issue_date,
            amount,
            customer_id: field(id_idx),
            customer_name: field(name_idx),
        });
    }

    Ok(transactions)
}

/// Read transactions from a CSV file on disk.
pub fn read_transactions_path(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let file =
        std::fs::File::open(path.as_ref()).map_err(|e| ForecastError::Io(e.to_string()))?;
    read_transactions(file)
}
