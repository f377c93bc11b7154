//! Core data structures: transactions, the daily series, forecasts.

mod daily_series;
mod forecast;
mod transaction;

pub use daily_series::{DailySeries, SeriesBuilder};
pub use forecast::{Forecast, ForecastRow, ForecastTable};
pub use transaction::{read_transactions, read_transactions_path, Transaction};
