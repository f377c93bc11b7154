//! # ventas-forecast
//!
//! Daily sales forecasting with seasonal ARIMA model selection.
//!
//! Turns raw transaction records into a complete daily series (gap and
//! zero-day imputation), searches a bounded space of SARIMA orders for the
//! best in-sample fit, produces dated forecasts with confidence intervals,
//! evaluates recent accuracy (RMSE / MAPE), and computes customer-level
//! sales aggregates. The [`pipeline::Pipeline`] type wires the stages
//! together and renders the structured output payload a dashboard or HTTP
//! layer serves as-is.

pub mod analytics;
pub mod core;
pub mod error;
pub mod evaluate;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod selection;
pub mod utils;

pub use error::{ErrorKind, ErrorPayload, ForecastError, Result};

pub mod prelude {
    pub use crate::core::{DailySeries, Forecast, ForecastTable, SeriesBuilder, Transaction};
    pub use crate::error::{ForecastError, Result};
    pub use crate::evaluate::{evaluate_window, Evaluation};
    pub use crate::models::{Forecaster, Sarima, SarimaSpec};
    pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineOutput};
    pub use crate::selection::{select_model, SearchStrategy, SelectorConfig};
}
