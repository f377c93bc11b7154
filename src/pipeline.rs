//! End-to-end forecasting pipeline and the boundary payload contract.
//!
//! Series Builder -> Model Selector -> Forecaster -> Evaluator, strictly in
//! that order. The pipeline owns the selection cache, so repeated runs over
//! the same data (a dashboard re-render, a changed horizon) refit nothing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::core::{DailySeries, ForecastTable, SeriesBuilder, Transaction};
use crate::error::{ErrorKind, ErrorPayload, ForecastError, Result};
use crate::evaluate::{evaluate_window, Evaluation};
use crate::models::Forecaster;
use crate::selection::{SearchStrategy, SelectionCache, SelectorConfig};

/// Default forecast horizon in days.
pub const DEFAULT_HORIZON: usize = 14;
/// Largest horizon the library accepts; dashboards typically request 7-14.
pub const MAX_HORIZON: usize = 60;
/// Default two-sided confidence level for forecast intervals.
pub const DEFAULT_LEVEL: f64 = 0.95;

/// Pipeline parameters.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Days to forecast past the last observed date, 1..=60.
    pub horizon: usize,
    /// Seasonal period handed to the selector.
    pub seasonal_period: usize,
    /// Candidate-space strategy.
    pub strategy: SearchStrategy,
    /// Two-sided confidence level for the forecast intervals.
    pub level: f64,
    /// Whether zero-sales days are imputed like gaps.
    pub treat_zero_as_missing: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            seasonal_period: 7,
            strategy: SearchStrategy::ExhaustiveGrid,
            level: DEFAULT_LEVEL,
            treat_zero_as_missing: true,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }

    pub fn with_treat_zero_as_missing(mut self, enabled: bool) -> Self {
        self.treat_zero_as_missing = enabled;
        self
    }
}

/// One day of the imputed historical series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub sales: f64,
}

/// Successful pipeline result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Full imputed daily series.
    pub historico: Vec<HistoryPoint>,
    /// Dated forecast over the requested horizon, with interval bounds.
    pub forecast: ForecastTable,
    /// Fit accuracy over the trailing `horizon` days.
    pub evaluation: Evaluation,
    /// Label of the selected order, e.g. `SARIMA(1,0,1)(0,1,1)[7]`.
    pub model: String,
}

/// The forecasting pipeline with its process-local selection cache.
#[derive(Debug, Default)]
pub struct Pipeline {
    cache: SelectionCache,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the full pipeline over raw transactions.
    pub fn run(
        &mut self,
        transactions: &[Transaction],
        config: &PipelineConfig,
    ) -> Result<PipelineOutput> {
        if config.horizon == 0 || config.horizon > MAX_HORIZON {
            return Err(ForecastError::InvalidHorizon {
                got: config.horizon,
                max: MAX_HORIZON,
            });
        }

        let series = SeriesBuilder::new()
            .treat_zero_as_missing(config.treat_zero_as_missing)
            .build(transactions)?;
        self.run_series(&series, config)
    }

    /// Run selection, forecasting and evaluation over an already-built series.
    pub fn run_series(
        &mut self,
        series: &DailySeries,
        config: &PipelineConfig,
    ) -> Result<PipelineOutput> {
        if config.horizon == 0 || config.horizon > MAX_HORIZON {
            return Err(ForecastError::InvalidHorizon {
                got: config.horizon,
                max: MAX_HORIZON,
            });
        }

        let selector_config = SelectorConfig::new()
            .with_seasonal_period(config.seasonal_period)
            .with_strategy(config.strategy.clone());
        let selected = self.cache.get_or_select(series, &selector_config)?;

        let forecast = selected
            .model
            .predict_with_intervals(config.horizon, config.level)?;
        let table = ForecastTable::from_forecast(&forecast, series.last_date());

        let fitted = selected.model.fitted_values().ok_or(ForecastError::FitRequired)?;
        let evaluation = evaluate_window(series.values(), fitted, config.horizon)?;

        let historico = series
            .dates()
            .iter()
            .zip(series.values())
            .map(|(&date, &sales)| HistoryPoint { date, sales })
            .collect();

        info!(
            model = %selected.spec,
            horizon = config.horizon,
            days = series.len(),
            "pipeline run complete"
        );

        Ok(PipelineOutput {
            historico,
            forecast: table,
            evaluation,
            model: selected.spec.to_string(),
        })
    }

    /// Run the pipeline and render the boundary payload.
    ///
    /// Successes serialize as `{"historico": [...], "forecast": [...], ...}`;
    /// failures as `{"error": {"kind": ..., "message": ...}}` so the glue
    /// layer can map the kind to a status instead of string-matching.
    pub fn run_to_payload(
        &mut self,
        transactions: &[Transaction],
        config: &PipelineConfig,
    ) -> serde_json::Value {
        match self.run(transactions, config) {
            Ok(output) => serde_json::to_value(&output).unwrap_or_else(|e| {
                let payload = ErrorPayload {
                    kind: ErrorKind::Computation,
                    message: e.to_string(),
                };
                json!({ "error": payload })
            }),
            Err(err) => json!({ "error": ErrorPayload::from(&err) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sales_fixture(days: usize) -> Vec<Transaction> {
        let start = date(2024, 1, 1);
        (0..days)
            .map(|i| {
                let weekday_lift =
                    40.0 * (2.0 * std::f64::consts::PI * i as f64 / 7.0).sin();
                Transaction::new(
                    start + Duration::days(i as i64),
                    300.0 + 0.5 * i as f64 + weekday_lift,
                )
            })
            .collect()
    }

    #[test]
    fn full_run_produces_contract_shapes() {
        let transactions = sales_fixture(56);
        let mut pipeline = Pipeline::new();
        let output = pipeline
            .run(&transactions, &PipelineConfig::new().with_horizon(14))
            .unwrap();

        assert_eq!(output.historico.len(), 56);
        assert_eq!(output.forecast.len(), 14);
        assert!(output.evaluation.rmse.is_finite());
        assert!(!output.model.is_empty());

        // Forecast dates start the day after the last history date.
        let last = output.historico.last().unwrap().date;
        assert_eq!(output.forecast.rows()[0].date, last + Duration::days(1));
        for w in output.forecast.rows().windows(2) {
            assert_eq!(w[1].date - w[0].date, Duration::days(1));
        }
        // Intervals are present and bracket the point forecast.
        for row in output.forecast.iter() {
            assert!(row.lower.unwrap() <= row.prediction);
            assert!(row.prediction <= row.upper.unwrap());
        }
    }

    #[test]
    fn horizon_zero_is_invalid() {
        let transactions = sales_fixture(30);
        let mut pipeline = Pipeline::new();
        let err = pipeline
            .run(&transactions, &PipelineConfig::new().with_horizon(0))
            .unwrap_err();
        assert_eq!(err, ForecastError::InvalidHorizon { got: 0, max: 60 });
    }

    #[test]
    fn horizon_above_cap_is_invalid() {
        let transactions = sales_fixture(30);
        let mut pipeline = Pipeline::new();
        let err = pipeline
            .run(&transactions, &PipelineConfig::new().with_horizon(61))
            .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidHorizon { got: 61, .. }));
    }

    #[test]
    fn empty_transactions_fail_before_modeling() {
        let mut pipeline = Pipeline::new();
        let err = pipeline.run(&[], &PipelineConfig::new()).unwrap_err();
        assert_eq!(err, ForecastError::EmptyInput);
    }

    #[test]
    fn repeat_runs_share_the_selection_cache() {
        let transactions = sales_fixture(42);
        let mut pipeline = Pipeline::new();
        let config = PipelineConfig::new().with_horizon(7);

        let first = pipeline.run(&transactions, &config).unwrap();
        // Different horizon, same series and selector inputs: cache hit.
        let second = pipeline
            .run(&transactions, &config.clone().with_horizon(14))
            .unwrap();
        assert_eq!(first.model, second.model);
    }

    #[test]
    fn error_payload_is_structured() {
        let mut pipeline = Pipeline::new();
        let payload = pipeline.run_to_payload(&[], &PipelineConfig::new());
        assert_eq!(payload["error"]["kind"], "empty_input");
        assert!(payload["error"]["message"]
            .as_str()
            .unwrap()
            .contains("empty input"));
    }

    #[test]
    fn success_payload_carries_contract_keys() {
        let transactions = sales_fixture(42);
        let mut pipeline = Pipeline::new();
        let payload =
            pipeline.run_to_payload(&transactions, &PipelineConfig::new().with_horizon(7));

        assert!(payload.get("error").is_none());
        assert_eq!(payload["historico"].as_array().unwrap().len(), 42);
        assert_eq!(payload["forecast"].as_array().unwrap().len(), 7);
        assert!(payload["evaluation"]["rmse"].is_number());
    }
}
