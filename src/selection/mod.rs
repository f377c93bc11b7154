//! Seasonal-order model selection.
//!
//! Searches a bounded candidate space of SARIMA orders, fits every candidate
//! independently, scores each by in-sample RMSE and keeps the best. Candidate
//! failures are ordinary values, not unwinds: the search folds over
//! [`CandidateFit`] results and only fails when nothing fits at all.

mod cache;

pub use cache::SelectionCache;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::DailySeries;
use crate::error::{ForecastError, Result};
use crate::models::{Forecaster, Sarima, SarimaSpec};
use crate::utils::stats::variance;

/// How the candidate space is generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Every combination of p, d, q, P, D, Q over {0, 1}: up to 64 candidates,
    /// iterated p-major to Q-minor.
    ExhaustiveGrid,
    /// A single caller-chosen order. The order's own seasonal period applies.
    FixedOrder(SarimaSpec),
    /// Stepwise shortlist: differencing orders suggested from variance ratios,
    /// then a reduced set of AR/MA combinations.
    AutoSearch,
}

/// Selection parameters.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Seasonal period in days (callers use 7 or 14).
    pub seasonal_period: usize,
    /// Candidate-space strategy.
    pub strategy: SearchStrategy,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            seasonal_period: 7,
            strategy: SearchStrategy::ExhaustiveGrid,
        }
    }
}

impl SelectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the seasonal period.
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    /// Set the search strategy.
    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Result of one candidate fit: the order plus either its score or the reason
/// it was skipped.
#[derive(Debug, Clone)]
pub struct CandidateFit {
    pub spec: SarimaSpec,
    pub outcome: std::result::Result<f64, ForecastError>,
}

/// The retained best model with search diagnostics.
#[derive(Debug, Clone)]
pub struct SelectedModel {
    /// Winning order.
    pub spec: SarimaSpec,
    /// In-sample RMSE of the winner.
    pub rmse: f64,
    /// The fitted model itself.
    pub model: Sarima,
    /// Number of candidate orders attempted.
    pub candidates_tried: usize,
    /// Number of candidates that failed to fit.
    pub candidates_failed: usize,
}

/// Enumerate candidate orders for the configured strategy, in deterministic
/// iteration order.
pub fn candidate_orders(series: &DailySeries, config: &SelectorConfig) -> Vec<SarimaSpec> {
    let s = config.seasonal_period;
    match &config.strategy {
        SearchStrategy::ExhaustiveGrid => {
            let mut orders = Vec::with_capacity(64);
            for p in 0..=1 {
                for d in 0..=1 {
                    for q in 0..=1 {
                        for cap_p in 0..=1 {
                            for cap_d in 0..=1 {
                                for cap_q in 0..=1 {
                                    orders.push(SarimaSpec::new(p, d, q, cap_p, cap_d, cap_q, s));
                                }
                            }
                        }
                    }
                }
            }
            orders
        }
        SearchStrategy::FixedOrder(spec) => vec![*spec],
        SearchStrategy::AutoSearch => {
            let d = suggest_differencing(series.values());
            let cap_d = suggest_seasonal_differencing(series.values(), s);
            let nonseasonal = [(0, 0), (1, 0), (0, 1), (1, 1), (2, 1), (1, 2)];
            let seasonal = [(0, 0), (1, 0), (0, 1), (1, 1)];
            let mut orders = Vec::with_capacity(nonseasonal.len() * seasonal.len());
            for &(p, q) in &nonseasonal {
                for &(cap_p, cap_q) in &seasonal {
                    orders.push(SarimaSpec::new(p, d, q, cap_p, cap_d, cap_q, s));
                }
            }
            orders
        }
    }
}

/// Fit one candidate and score it by RMSE over the aligned trailing window
/// (the warm-up prefix of NaN fitted values is excluded).
fn fit_candidate(series: &DailySeries, spec: SarimaSpec) -> std::result::Result<(Sarima, f64), ForecastError> {
    let mut model = Sarima::new(spec);
    model.fit(series)?;

    let fitted = model.fitted_values().ok_or(ForecastError::FitRequired)?;
    let values = series.values();
    let mut sum_sq = 0.0;
    let mut count = 0usize;
    for (actual, pred) in values.iter().zip(fitted) {
        if pred.is_finite() {
            sum_sq += (actual - pred).powi(2);
            count += 1;
        }
    }
    if count == 0 {
        return Err(ForecastError::Computation(format!(
            "{spec}: no comparable fitted values"
        )));
    }

    let rmse = (sum_sq / count as f64).sqrt();
    if !rmse.is_finite() {
        return Err(ForecastError::Computation(format!(
            "{spec}: non-finite fit score"
        )));
    }
    Ok((model, rmse))
}

/// Search the candidate space and return the best model.
///
/// Candidates are fitted in parallel (each fit is a pure function of the
/// series and the order) and the results are folded in candidate-index order,
/// so the outcome does not depend on completion order: lowest RMSE wins, ties
/// keep the earliest candidate.
pub fn select_model(series: &DailySeries, config: &SelectorConfig) -> Result<SelectedModel> {
    let orders = candidate_orders(series, config);
    let tried = orders.len();
    debug!(
        candidates = tried,
        period = config.seasonal_period,
        "starting model search"
    );

    let results: Vec<(SarimaSpec, std::result::Result<(Sarima, f64), ForecastError>)> = orders
        .into_par_iter()
        .map(|spec| (spec, fit_candidate(series, spec)))
        .collect();

    let mut failed = 0usize;
    let mut best: Option<(SarimaSpec, Sarima, f64)> = None;
    for (spec, outcome) in results {
        match outcome {
            Ok((model, rmse)) => {
                // Strict less-than keeps the earliest candidate on ties.
                if best.as_ref().map_or(true, |(_, _, b)| rmse < *b) {
                    best = Some((spec, model, rmse));
                }
            }
            Err(reason) => {
                failed += 1;
                debug!(order = %spec, %reason, "candidate skipped");
            }
        }
    }

    match best {
        Some((spec, model, rmse)) => {
            info!(order = %spec, rmse, tried, failed, "model selected");
            Ok(SelectedModel {
                spec,
                rmse,
                model,
                candidates_tried: tried,
                candidates_failed: failed,
            })
        }
        None => Err(ForecastError::ModelSelection { tried }),
    }
}

/// Fit every candidate and return the per-candidate outcomes, in candidate
/// order. Diagnostic companion to [`select_model`] for callers that want to
/// inspect why orders were skipped.
pub fn search_candidates(series: &DailySeries, config: &SelectorConfig) -> Vec<CandidateFit> {
    candidate_orders(series, config)
        .into_par_iter()
        .map(|spec| CandidateFit {
            spec,
            outcome: fit_candidate(series, spec).map(|(_, rmse)| rmse),
        })
        .collect()
}

/// Suggest the ordinary differencing order from a variance-ratio check.
fn suggest_differencing(values: &[f64]) -> usize {
    if values.len() < 3 {
        return 0;
    }
    let var_level = variance(values);
    let diffed: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let var_diff = variance(&diffed);

    if var_level.is_finite() && var_diff.is_finite() && var_level > 0.0 && var_diff / var_level < 0.9
    {
        1
    } else {
        0
    }
}

/// Suggest the seasonal differencing order: difference when it removes a
/// substantial share of the variance.
fn suggest_seasonal_differencing(values: &[f64], period: usize) -> usize {
    if period < 2 || values.len() < 2 * period + 2 {
        return 0;
    }
    let var_level = variance(values);
    let diffed: Vec<f64> = (period..values.len())
        .map(|i| values[i] - values[i - period])
        .collect();
    let var_diff = variance(&diffed);

    if var_level.is_finite() && var_diff.is_finite() && var_level > 0.0 && var_diff / var_level < 0.7
    {
        1
    } else {
        0
    }
}
