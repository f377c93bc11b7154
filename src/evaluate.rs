//! Fit-accuracy metrics over a trailing evaluation window.

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Accuracy metrics for the last `window` actual-vs-fitted pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute percentage error, in percent.
    ///
    /// Zero-actual terms are excluded from the mean (division by zero);
    /// `excluded_zeros` reports how many were dropped.
    pub mape: f64,
    /// Number of zero-actual terms excluded from MAPE.
    pub excluded_zeros: usize,
    /// Number of pairs actually evaluated.
    pub window: usize,
}

/// Compute RMSE and MAPE over the trailing `window` pairs.
///
/// Pairs whose fitted value is not finite (model warm-up) are skipped. MAPE
/// terms with a zero actual are excluded and counted; when every evaluated
/// pair has a zero actual the metric is undefined and the call fails.
pub fn evaluate_window(actual: &[f64], fitted: &[f64], window: usize) -> Result<Evaluation> {
    if actual.len() != fitted.len() {
        return Err(ForecastError::Computation(format!(
            "evaluation inputs must align: {} actual vs {} fitted",
            actual.len(),
            fitted.len()
        )));
    }
    if window == 0 {
        return Err(ForecastError::Computation(
            "evaluation window must be positive".to_string(),
        ));
    }

    let start = actual.len().saturating_sub(window);
    let pairs: Vec<(f64, f64)> = actual[start..]
        .iter()
        .zip(&fitted[start..])
        .filter(|(_, f)| f.is_finite())
        .map(|(&a, &f)| (a, f))
        .collect();

    if pairs.is_empty() {
        return Err(ForecastError::UndefinedMetric(
            "no finite fitted values in the evaluation window".to_string(),
        ));
    }

    let mse = pairs.iter().map(|(a, f)| (a - f).powi(2)).sum::<f64>() / pairs.len() as f64;
    let rmse = mse.sqrt();

    let mut excluded_zeros = 0usize;
    let mut mape_sum = 0.0;
    let mut mape_count = 0usize;
    for &(a, f) in &pairs {
        if a == 0.0 {
            excluded_zeros += 1;
        } else {
            mape_sum += ((a - f) / a).abs();
            mape_count += 1;
        }
    }

    if mape_count == 0 {
        return Err(ForecastError::UndefinedMetric(
            "MAPE undefined: every actual in the evaluation window is zero".to_string(),
        ));
    }

    Ok(Evaluation {
        rmse,
        mape: 100.0 * mape_sum / mape_count as f64,
        excluded_zeros,
        window: pairs.len(),
    })
}
