//! Forecaster trait defining the common model interface.

use crate::core::{DailySeries, Forecast};
use crate::error::Result;

/// Common interface for forecasting models over a daily sales series.
///
/// Object-safe; selection strategies work through `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the daily series.
    fn fit(&mut self, series: &DailySeries) -> Result<()>;

    /// Generate point predictions for the specified horizon.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with two-sided confidence intervals.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let _ = level;
        self.predict(horizon)
    }

    /// In-sample fitted values on the original scale, aligned to the series.
    ///
    /// Entries in the warm-up prefix (lags consumed by differencing and the
    /// recursion) are NaN.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Residuals (actual - fitted), aligned to the series; zero over warm-up.
    fn residuals(&self) -> Option<&[f64]>;

    /// Model name for logging and diagnostics.
    fn name(&self) -> String;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
pub type BoxedForecaster = Box<dyn Forecaster + Send>;
