//! SARIMA model fitted by conditional least squares.

use std::fmt;

use crate::core::{DailySeries, Forecast};
use crate::error::{ForecastError, Result};
use crate::models::sarima::diff::{difference, integrate, seasonal_difference, seasonal_integrate};
use crate::models::Forecaster;
use crate::utils::optimize::{minimize, MinimizeConfig};
use crate::utils::stats::quantile_normal;

/// Coefficient bound used instead of strict stationarity/invertibility checks.
///
/// Candidate orders are fitted with enforcement relaxed: coefficients are
/// clamped into (-BOUND, BOUND) so arbitrary real-world series still produce a
/// usable fit rather than a rejection.
const COEF_BOUND: f64 = 0.99;

/// SARIMA order specification: (p, d, q)(P, D, Q)\[s\].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SarimaSpec {
    /// Non-seasonal AR order.
    pub p: usize,
    /// Non-seasonal differencing order.
    pub d: usize,
    /// Non-seasonal MA order.
    pub q: usize,
    /// Seasonal AR order.
    pub cap_p: usize,
    /// Seasonal differencing order.
    pub cap_d: usize,
    /// Seasonal MA order.
    pub cap_q: usize,
    /// Seasonal period in days.
    pub s: usize,
}

impl SarimaSpec {
    /// Create a full seasonal specification.
    pub fn new(p: usize, d: usize, q: usize, cap_p: usize, cap_d: usize, cap_q: usize, s: usize) -> Self {
        Self { p, d, q, cap_p, cap_d, cap_q, s }
    }

    /// Create a non-seasonal ARIMA(p, d, q) specification.
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        Self::new(p, d, q, 0, 0, 0, 0)
    }

    /// Number of estimated parameters (AR + MA + seasonal AR + seasonal MA + intercept).
    pub fn num_params(&self) -> usize {
        self.p + self.q + self.cap_p + self.cap_q + 1
    }

    /// Whether any seasonal component is active.
    pub fn is_seasonal(&self) -> bool {
        self.s > 1 && (self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0)
    }

    /// Recursion warm-up: observations consumed before the first prediction.
    fn warmup(&self) -> usize {
        let seasonal_lag = self.cap_p.max(self.cap_q) * self.s;
        self.p.max(self.q).max(seasonal_lag)
    }

    /// Observations consumed by differencing.
    fn diff_len(&self) -> usize {
        self.d + self.cap_d * self.s
    }

    /// Minimum series length this order can be fitted on.
    pub fn min_observations(&self) -> usize {
        self.diff_len() + self.warmup() + 3
    }
}

impl fmt::Display for SarimaSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.s > 1 {
            write!(
                f,
                "SARIMA({},{},{})({},{},{})[{}]",
                self.p, self.d, self.q, self.cap_p, self.cap_d, self.cap_q, self.s
            )
        } else {
            write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
        }
    }
}

/// Estimated coefficient set for one order.
#[derive(Debug, Clone, Default)]
struct Coefficients {
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
    intercept: f64,
}

impl Coefficients {
    fn from_flat(spec: &SarimaSpec, params: &[f64]) -> Self {
        let (p, q, cap_p) = (spec.p, spec.q, spec.cap_p);
        Self {
            intercept: params[0],
            ar: params[1..1 + p].to_vec(),
            ma: params[1 + p..1 + p + q].to_vec(),
            seasonal_ar: params[1 + p + q..1 + p + q + cap_p].to_vec(),
            seasonal_ma: params[1 + p + q + cap_p..].to_vec(),
        }
    }
}

/// Seasonal ARIMA forecasting model.
///
/// Differencing (`d` ordinary, `D` seasonal at lag `s`) is applied first; the
/// remaining ARMA structure with seasonal AR/MA terms is estimated by
/// minimizing the conditional sum of squared one-step errors.
#[derive(Debug, Clone)]
pub struct Sarima {
    spec: SarimaSpec,
    coef: Coefficients,
    /// Original series values.
    original: Option<Vec<f64>>,
    /// Fully differenced series the recursion runs on.
    working: Option<Vec<f64>>,
    /// One-step residuals on the differenced scale (zero over warm-up).
    working_residuals: Option<Vec<f64>>,
    /// Fitted values on the original scale, aligned to the series (NaN warm-up).
    fitted: Option<Vec<f64>>,
    /// Residuals aligned to the series (zero over warm-up).
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
}

impl Sarima {
    /// Create an unfitted model for the given order.
    pub fn new(spec: SarimaSpec) -> Self {
        Self {
            spec,
            coef: Coefficients::default(),
            original: None,
            working: None,
            working_residuals: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
        }
    }

    /// Get the order specification.
    pub fn spec(&self) -> SarimaSpec {
        self.spec
    }

    /// Variance of the one-step residuals, available after fitting.
    pub fn residual_variance(&self) -> Option<f64> {
        self.residual_variance
    }

    /// One-step prediction at position `t` of the differenced series, given
    /// the residual history so far.
    fn predict_one(spec: &SarimaSpec, coef: &Coefficients, w: &[f64], resid: &[f64], t: usize) -> f64 {
        let c = coef.intercept;
        let mut pred = c;

        for (i, phi) in coef.ar.iter().enumerate() {
            pred += phi * (w[t - 1 - i] - c);
        }
        for (j, phi_s) in coef.seasonal_ar.iter().enumerate() {
            pred += phi_s * (w[t - (j + 1) * spec.s] - c);
        }
        for (i, theta) in coef.ma.iter().enumerate() {
            pred += theta * resid[t - 1 - i];
        }
        for (j, theta_s) in coef.seasonal_ma.iter().enumerate() {
            pred += theta_s * resid[t - (j + 1) * spec.s];
        }
        pred
    }

    /// Conditional sum of squares for a flat parameter vector.
    fn css(spec: &SarimaSpec, w: &[f64], params: &[f64]) -> f64 {
        let coef = Coefficients::from_flat(spec, params);
        let start = spec.warmup();
        if w.len() <= start {
            return f64::MAX;
        }

        let mut resid = vec![0.0; w.len()];
        let mut total = 0.0;
        for t in start..w.len() {
            let err = w[t] - Self::predict_one(spec, &coef, w, &resid, t);
            resid[t] = err;
            total += err * err;
        }
        if total.is_finite() {
            total
        } else {
            f64::MAX
        }
    }

    fn estimate(&mut self, w: &[f64]) -> Result<()> {
        let spec = self.spec;
        let n_coef = spec.num_params() - 1;
        let w_mean = w.iter().sum::<f64>() / w.len() as f64;

        if n_coef == 0 {
            self.coef = Coefficients {
                intercept: w_mean,
                ..Default::default()
            };
            return Ok(());
        }

        let mut initial = vec![0.0; n_coef + 1];
        initial[0] = w_mean;
        for (i, v) in initial[1..].iter_mut().enumerate() {
            *v = 0.1 / (i + 1) as f64;
        }

        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
        bounds.extend(std::iter::repeat((-COEF_BOUND, COEF_BOUND)).take(n_coef));

        let result = minimize(
            |params| Self::css(&spec, w, params),
            &initial,
            &bounds,
            &MinimizeConfig::default(),
        );

        if !result.value.is_finite() || result.value == f64::MAX {
            return Err(ForecastError::Computation(format!(
                "{spec}: conditional least squares did not produce a finite objective"
            )));
        }

        self.coef = Coefficients::from_flat(&spec, &result.point);
        Ok(())
    }

    /// Compute fitted values and residuals on both scales.
    fn finish_fit(&mut self, values: &[f64], w: Vec<f64>) -> Result<()> {
        let spec = self.spec;
        let start = spec.warmup();
        let offset = spec.diff_len();
        let m = w.len();

        let mut fitted_w = vec![f64::NAN; m];
        let mut resid_w = vec![0.0; m];
        for t in start..m {
            let pred = Self::predict_one(&spec, &self.coef, &w, &resid_w, t);
            fitted_w[t] = pred;
            resid_w[t] = w[t] - pred;
        }

        let valid = &resid_w[start..];
        if valid.is_empty() {
            return Err(ForecastError::InsufficientData {
                needed: spec.min_observations(),
                got: values.len(),
            });
        }
        let variance = valid.iter().map(|r| r * r).sum::<f64>() / valid.len() as f64;
        if !variance.is_finite() {
            return Err(ForecastError::Computation(format!(
                "{spec}: residual variance is not finite"
            )));
        }

        // Differencing is linear in past observations, so the one-step fitted
        // value on the original scale is the actual minus the working-scale
        // residual.
        let mut fitted = vec![f64::NAN; values.len()];
        let mut residuals = vec![0.0; values.len()];
        for t in start..m {
            let i = t + offset;
            fitted[i] = values[i] - resid_w[t];
            residuals[i] = resid_w[t];
        }

        self.original = Some(values.to_vec());
        self.working = Some(w);
        self.working_residuals = Some(resid_w);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        self.residual_variance = Some(variance);
        Ok(())
    }
}

impl Forecaster for Sarima {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        let values = series.values();
        let needed = self.spec.min_observations();
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let z = difference(values, self.spec.d);
        let w = seasonal_difference(&z, self.spec.cap_d, self.spec.s);
        if w.len() <= self.spec.warmup() + 1 {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        self.estimate(&w)?;
        self.finish_fit(values, w)
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let original = self.original.as_ref().ok_or(ForecastError::FitRequired)?;
        let working = self.working.as_ref().ok_or(ForecastError::FitRequired)?;
        let resid = self
            .working_residuals
            .as_ref()
            .ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::default());
        }

        let spec = self.spec;
        let mut w_ext = working.clone();
        let mut resid_ext = resid.clone();
        for _ in 0..horizon {
            let t = w_ext.len();
            // Future shocks are zero; lags beyond the known history contribute
            // nothing for very short working series.
            let mut pred = self.coef.intercept;
            for (i, phi) in self.coef.ar.iter().enumerate() {
                if t > i {
                    pred += phi * (w_ext[t - 1 - i] - self.coef.intercept);
                }
            }
            for (j, phi_s) in self.coef.seasonal_ar.iter().enumerate() {
                let lag = (j + 1) * spec.s;
                if t >= lag {
                    pred += phi_s * (w_ext[t - lag] - self.coef.intercept);
                }
            }
            for (i, theta) in self.coef.ma.iter().enumerate() {
                if t > i {
                    pred += theta * resid_ext[t - 1 - i];
                }
            }
            for (j, theta_s) in self.coef.seasonal_ma.iter().enumerate() {
                let lag = (j + 1) * spec.s;
                if t >= lag {
                    pred += theta_s * resid_ext[t - lag];
                }
            }
            w_ext.push(pred);
            resid_ext.push(0.0);
        }

        let w_forecast = &w_ext[working.len()..];
        let z = difference(original, spec.d);
        let z_forecast = seasonal_integrate(w_forecast, &z, spec.cap_d, spec.s);
        let predictions = integrate(&z_forecast, original, spec.d);

        Ok(Forecast::from_points(predictions))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let forecast = self.predict(horizon)?;
        if horizon == 0 {
            return Ok(forecast);
        }

        let variance = self.residual_variance.unwrap_or(0.0);
        let z = quantile_normal((1.0 + level) / 2.0);
        let points = forecast.points().to_vec();

        // Forecast variance grows linearly with the horizon step; exact MA(inf)
        // weights are overkill for a daily sales dashboard.
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (h, point) in points.iter().enumerate() {
            let se = (variance * (h + 1) as f64).sqrt();
            lower.push(point - z * se);
            upper.push(point + z * se);
        }

        Ok(Forecast::with_intervals(points, lower, upper, level))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> String {
        self.spec.to_string()
    }
}
