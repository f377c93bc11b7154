//! Statistical helper functions.

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the sample variance of a slice (n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Approximate quantile function for the standard normal distribution.
///
/// Uses the Abramowitz and Stegun rational approximation (formula 26.2.23),
/// accurate to about 4.5e-4, which is ample for interval bounds.
///
/// # Example
/// ```
/// use ventas_forecast::utils::quantile_normal;
///
/// // two-sided 95% level -> z ~= 1.96
/// let z = quantile_normal(0.975);
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn quantile_normal(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let q = p.min(1.0 - p);
    let t = (-2.0 * q.ln()).sqrt();

    let num = 2.515517 + 0.802853 * t + 0.010328 * t * t;
    let den = 1.0 + 1.432788 * t + 0.189269 * t * t + 0.001308 * t * t * t;
    let z = t - num / den;

    if p < 0.5 {
        -z
    } else {
        z
    }
}
