//! Differencing and integration transforms for SARIMA.

/// Apply ordinary differencing of order `d`.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return vec![];
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply seasonal differencing of order `d` at lag `period`.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return vec![];
        }
        result = (period..result.len())
            .map(|i| result[i] - result[i - period])
            .collect();
    }
    result
}

/// Undo ordinary differencing of order `d` for a forecast continuation.
///
/// `history` is the series on the undifferenced scale; its trailing values
/// seed the cumulative sums at each level.
pub fn integrate(forecast: &[f64], history: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || forecast.is_empty() {
        return forecast.to_vec();
    }

    let mut result = forecast.to_vec();
    for level in (0..d).rev() {
        let base = difference(history, level);
        let mut cumsum = base.last().copied().unwrap_or(0.0);
        for value in &mut result {
            cumsum += *value;
            *value = cumsum;
        }
    }
    result
}

/// Undo seasonal differencing of order `d` at lag `period` for a forecast
/// continuation.
///
/// Each forecast step adds back the value one season earlier, drawing first
/// from `history` and then from already-reconstructed steps.
pub fn seasonal_integrate(forecast: &[f64], history: &[f64], d: usize, period: usize) -> Vec<f64> {
    if d == 0 || period == 0 || forecast.is_empty() {
        return forecast.to_vec();
    }

    let mut result = forecast.to_vec();
    for level in (0..d).rev() {
        let base = seasonal_difference(history, level, period);
        if base.len() < period {
            // Not enough seasonal history to invert; leave as-is.
            return result;
        }
        let mut extended = base;
        let mut integrated = Vec::with_capacity(result.len());
        for &step in &result {
            let value = step + extended[extended.len() - period];
            integrated.push(value);
            extended.push(value);
        }
        result = integrated;
    }
    result
}
