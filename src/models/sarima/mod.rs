//! Seasonal ARIMA model.
//!
//! Provides the SARIMA(p, d, q)(P, D, Q)\[s\] model fitted by conditional
//! least squares, plus the differencing transforms it is built on.

mod diff;
mod model;

pub use diff::{difference, integrate, seasonal_difference, seasonal_integrate};
pub use model::{Sarima, SarimaSpec};
