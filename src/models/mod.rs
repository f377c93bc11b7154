//! Forecasting models.

mod traits;

pub mod sarima;

pub use sarima::{Sarima, SarimaSpec};
pub use traits::{BoxedForecaster, Forecaster};
