//! Error types for the ventas-forecast library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur across the forecasting pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// A required input column is missing or a cell could not be parsed.
    #[error("schema error: {0}")]
    Schema(String),

    /// The input contains no usable transaction rows.
    #[error("empty input: no usable transaction rows")]
    EmptyInput,

    /// No candidate model could be fitted during selection.
    #[error("model selection failed: none of {tried} candidate orders produced a valid fit")]
    ModelSelection { tried: usize },

    /// Requested forecast horizon is outside the accepted range.
    #[error("invalid horizon: {got} (must be between 1 and {max})")]
    InvalidHorizon { got: usize, max: usize },

    /// A metric is undefined for the given window (e.g. MAPE over all-zero actuals).
    #[error("undefined metric: {0}")]
    UndefinedMetric(String),

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Numerical failure inside a model fit or transform.
    #[error("computation error: {0}")]
    Computation(String),

    /// Underlying I/O failure while reading or writing tabular data.
    #[error("io error: {0}")]
    Io(String),
}

impl ForecastError {
    /// Stable machine-readable kind for the boundary payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::Schema(_) => ErrorKind::Schema,
            ForecastError::EmptyInput => ErrorKind::EmptyInput,
            ForecastError::ModelSelection { .. } => ErrorKind::ModelSelection,
            ForecastError::InvalidHorizon { .. } => ErrorKind::InvalidHorizon,
            ForecastError::UndefinedMetric(_) => ErrorKind::UndefinedMetric,
            ForecastError::InsufficientData { .. } => ErrorKind::InsufficientData,
            ForecastError::FitRequired => ErrorKind::FitRequired,
            ForecastError::Computation(_) => ErrorKind::Computation,
            ForecastError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Machine-readable error discriminant, serialized in snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Schema,
    EmptyInput,
    ModelSelection,
    InvalidHorizon,
    UndefinedMetric,
    InsufficientData,
    FitRequired,
    Computation,
    Io,
}

/// Structured error payload for the presentation boundary.
///
/// A bare message string is not enough for a glue layer to pick a failure
/// status, so the payload carries a machine-readable kind alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ForecastError> for ErrorPayload {
    fn from(err: &ForecastError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ForecastError::EmptyInput;
        assert_eq!(err.to_string(), "empty input: no usable transaction rows");

        let err = ForecastError::Schema("missing required column 'amount'".to_string());
        assert_eq!(
            err.to_string(),
            "schema error: missing required column 'amount'"
        );

        let err = ForecastError::ModelSelection { tried: 64 };
        assert_eq!(
            err.to_string(),
            "model selection failed: none of 64 candidate orders produced a valid fit"
        );

        let err = ForecastError::InvalidHorizon { got: 0, max: 60 };
        assert_eq!(
            err.to_string(),
            "invalid horizon: 0 (must be between 1 and 60)"
        );

        let err = ForecastError::InsufficientData { needed: 14, got: 5 };
        assert_eq!(err.to_string(), "insufficient data: need at least 14, got 5");
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = ForecastError::FitRequired;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn payload_carries_kind_and_message() {
        let err = ForecastError::InvalidHorizon { got: 0, max: 60 };
        let payload = ErrorPayload::from(&err);

        assert_eq!(payload.kind, ErrorKind::InvalidHorizon);
        assert!(payload.message.contains("invalid horizon"));

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "invalid_horizon");
    }
}
