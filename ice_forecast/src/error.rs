//! Error types for the ice_forecast crate

use ice_math::MathError;
use std::fmt;
use thiserror::Error;

/// Custom error types for the ice_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Series too short or degenerate for a model to be fitted
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Fitting or prediction produced a numerical problem
    #[error("Numerical failure: {0}")]
    NumericalFailure(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to dataset contents
    #[error("Data error: {0}")]
    DataError(String),

    /// Error in the configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error from JSON parsing
    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientData(msg) => ForecastError::InsufficientData(msg),
            MathError::InvalidInput(msg) => ForecastError::InvalidParameter(msg),
            MathError::CalculationError(msg) => ForecastError::NumericalFailure(msg),
        }
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::JsonError(err.to_string())
    }
}

/// Category of a failed forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Series too short or degenerate for a fit
    InsufficientData,
    /// A fit or prediction step broke down numerically
    NumericalFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InsufficientData => write!(f, "insufficient data"),
            FailureKind::NumericalFailure => write!(f, "numerical failure"),
        }
    }
}

/// Why a forecast could not be produced
///
/// Unlike [`ForecastError`] this is cheap to clone, so failed outcomes can be
/// memoised alongside successful ones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Forecast unavailable ({kind}): {cause}")]
pub struct ForecastFailure {
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable description of the underlying cause
    pub cause: String,
}

impl ForecastFailure {
    /// Create a failure of the given kind
    pub fn new(kind: FailureKind, cause: impl Into<String>) -> Self {
        Self {
            kind,
            cause: cause.into(),
        }
    }
}

impl From<ForecastError> for ForecastFailure {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::InsufficientData(msg) => {
                ForecastFailure::new(FailureKind::InsufficientData, msg)
            }
            ForecastError::NumericalFailure(msg) => {
                ForecastFailure::new(FailureKind::NumericalFailure, msg)
            }
            other => ForecastFailure::new(FailureKind::NumericalFailure, other.to_string()),
        }
    }
}
