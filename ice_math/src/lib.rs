//! # Ice Math
//!
//! Numerical building blocks for yearly sea-ice series forecasting.
//! This crate provides the pieces the ARIMA estimator is assembled from:
//! differencing, sample statistics, the Levinson-Durbin recursion,
//! stationarity-preserving parameter transforms and a derivative-free
//! minimiser.

use thiserror::Error;

pub mod differencing;
pub mod levinson;
pub mod optimize;
pub mod statistics;
pub mod stationarity;

/// Errors that can occur in numerical routines
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;
