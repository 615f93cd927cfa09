//! # Ice Forecast
//!
//! Day-of-year forecasting for regional sea-ice melt and freeze events.
//!
//! ## Features
//!
//! - Hybrid forecaster: one-step ARIMA(2,1,2) forecast plus a random-forest correction
//! - Memoisation of forecast outcomes keyed on series content and horizon
//! - Explicit failure results instead of silent placeholder values
//! - Loading of the melt/freeze datasets and the affected-countries table
//! - Per-region selection reports mixing historical values and forecasts
//!
//! ## Quick Start
//!
//! ```rust
//! use ice_forecast::{FailureKind, HybridForecaster};
//!
//! let forecaster = HybridForecaster::new();
//!
//! let series = [152.0, 150.0, 149.0, 151.0, 147.0, 146.0, 148.0, 145.0];
//! let forecast = forecaster.forecast(&series, 30).unwrap();
//! assert!(forecast.value.is_finite());
//!
//! // Too short to fit ARIMA(2,1,2)
//! let failure = forecaster.forecast(&[150.0], 30).unwrap_err();
//! assert_eq!(failure.kind, FailureKind::InsufficientData);
//! ```

pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod hybrid;
pub mod models;
pub mod report;

// Re-export commonly used types
pub use crate::cache::ForecastCache;
pub use crate::config::ForecasterConfig;
pub use crate::data::{IceDataset, IceDatasets, IceMetric};
pub use crate::error::{FailureKind, ForecastError, ForecastFailure};
pub use crate::hybrid::{ForecastOutcome, HybridForecast, HybridForecaster};
pub use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
pub use crate::report::{IceReporter, SelectionReport};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
