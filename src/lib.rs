//! # Polar Ice
//!
//! `polar_ice` bundles the workspace crates for forecasting regional sea-ice
//! melt and freeze dates:
//!
//! - [`forecast`]: datasets, the hybrid ARIMA + random-forest forecaster and reports
//! - [`math`]: differencing, autocovariance, stationarity transforms and optimisation
//!
//! ## Example
//!
//! ```
//! use polar_ice::forecast::HybridForecaster;
//!
//! let forecaster = HybridForecaster::new();
//! let forecast = forecaster.forecast(&[1.0, 2.0, 3.0, 4.0, 5.0], 30).unwrap();
//! assert!((forecast.autoregressive - 6.0).abs() < 1e-3);
//! ```

pub use ice_forecast as forecast;
pub use ice_math as math;

pub use ice_forecast::{
    FailureKind, ForecastError, ForecastFailure, ForecastOutcome, ForecasterConfig,
    HybridForecast, HybridForecaster,
};
