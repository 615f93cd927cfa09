//! Hybrid ARIMA + random-forest forecaster
//!
//! The one-step-ahead ARIMA forecast is taken as the base estimate and the
//! forest's prediction at the next position index is added to it as a
//! correction term. Both models are fitted on every cache miss; a failure in
//! either one fails the whole forecast.
//!
//! ```
//! use ice_forecast::hybrid::HybridForecaster;
//!
//! let forecaster = HybridForecaster::new();
//! let forecast = forecaster.forecast(&[1.0, 2.0, 3.0, 4.0, 5.0], 30).unwrap();
//! assert!((forecast.autoregressive - 6.0).abs() < 1e-3);
//! assert_eq!(forecast.value, forecast.autoregressive + forecast.correction);
//!
//! assert!(forecaster.forecast(&[5.0], 30).is_err());
//! ```

use crate::cache::ForecastCache;
use crate::config::ForecasterConfig;
use crate::error::{ForecastError, ForecastFailure, Result};
use crate::models::arima::ArimaModel;
use crate::models::random_forest::RandomForestModel;
use crate::models::{ForecastModel, TrainedForecastModel};
use tracing::{debug, warn};

/// Most steps either model is asked for when the full horizon is forecast
///
/// Only the first step is used, so longer horizons are cut to this length.
pub const MAX_FORECAST_STEPS: usize = 1000;

/// A blended one-step forecast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridForecast {
    /// `autoregressive + correction`
    pub value: f64,
    /// One-step ARIMA forecast
    pub autoregressive: f64,
    /// Forest prediction at the next position index
    pub correction: f64,
    /// Horizon the forecast was requested with
    pub horizon: usize,
}

/// Either a forecast or the reason there is none
pub type ForecastOutcome = std::result::Result<HybridForecast, ForecastFailure>;

/// Memoising hybrid forecaster
#[derive(Debug)]
pub struct HybridForecaster<A = ArimaModel, R = RandomForestModel>
where
    A: ForecastModel,
    R: ForecastModel,
{
    autoregressive: A,
    correction: R,
    cache: ForecastCache,
    single_step: bool,
}

impl HybridForecaster {
    /// ARIMA(2,1,2) plus a 50-tree forest seeded with 42, unbounded cache
    pub fn new() -> Self {
        Self::with_models(ArimaModel::default(), RandomForestModel::default())
    }

    /// Build from configuration
    pub fn from_config(config: &ForecasterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_models(
            ArimaModel::from_config(&config.arima)?,
            RandomForestModel::from_config(&config.forest)?,
        )
        .with_cache(ForecastCache::with_capacity(config.cache_capacity))
        .with_single_step(config.single_step))
    }
}

impl Default for HybridForecaster {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> HybridForecaster<A, R>
where
    A: ForecastModel,
    R: ForecastModel,
{
    /// Combine any base model with any correction model
    pub fn with_models(autoregressive: A, correction: R) -> Self {
        Self {
            autoregressive,
            correction,
            cache: ForecastCache::new(),
            single_step: true,
        }
    }

    /// Replace the cache
    pub fn with_cache(mut self, cache: ForecastCache) -> Self {
        self.cache = cache;
        self
    }

    /// Forecast a single step from each model instead of the full horizon
    ///
    /// Only the first step is ever used, so this changes cost, not results.
    pub fn with_single_step(mut self, single_step: bool) -> Self {
        self.single_step = single_step;
        self
    }

    /// One-step-ahead forecast for `series`, memoised on `(series, horizon)`
    ///
    /// The cache lock is not held while fitting. Concurrent callers that miss
    /// on the same key each fit the models; the fits are deterministic, so
    /// they return equal outcomes and the cache keeps a single entry.
    pub fn forecast(&self, series: &[f64], horizon: usize) -> ForecastOutcome {
        if let Some(outcome) = self.cache.get(series, horizon) {
            return outcome;
        }

        let outcome = self.forecast_uncached(series, horizon);
        self.cache.insert(series, horizon, outcome.clone());
        outcome
    }

    /// One-step-ahead forecast without touching the cache
    pub fn forecast_uncached(&self, series: &[f64], horizon: usize) -> ForecastOutcome {
        self.fit_and_blend(series, horizon).map_err(|err| {
            let failure = ForecastFailure::from(err);
            warn!(
                len = series.len(),
                horizon,
                kind = %failure.kind,
                cause = %failure.cause,
                "forecast failed"
            );
            failure
        })
    }

    /// The memoisation cache
    pub fn cache(&self) -> &ForecastCache {
        &self.cache
    }

    /// Drop all memoised outcomes
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// The base model
    pub fn autoregressive_model(&self) -> &A {
        &self.autoregressive
    }

    /// The correction model
    pub fn correction_model(&self) -> &R {
        &self.correction
    }

    fn fit_and_blend(&self, series: &[f64], horizon: usize) -> Result<HybridForecast> {
        if horizon == 0 {
            return Err(ForecastError::InsufficientData(
                "forecast horizon must be at least 1".to_string(),
            ));
        }
        let steps = if self.single_step {
            1
        } else {
            horizon.min(MAX_FORECAST_STEPS)
        };

        let autoregressive = first_step(&self.autoregressive, series, steps)?;
        let correction = first_step(&self.correction, series, steps)?;
        let value = autoregressive + correction;

        if !value.is_finite() {
            return Err(ForecastError::NumericalFailure(format!(
                "blended forecast is not finite ({} + {})",
                autoregressive, correction
            )));
        }

        debug!(
            len = series.len(),
            horizon,
            autoregressive,
            correction,
            value,
            "hybrid forecast"
        );

        Ok(HybridForecast {
            value,
            autoregressive,
            correction,
            horizon,
        })
    }
}

/// Train `model` on `series` and return its first forecast step
fn first_step<M: ForecastModel>(model: &M, series: &[f64], steps: usize) -> Result<f64> {
    let trained = model.train(series)?;
    trained.forecast(steps)?.first().ok_or_else(|| {
        ForecastError::NumericalFailure(format!("{} returned an empty forecast", model.name()))
    })
}
