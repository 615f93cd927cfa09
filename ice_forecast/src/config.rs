//! Forecaster configuration
//!
//! Everything has a default matching the reference setup: ARIMA(2,1,2), a
//! 50-tree forest seeded with 42, and a 30-year horizon. A JSON file only
//! needs to name the fields it changes.
//!
//! ```
//! use ice_forecast::config::ForecasterConfig;
//!
//! let config = ForecasterConfig::from_json_str(r#"{ "forest": { "seed": 7 } }"#).unwrap();
//! assert_eq!(config.forest.seed, 7);
//! assert_eq!(config.forest.n_estimators, 50);
//! assert_eq!((config.arima.p, config.arima.d, config.arima.q), (2, 1, 2));
//! ```

use crate::error::{ForecastError, Result};
use ice_math::optimize::NelderMead;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// ARIMA settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaConfig {
    /// AR order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
    /// Estimate a non-zero mean for the differenced series (off by default)
    pub include_drift: bool,
    /// Coverage of prediction intervals
    pub confidence_level: f64,
    /// Coefficient search settings
    pub optimizer: NelderMead,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self {
            p: 2,
            d: 1,
            q: 2,
            include_drift: false,
            confidence_level: 0.95,
            optimizer: NelderMead::default(),
        }
    }
}

/// Random forest settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees
    pub n_estimators: usize,
    /// Bootstrap seed
    pub seed: u64,
    /// Maximum tree depth, unbounded when absent
    pub max_depth: Option<usize>,
    /// Fewest samples a node needs to be split
    pub min_samples_split: usize,
    /// Fewest samples allowed in a leaf
    pub min_samples_leaf: usize,
    /// Resample the training data for each tree
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 50,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
        }
    }
}

/// File names of the datasets, relative to the data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetPaths {
    pub early_melt: String,
    pub late_melt: String,
    pub early_freeze: String,
    pub late_freeze: String,
    /// Region to affected-countries table
    pub countries: String,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            early_melt: "DS1.csv".to_string(),
            late_melt: "DS2.csv".to_string(),
            early_freeze: "DS3.csv".to_string(),
            late_freeze: "DS4.csv".to_string(),
            countries: "countries_affected.csv".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecasterConfig {
    pub arima: ArimaConfig,
    pub forest: ForestConfig,
    /// Years forecast beyond the last historical year
    pub horizon: usize,
    /// Ask each model for one step instead of the full horizon
    pub single_step: bool,
    /// Bound on cached outcomes, unbounded when absent
    pub cache_capacity: Option<usize>,
    pub datasets: DatasetPaths,
}

impl Default for ForecasterConfig {
    fn default() -> Self {
        Self {
            arima: ArimaConfig::default(),
            forest: ForestConfig::default(),
            horizon: 30,
            single_step: true,
            cache_capacity: None,
            datasets: DatasetPaths::default(),
        }
    }
}

impl ForecasterConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::ConfigError(
                "horizon must be at least 1".to_string(),
            ));
        }
        if self.arima.p > 10 || self.arima.q > 10 || self.arima.d > 2 {
            return Err(ForecastError::ConfigError(format!(
                "unsupported ARIMA order ({},{},{})",
                self.arima.p, self.arima.d, self.arima.q
            )));
        }
        if self.arima.confidence_level <= 0.0 || self.arima.confidence_level >= 1.0 {
            return Err(ForecastError::ConfigError(
                "confidence_level must be between 0 and 1".to_string(),
            ));
        }
        if self.forest.n_estimators == 0 {
            return Err(ForecastError::ConfigError(
                "forest needs at least one tree".to_string(),
            ));
        }
        if self.cache_capacity == Some(0) {
            return Err(ForecastError::ConfigError(
                "cache_capacity must be at least 1 when set".to_string(),
            ));
        }
        self.arima
            .optimizer
            .validate()
            .map_err(|e| ForecastError::ConfigError(e.to_string()))?;
        Ok(())
    }
}
