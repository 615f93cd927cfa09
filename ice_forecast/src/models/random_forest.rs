//! Random forest regression over the position index
//!
//! As a [`ForecastModel`] the forest learns `index -> value` on the training
//! series and extrapolates by predicting the indices that follow it. Tree
//! predictions are piecewise constant, so beyond the observed range the
//! forest returns the average of the right-most leaves.

use crate::config::ForestConfig;
use crate::error::{ForecastError, Result};
use crate::models::decision_tree::{RegressionTree, TreeSettings};
use crate::models::{ensure_finite, ForecastModel, ForecastResult, TrainedForecastModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Random forest regressor
#[derive(Debug, Clone)]
pub struct RandomForestModel {
    /// Name of the model
    name: String,
    /// Number of trees
    n_estimators: usize,
    /// Seed for bootstrap resampling
    seed: u64,
    /// Whether each tree sees a bootstrap resample or the full sample
    bootstrap: bool,
    /// Per-tree growth limits
    tree: TreeSettings,
}

/// Trained random forest
#[derive(Debug, Clone)]
pub struct TrainedRandomForest {
    /// Name of the model
    name: String,
    /// Fitted trees
    trees: Vec<RegressionTree>,
    /// Length of the training series
    n_observations: usize,
}

impl RandomForestModel {
    /// Create a new random forest with default tree settings
    pub fn new(n_estimators: usize, seed: u64) -> Result<Self> {
        if n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "Number of trees must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            name: format!("RandomForest(trees={}, seed={})", n_estimators, seed),
            n_estimators,
            seed,
            bootstrap: true,
            tree: TreeSettings::default(),
        })
    }

    /// Create a forest from configuration
    pub fn from_config(config: &ForestConfig) -> Result<Self> {
        Self::new(config.n_estimators, config.seed)?
            .with_bootstrap(config.bootstrap)
            .with_tree_settings(TreeSettings {
                max_depth: config.max_depth,
                min_samples_split: config.min_samples_split,
                min_samples_leaf: config.min_samples_leaf,
            })
    }

    /// Enable or disable bootstrap resampling
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Replace the per-tree growth limits
    pub fn with_tree_settings(mut self, tree: TreeSettings) -> Result<Self> {
        tree.validate()?;
        self.tree = tree;
        Ok(self)
    }

    /// Use a different seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.name = format!("RandomForest(trees={}, seed={})", self.n_estimators, seed);
        self
    }

    /// Seed for bootstrap resampling
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of trees
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Fit the forest to arbitrary `(feature, target)` pairs
    pub fn fit(&self, features: &[f64], targets: &[f64]) -> Result<Vec<RegressionTree>> {
        if features.is_empty() {
            return Err(ForecastError::InsufficientData(format!(
                "{} needs at least 1 observation, got 0",
                self.name
            )));
        }
        if features.len() != targets.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Feature length ({}) doesn't match target length ({})",
                features.len(),
                targets.len()
            )));
        }

        let n = features.len();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            let tree = if self.bootstrap {
                let (x, y): (Vec<f64>, Vec<f64>) = (0..n)
                    .map(|_| {
                        let i = rng.gen_range(0..n);
                        (features[i], targets[i])
                    })
                    .unzip();
                RegressionTree::fit(&x, &y, &self.tree)?
            } else {
                RegressionTree::fit(features, targets, &self.tree)?
            };
            trees.push(tree);
        }

        Ok(trees)
    }
}

impl Default for RandomForestModel {
    /// 50 fully grown trees, seed 42
    fn default() -> Self {
        Self {
            name: "RandomForest(trees=50, seed=42)".to_string(),
            n_estimators: 50,
            seed: 42,
            bootstrap: true,
            tree: TreeSettings::default(),
        }
    }
}

impl ForecastModel for RandomForestModel {
    type Trained = TrainedRandomForest;

    fn train(&self, series: &[f64]) -> Result<TrainedRandomForest> {
        ensure_finite(&self.name, series)?;

        let positions: Vec<f64> = (0..series.len()).map(|i| i as f64).collect();
        let trees = self.fit(&positions, series)?;

        debug!(
            model = %self.name,
            observations = series.len(),
            leaves = trees.iter().map(RegressionTree::leaf_count).sum::<usize>(),
            "fitted random forest"
        );

        Ok(TrainedRandomForest {
            name: self.name.clone(),
            trees,
            n_observations: series.len(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedRandomForest {
    /// Average tree prediction at a feature value
    pub fn predict(&self, feature: f64) -> f64 {
        self.trees.iter().map(|tree| tree.predict(feature)).sum::<f64>() / self.trees.len() as f64
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl TrainedForecastModel for TrainedRandomForest {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }

        let values: Vec<f64> = (self.n_observations..self.n_observations + horizon)
            .map(|position| self.predict(position as f64))
            .collect();

        ForecastResult::new(values, horizon)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
