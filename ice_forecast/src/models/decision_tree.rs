//! CART regression trees over a single numeric feature
//!
//! Trees are grown greedily by squared error. Candidate thresholds are the
//! midpoints between consecutive distinct feature values, and a sample goes
//! left when its feature is `<=` the threshold.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Growth limits for a regression tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeSettings {
    /// Maximum depth, unbounded when `None`
    pub max_depth: Option<usize>,
    /// Fewest samples a node needs to be split
    pub min_samples_split: usize,
    /// Fewest samples allowed in a leaf
    pub min_samples_leaf: usize,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl TreeSettings {
    /// Check the settings
    pub fn validate(&self) -> Result<()> {
        if self.min_samples_split < 2 {
            return Err(ForecastError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "max_depth must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted regression tree
#[derive(Debug, Clone)]
pub struct RegressionTree {
    /// Arena of nodes, root first
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Grow a tree mapping `features[i]` to `targets[i]`
    pub fn fit(features: &[f64], targets: &[f64], settings: &TreeSettings) -> Result<Self> {
        settings.validate()?;
        if features.len() != targets.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Feature length ({}) doesn't match target length ({})",
                features.len(),
                targets.len()
            )));
        }
        if features.is_empty() {
            return Err(ForecastError::InsufficientData(
                "A regression tree needs at least one sample".to_string(),
            ));
        }

        let mut samples: Vec<(f64, f64)> = features
            .iter()
            .copied()
            .zip(targets.iter().copied())
            .collect();
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut tree = Self { nodes: Vec::new() };
        tree.grow(&samples, 0, settings);
        Ok(tree)
    }

    /// Predict the target for a feature value
    pub fn predict(&self, feature: f64) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    threshold,
                    left,
                    right,
                } => {
                    index = if feature <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }

    /// Grow the subtree for `samples` (sorted by feature), returning its root index
    fn grow(&mut self, samples: &[(f64, f64)], depth: usize, settings: &TreeSettings) -> usize {
        let index = self.nodes.len();
        let n = samples.len();
        let value = samples.iter().map(|(_, y)| y).sum::<f64>() / n as f64;
        self.nodes.push(Node::Leaf { value });

        let impurity = samples.iter().map(|(_, y)| (y - value).powi(2)).sum::<f64>() / n as f64;
        let depth_reached = settings.max_depth.map_or(false, |max| depth >= max);
        if n < settings.min_samples_split
            || n < 2 * settings.min_samples_leaf
            || depth_reached
            || impurity <= f64::EPSILON
        {
            return index;
        }

        let Some(split) = best_split(samples, settings.min_samples_leaf) else {
            return index;
        };

        let threshold = (samples[split - 1].0 + samples[split].0) / 2.0;
        let left = self.grow(&samples[..split], depth + 1, settings);
        let right = self.grow(&samples[split..], depth + 1, settings);
        self.nodes[index] = Node::Split {
            threshold,
            left,
            right,
        };
        index
    }
}

/// Size of the left partition minimising total squared error, if any split is valid
fn best_split(samples: &[(f64, f64)], min_leaf: usize) -> Option<usize> {
    let n = samples.len();
    let total_sum: f64 = samples.iter().map(|(_, y)| y).sum();
    let total_sq: f64 = samples.iter().map(|(_, y)| y * y).sum();

    let mut left_sum = 0.0;
    let mut left_sq = 0.0;
    let mut best: Option<(usize, f64)> = None;

    for i in 1..n {
        let y = samples[i - 1].1;
        left_sum += y;
        left_sq += y * y;

        if i < min_leaf || n - i < min_leaf {
            continue;
        }
        // Only split between distinct feature values.
        if samples[i - 1].0 >= samples[i].0 {
            continue;
        }

        let (n_left, n_right) = (i as f64, (n - i) as f64);
        let right_sum = total_sum - left_sum;
        let right_sq = total_sq - left_sq;
        let cost = (left_sq - left_sum * left_sum / n_left).max(0.0)
            + (right_sq - right_sum * right_sum / n_right).max(0.0);

        if best.map_or(true, |(_, best_cost)| cost < best_cost) {
            best = Some((i, cost));
        }
    }

    best.map(|(i, _)| i)
}
