//! Derivative-free minimisation with the Nelder-Mead simplex method

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Nelder-Mead simplex minimiser settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NelderMead {
    /// Iteration cap
    pub max_iterations: usize,
    /// Stop once the spread of objective values across the simplex is below this
    pub value_tolerance: f64,
    /// ...and every vertex lies within this distance of the best one
    pub point_tolerance: f64,
    /// Edge length of the initial simplex
    pub initial_step: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            value_tolerance: 1e-10,
            point_tolerance: 1e-8,
            initial_step: 0.1,
        }
    }
}

/// Outcome of a minimisation
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the tolerances were met before the iteration cap
    pub converged: bool,
}

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

impl NelderMead {
    /// Check the settings
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(MathError::InvalidInput(
                "Iteration cap must be greater than zero".to_string(),
            ));
        }
        if !(self.initial_step > 0.0) {
            return Err(MathError::InvalidInput(
                "Initial simplex step must be positive".to_string(),
            ));
        }
        if self.value_tolerance < 0.0 || self.point_tolerance < 0.0 {
            return Err(MathError::InvalidInput(
                "Tolerances must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Minimise `objective` starting from `start`
    ///
    /// NaN objective values are treated as `+inf`, so the simplex moves away
    /// from regions where the objective is undefined. The start point itself
    /// must evaluate to a finite value.
    pub fn minimize<F>(&self, objective: F, start: &[f64]) -> Result<Minimum>
    where
        F: Fn(&[f64]) -> f64,
    {
        self.validate()?;

        let eval = |x: &[f64]| {
            let v = objective(x);
            if v.is_nan() {
                f64::INFINITY
            } else {
                v
            }
        };

        let start_value = eval(start);
        if !start_value.is_finite() {
            return Err(MathError::CalculationError(format!(
                "Objective is not finite at the starting point ({})",
                start_value
            )));
        }

        let dims = start.len();
        if dims == 0 {
            return Ok(Minimum {
                point: Vec::new(),
                value: start_value,
                iterations: 0,
                converged: true,
            });
        }

        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dims + 1);
        simplex.push((start.to_vec(), start_value));
        for i in 0..dims {
            let mut vertex = start.to_vec();
            vertex[i] += self.initial_step;
            let value = eval(&vertex);
            simplex.push((vertex, value));
        }

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            // Stable sort keeps the earliest vertex first among ties.
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            if self.has_converged(&simplex) {
                converged = true;
                break;
            }
            iterations += 1;

            let worst = dims;
            let centroid: Vec<f64> = (0..dims)
                .map(|k| simplex[..worst].iter().map(|(x, _)| x[k]).sum::<f64>() / dims as f64)
                .collect();

            let reflected = along(&centroid, &simplex[worst].0, -REFLECTION);
            let reflected_value = eval(&reflected);

            if reflected_value < simplex[0].1 {
                let expanded = along(&centroid, &simplex[worst].0, -EXPANSION);
                let expanded_value = eval(&expanded);
                simplex[worst] = if expanded_value < reflected_value {
                    (expanded, expanded_value)
                } else {
                    (reflected, reflected_value)
                };
                continue;
            }

            if reflected_value < simplex[worst - 1].1 {
                simplex[worst] = (reflected, reflected_value);
                continue;
            }

            let (contracted, contracted_value) = if reflected_value < simplex[worst].1 {
                let outside = along(&centroid, &reflected, CONTRACTION);
                let value = eval(&outside);
                (outside, value)
            } else {
                let inside = along(&centroid, &simplex[worst].0, CONTRACTION);
                let value = eval(&inside);
                (inside, value)
            };

            if contracted_value < simplex[worst].1.min(reflected_value) {
                simplex[worst] = (contracted, contracted_value);
                continue;
            }

            let best = simplex[0].0.clone();
            for (vertex, value) in simplex.iter_mut().skip(1) {
                *vertex = along(&best, vertex, SHRINK);
                *value = eval(vertex);
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (point, value) = simplex.swap_remove(0);

        Ok(Minimum {
            point,
            value,
            iterations,
            converged,
        })
    }

    fn has_converged(&self, sorted: &[(Vec<f64>, f64)]) -> bool {
        let best = &sorted[0];
        let spread = sorted
            .iter()
            .map(|(_, v)| (v - best.1).abs())
            .fold(0.0, f64::max);
        let diameter = sorted
            .iter()
            .flat_map(|(x, _)| x.iter().zip(best.0.iter()).map(|(a, b)| (a - b).abs()))
            .fold(0.0, f64::max);

        spread <= self.value_tolerance && diameter <= self.point_tolerance
    }
}

/// `origin + t * (target - origin)`
fn along(origin: &[f64], target: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, x)| o + t * (x - o))
        .collect()
}
