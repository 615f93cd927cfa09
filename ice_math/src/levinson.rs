//! Levinson-Durbin recursion
//!
//! Solves the Yule-Walker equations for an autoregression of a given order
//! from sample autocovariances, producing the partial autocorrelations along
//! the way.

use crate::{MathError, Result};

/// Variance below which a series is treated as constant
const DEGENERATE_VARIANCE: f64 = 1e-12;

/// Yule-Walker autoregression estimate
#[derive(Debug, Clone, PartialEq)]
pub struct ArEstimate {
    /// AR coefficients `phi_1..phi_p`
    pub coefficients: Vec<f64>,
    /// Partial autocorrelations at lags `1..=p`
    pub partial_autocorrelations: Vec<f64>,
    /// Innovation variance left after the order-`p` fit
    pub innovation_variance: f64,
}

/// Run the Levinson-Durbin recursion up to `order`
///
/// `autocov` must hold autocovariances for lags `0..=order`. A constant
/// series (zero lag-0 autocovariance) yields all-zero coefficients rather
/// than an error.
pub fn levinson_durbin(autocov: &[f64], order: usize) -> Result<ArEstimate> {
    if autocov.len() <= order {
        return Err(MathError::InsufficientData(format!(
            "Order {} recursion needs {} autocovariances, got {}",
            order,
            order + 1,
            autocov.len()
        )));
    }
    if autocov[0] < 0.0 {
        return Err(MathError::InvalidInput(
            "Lag-0 autocovariance must be non-negative".to_string(),
        ));
    }

    let mut coefficients: Vec<f64> = Vec::with_capacity(order);
    let mut partial_autocorrelations = Vec::with_capacity(order);
    let mut variance = autocov[0];

    for k in 1..=order {
        let kappa = if variance > DEGENERATE_VARIANCE {
            let acc: f64 = autocov[k]
                - coefficients
                    .iter()
                    .enumerate()
                    .map(|(j, phi)| phi * autocov[k - 1 - j])
                    .sum::<f64>();
            acc / variance
        } else {
            0.0
        };

        let previous = coefficients.clone();
        for j in 0..previous.len() {
            coefficients[j] = previous[j] - kappa * previous[previous.len() - 1 - j];
        }
        coefficients.push(kappa);
        partial_autocorrelations.push(kappa);

        variance *= 1.0 - kappa * kappa;
    }

    Ok(ArEstimate {
        coefficients,
        partial_autocorrelations,
        innovation_variance: variance.max(0.0),
    })
}
