//! Stationarity-preserving reparameterisation of AR polynomials
//!
//! Maps unconstrained reals onto the coefficients of a stationary
//! autoregressive polynomial `1 - a_1 B - ... - a_p B^p` (Jones, 1980):
//! each real is squashed into a partial autocorrelation in `(-1, 1)` and the
//! Durbin-Levinson recursion turns those into polynomial coefficients. The
//! same map applied to negated moving-average coefficients keeps an MA
//! polynomial invertible.

/// Partial autocorrelations to AR coefficients
pub fn coefficients_from_partials(partials: &[f64]) -> Vec<f64> {
    let mut coefficients: Vec<f64> = Vec::with_capacity(partials.len());
    for &kappa in partials {
        let previous = coefficients.clone();
        for j in 0..previous.len() {
            coefficients[j] = previous[j] - kappa * previous[previous.len() - 1 - j];
        }
        coefficients.push(kappa);
    }
    coefficients
}

/// Unconstrained parameters to stationary AR coefficients
pub fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let partials: Vec<f64> = unconstrained.iter().map(|u| u.tanh()).collect();
    coefficients_from_partials(&partials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_maps_to_zero() {
        assert_eq!(constrain_stationary(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_coefficients_from_partials() {
        // a_2 = k_2, a_1 = k_1 (1 - k_2)
        let coefficients = coefficients_from_partials(&[0.5, 0.3]);

        assert_abs_diff_eq!(coefficients[0], 0.35, epsilon = 1e-12);
        assert_abs_diff_eq!(coefficients[1], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_constrained_polynomial_is_stationary() {
        // Large unconstrained values still land strictly inside the region.
        let coefficients = constrain_stationary(&[3.0, -2.5]);
        let (a1, a2) = (coefficients[0], coefficients[1]);

        // AR(2) stationarity triangle
        assert!(a1 + a2 < 1.0);
        assert!(a2 - a1 < 1.0);
        assert!(a2.abs() < 1.0);
    }
}
