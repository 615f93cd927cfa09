//! Sample statistics used during model estimation

use crate::{MathError, Result};
use statrs::statistics::Statistics;

/// Arithmetic mean of a non-empty sample
pub fn mean(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty sample".to_string(),
        ));
    }
    Ok(data.iter().mean())
}

/// Biased sample autocovariances for lags `0..=max_lag`
///
/// Uses the divisor `n` at every lag, which keeps the autocovariance
/// matrix positive semi-definite. Lags at or beyond the sample length are
/// zero.
pub fn autocovariances(data: &[f64], max_lag: usize) -> Result<Vec<f64>> {
    let n = data.len();
    let centre = mean(data)?;
    let centred: Vec<f64> = data.iter().map(|x| x - centre).collect();

    let acov = (0..=max_lag)
        .map(|lag| {
            if lag >= n {
                return 0.0;
            }
            centred[lag..]
                .iter()
                .zip(centred.iter())
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n as f64
        })
        .collect();

    Ok(acov)
}

/// Position of the first NaN or infinite value, if any
pub fn first_non_finite(data: &[f64]) -> Option<usize> {
    data.iter().position(|x| !x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap(), 3.0, epsilon = 1e-12);
        assert!(mean(&[]).is_err());
    }

    #[test]
    fn test_autocovariances() {
        let acov = autocovariances(&[1.0, -1.0, 1.0, -1.0], 2).unwrap();
        assert_relative_eq!(acov[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(acov[1], -0.75, epsilon = 1e-12);
        assert_relative_eq!(acov[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_autocovariances_past_sample_length() {
        let acov = autocovariances(&[1.0, 3.0], 4).unwrap();
        assert_eq!(acov.len(), 5);
        assert_eq!(&acov[2..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_first_non_finite() {
        assert_eq!(first_non_finite(&[1.0, 2.0]), None);
        assert_eq!(first_non_finite(&[1.0, f64::NAN, f64::INFINITY]), Some(1));
    }
}
