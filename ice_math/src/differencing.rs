//! Differencing and its inverse
//!
//! An ARIMA model with `d > 0` is estimated on the `d`-times differenced
//! series and its forecasts have to be integrated back onto the original
//! scale. Integration needs the last observation of every intermediate
//! differencing level, which [`DifferencedSeries`] keeps alongside the
//! differenced values.

use crate::{MathError, Result};

/// Apply `order` rounds of first differencing
pub fn difference(data: &[f64], order: usize) -> Result<Vec<f64>> {
    if data.len() <= order {
        return Err(MathError::InsufficientData(format!(
            "Differencing of order {} needs more than {} observations, got {}",
            order,
            order,
            data.len()
        )));
    }

    let mut result = data.to_vec();
    for _ in 0..order {
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }

    Ok(result)
}

/// A differenced series together with what is needed to undo the differencing
#[derive(Debug, Clone, PartialEq)]
pub struct DifferencedSeries {
    values: Vec<f64>,
    /// Last value of the series at differencing levels `0..order`
    tails: Vec<f64>,
}

impl DifferencedSeries {
    /// Difference `data` `order` times, remembering the tail of every level
    pub fn new(data: &[f64], order: usize) -> Result<Self> {
        if data.len() <= order {
            return Err(MathError::InsufficientData(format!(
                "Differencing of order {} needs more than {} observations, got {}",
                order,
                order,
                data.len()
            )));
        }

        let mut level = data.to_vec();
        let mut tails = Vec::with_capacity(order);
        for _ in 0..order {
            // Non-empty: each level is one shorter and len > order.
            tails.push(level[level.len() - 1]);
            level = level.windows(2).map(|w| w[1] - w[0]).collect();
        }

        Ok(Self {
            values: level,
            tails,
        })
    }

    /// The differenced values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Differencing order
    pub fn order(&self) -> usize {
        self.tails.len()
    }

    /// Map values on the differenced scale back onto the original scale
    ///
    /// `forecasts` are taken to continue directly after the observed series.
    pub fn integrate(&self, forecasts: &[f64]) -> Vec<f64> {
        let mut result = forecasts.to_vec();
        for &last in self.tails.iter().rev() {
            let mut running = last;
            for value in result.iter_mut() {
                running += *value;
                *value = running;
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_difference() {
        let diff = difference(&[10.0, 12.0, 15.0, 14.0, 18.0], 1).unwrap();
        assert_eq!(diff, vec![2.0, 3.0, -1.0, 4.0]);
    }

    #[test]
    fn test_second_difference() {
        let diff = difference(&[1.0, 4.0, 9.0, 16.0, 25.0], 2).unwrap();
        assert_eq!(diff, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_difference_too_short() {
        assert!(difference(&[1.0], 1).is_err());
        assert_eq!(difference(&[1.0], 0).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_integrate_continues_series() {
        let series = DifferencedSeries::new(&[1.0, 2.0, 3.0, 4.0, 5.0], 1).unwrap();
        assert_eq!(series.values(), &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(series.integrate(&[1.0, 1.0]), vec![6.0, 7.0]);
    }

    #[test]
    fn test_integrate_second_order() {
        // Squares have a constant second difference of 2.
        let series = DifferencedSeries::new(&[1.0, 4.0, 9.0, 16.0, 25.0], 2).unwrap();
        assert_eq!(series.order(), 2);
        assert_eq!(series.integrate(&[2.0, 2.0]), vec![36.0, 49.0]);
    }

    #[test]
    fn test_zero_order_is_identity() {
        let series = DifferencedSeries::new(&[3.0, 1.0], 0).unwrap();
        assert_eq!(series.values(), &[3.0, 1.0]);
        assert_eq!(series.integrate(&[7.0]), vec![7.0]);
    }
}
