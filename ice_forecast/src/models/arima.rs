//! ARIMA models for yearly series forecasting
//!
//! Coefficients are estimated by conditional sum of squares: the series is
//! differenced `d` times, optionally centred on its drift, and the AR/MA coefficients
//! minimising the squared one-step errors are found with a Nelder-Mead
//! search. The search runs over unconstrained reals that are mapped onto
//! stationary AR and invertible MA polynomials, so every candidate it
//! evaluates is a well-posed model.

use crate::config::ArimaConfig;
use crate::error::{ForecastError, Result};
use crate::models::{ensure_finite, ForecastModel, ForecastResult, TrainedForecastModel};
use ice_math::differencing::DifferencedSeries;
use ice_math::levinson::levinson_durbin;
use ice_math::optimize::NelderMead;
use ice_math::statistics::{autocovariances, mean};
use ice_math::stationarity::constrain_stationary;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

/// Largest starting partial autocorrelation, keeps `atanh` finite
const MAX_START_PARTIAL: f64 = 0.95;

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// MA order (q)
    q: usize,
    /// Whether the differenced series gets a non-zero mean
    include_drift: bool,
    /// Coverage of the prediction intervals
    confidence_level: f64,
    /// Coefficient search settings
    optimizer: NelderMead,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    /// Name of the model
    name: String,
    /// Differencing order (d)
    d: usize,
    /// Fitted AR coefficients
    ar_coefficients: Vec<f64>,
    /// Fitted MA coefficients
    ma_coefficients: Vec<f64>,
    /// Mean of the differenced series
    drift: f64,
    /// Innovation variance estimate
    sigma2: f64,
    /// Differenced training series, with the tails needed to integrate forecasts
    differenced: DifferencedSeries,
    /// Differenced series minus drift
    centred: Vec<f64>,
    /// One-step residuals from fitting
    residuals: Vec<f64>,
    /// Whether the coefficient search met its tolerances
    converged: bool,
    /// Coverage of the prediction intervals
    confidence_level: f64,
}

impl ArimaModel {
    /// Create a new ARIMA model
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        if p > 10 {
            return Err(ForecastError::InvalidParameter(
                "AR order must be <= 10".to_string(),
            ));
        }
        if d > 2 {
            return Err(ForecastError::InvalidParameter(
                "Differencing order must be <= 2".to_string(),
            ));
        }
        if q > 10 {
            return Err(ForecastError::InvalidParameter(
                "MA order must be <= 10".to_string(),
            ));
        }

        Ok(Self {
            name: format!("ARIMA({},{},{})", p, d, q),
            p,
            d,
            q,
            include_drift: false,
            confidence_level: 0.95,
            optimizer: NelderMead::default(),
        })
    }

    /// Create a model from configuration
    pub fn from_config(config: &ArimaConfig) -> Result<Self> {
        config.optimizer.validate()?;
        Ok(Self::new(config.p, config.d, config.q)?
            .with_drift(config.include_drift)
            .with_confidence_level(config.confidence_level)?
            .with_optimizer(config.optimizer))
    }

    /// Enable or disable the drift term, which is off by default
    pub fn with_drift(mut self, include_drift: bool) -> Self {
        self.include_drift = include_drift;
        self
    }

    /// Set the coverage of prediction intervals
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Result<Self> {
        if confidence_level <= 0.0 || confidence_level >= 1.0 {
            return Err(ForecastError::InvalidParameter(
                "Confidence level must be between 0 and 1".to_string(),
            ));
        }
        self.confidence_level = confidence_level;
        Ok(self)
    }

    /// Replace the coefficient search settings
    pub fn with_optimizer(mut self, optimizer: NelderMead) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Model order as `(p, d, q)`
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// Fewest observations the model can be fitted to
    ///
    /// Leaves at least two conditional residuals after differencing and
    /// conditioning on the first `p` values.
    pub fn min_observations(&self) -> usize {
        self.p + self.d + 2
    }

    /// Split unconstrained search parameters into AR and MA coefficients
    fn unpack(&self, params: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let ar = constrain_stationary(&params[..self.p]);
        // Invertibility of 1 + theta(B) is stationarity of 1 - (-theta)(B).
        let ma = constrain_stationary(&params[self.p..])
            .into_iter()
            .map(|a| -a)
            .collect();
        (ar, ma)
    }

    /// Starting point: Yule-Walker partial autocorrelations for AR, zeros for MA
    fn starting_point(&self, centred: &[f64]) -> Result<Vec<f64>> {
        let acov = autocovariances(centred, self.p)?;
        let estimate = levinson_durbin(&acov, self.p)?;

        let mut start: Vec<f64> = estimate
            .partial_autocorrelations
            .iter()
            .map(|r| r.clamp(-MAX_START_PARTIAL, MAX_START_PARTIAL).atanh())
            .collect();
        start.resize(self.p + self.q, 0.0);
        Ok(start)
    }
}

impl Default for ArimaModel {
    /// ARIMA(2,1,2) without a constant term
    fn default() -> Self {
        Self {
            name: "ARIMA(2,1,2)".to_string(),
            p: 2,
            d: 1,
            q: 2,
            include_drift: false,
            confidence_level: 0.95,
            optimizer: NelderMead::default(),
        }
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    fn train(&self, series: &[f64]) -> Result<TrainedArimaModel> {
        let required = self.min_observations();
        if series.len() < required {
            return Err(ForecastError::InsufficientData(format!(
                "{} needs at least {} observations, got {}",
                self.name,
                required,
                series.len()
            )));
        }
        ensure_finite(&self.name, series)?;

        let differenced = DifferencedSeries::new(series, self.d)?;
        let drift = if self.include_drift {
            mean(differenced.values())?
        } else {
            0.0
        };
        let centred: Vec<f64> = differenced.values().iter().map(|w| w - drift).collect();
        let conditioned = centred.len() - self.p;

        let objective = |params: &[f64]| {
            let (ar, ma) = self.unpack(params);
            let residuals = conditional_residuals(&centred, &ar, &ma);
            residuals.iter().map(|e| e * e).sum::<f64>() / conditioned as f64
        };

        let start = self.starting_point(&centred)?;
        let minimum = self.optimizer.minimize(objective, &start)?;
        if !minimum.converged {
            warn!(
                model = %self.name,
                iterations = minimum.iterations,
                "coefficient search hit its iteration cap, using best point found"
            );
        }

        let (ar_coefficients, ma_coefficients) = self.unpack(&minimum.point);
        let residuals = conditional_residuals(&centred, &ar_coefficients, &ma_coefficients);
        let sigma2 = minimum.value;
        if !sigma2.is_finite() {
            return Err(ForecastError::NumericalFailure(format!(
                "{} fit produced a non-finite innovation variance",
                self.name
            )));
        }

        debug!(
            model = %self.name,
            ar = ?ar_coefficients,
            ma = ?ma_coefficients,
            drift,
            sigma2,
            iterations = minimum.iterations,
            "fitted ARIMA"
        );

        Ok(TrainedArimaModel {
            name: self.name.clone(),
            d: self.d,
            ar_coefficients,
            ma_coefficients,
            drift,
            sigma2,
            differenced,
            centred,
            residuals,
            converged: minimum.converged,
            confidence_level: self.confidence_level,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArimaModel {
    /// Fitted AR coefficients
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    /// Fitted MA coefficients
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// Mean of the differenced series
    pub fn drift(&self) -> f64 {
        self.drift
    }

    /// Innovation variance estimate
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// One-step residuals on the differenced scale
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Whether the coefficient search converged
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Point forecasts on the differenced, centred scale
    fn forecast_centred(&self, horizon: usize) -> Vec<f64> {
        let mut history = self.centred.clone();
        let mut shocks = self.residuals.clone();

        for _ in 0..horizon {
            let len = history.len();
            let ar_part: f64 = self
                .ar_coefficients
                .iter()
                .enumerate()
                .map(|(i, phi)| phi * history[len - 1 - i])
                .sum();
            let ma_part: f64 = self
                .ma_coefficients
                .iter()
                .enumerate()
                .filter_map(|(j, theta)| len.checked_sub(1 + j).map(|k| theta * shocks[k]))
                .sum();

            history.push(ar_part + ma_part);
            // Future shocks have zero expectation.
            shocks.push(0.0);
        }

        history.split_off(self.centred.len())
    }

    /// MA(infinity) weights of the integrated process
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        // Expand (1 - phi(B)) (1 - B)^d
        let mut polynomial = vec![1.0];
        polynomial.extend(self.ar_coefficients.iter().map(|phi| -phi));
        for _ in 0..self.d {
            let mut next = polynomial.clone();
            next.push(0.0);
            for i in 1..next.len() {
                next[i] -= polynomial[i - 1];
            }
            polynomial = next;
        }
        let integrated_ar: Vec<f64> = polynomial[1..].iter().map(|c| -c).collect();

        let mut psi = Vec::with_capacity(horizon);
        psi.push(1.0);
        for j in 1..horizon {
            let mut weight = self.ma_coefficients.get(j - 1).copied().unwrap_or(0.0);
            for i in 1..=j.min(integrated_ar.len()) {
                weight += integrated_ar[i - 1] * psi[j - i];
            }
            psi.push(weight);
        }
        psi
    }

    /// Prediction intervals around `values`
    fn intervals(&self, values: &[f64]) -> Result<Vec<(f64, f64)>> {
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::NumericalFailure(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + self.confidence_level / 2.0);

        let mut cumulative = 0.0;
        let intervals = self
            .psi_weights(values.len())
            .into_iter()
            .zip(values)
            .map(|(psi, value)| {
                cumulative += psi * psi;
                let margin = z * (self.sigma2 * cumulative).sqrt();
                (value - margin, value + margin)
            })
            .collect();
        Ok(intervals)
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }

        let differenced: Vec<f64> = self
            .forecast_centred(horizon)
            .into_iter()
            .map(|z| z + self.drift)
            .collect();
        let values = self.differenced.integrate(&differenced);

        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::NumericalFailure(format!(
                "{} produced a non-finite forecast",
                self.name
            )));
        }

        let intervals = self.intervals(&values)?;
        ForecastResult::new_with_intervals(values, horizon, intervals)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// One-step errors of an ARMA model, conditioning on the first `p` values
///
/// Errors before the first conditioned observation are taken as zero.
fn conditional_residuals(centred: &[f64], ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let p = ar.len();
    let mut residuals = vec![0.0; centred.len()];

    for t in p..centred.len() {
        let ar_part: f64 = ar
            .iter()
            .enumerate()
            .map(|(i, phi)| phi * centred[t - 1 - i])
            .sum();
        let ma_part: f64 = ma
            .iter()
            .enumerate()
            .filter(|(j, _)| t > *j)
            .map(|(j, theta)| theta * residuals[t - 1 - j])
            .sum();
        residuals[t] = centred[t] - ar_part - ma_part;
    }

    residuals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditional_residuals_pure_ar() {
        let residuals = conditional_residuals(&[1.0, 2.0, 3.0], &[0.5], &[]);
        assert_eq!(residuals, vec![0.0, 1.5, 2.0]);
    }

    #[test]
    fn test_conditional_residuals_ma_feedback() {
        // e_1 = 1, e_2 = 1 - 0.5 * 1
        let residuals = conditional_residuals(&[0.0, 1.0, 1.0], &[], &[0.5]);
        assert_eq!(residuals, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_psi_weights_random_walk() {
        let model = ArimaModel::new(0, 1, 0).unwrap();
        let trained = model.train(&[1.0, 3.0, 2.0, 4.0, 3.0]).unwrap();
        // Every shock persists fully in a random walk.
        assert_eq!(trained.psi_weights(4), vec![1.0, 1.0, 1.0, 1.0]);
    }
}
