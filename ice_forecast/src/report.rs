//! Per-region selection reports
//!
//! A report gathers the four melt/freeze values for one year and region.
//! Years inside the datasets are looked up directly; years past the last
//! recorded one are forecast from the region's full series. Every future
//! year therefore shows the same one-step forecast.

use crate::data::{normalize_name, IceDatasets, IceMetric};
use crate::error::{ForecastError, ForecastFailure, Result};
use crate::hybrid::HybridForecaster;
use crate::models::arima::ArimaModel;
use crate::models::random_forest::RandomForestModel;
use crate::models::ForecastModel;
use tracing::{debug, warn};

/// Upper end of the day-of-year scale used by charts
pub const DAYS_IN_YEAR: f64 = 365.0;

/// Where a reported value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Recorded in the dataset
    Historical,
    /// Produced by the hybrid forecaster
    Forecast,
}

/// One metric of a report
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValue {
    pub metric: IceMetric,
    pub source: ValueSource,
    /// Absent when the cell is empty or the forecast failed
    pub value: Option<f64>,
    /// Set when a forecast was attempted and failed
    pub failure: Option<ForecastFailure>,
}

impl MetricValue {
    /// Value to show, with 0.0 standing in for a missing one
    pub fn display_value(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}

/// Values of all four metrics for a year and region
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionReport {
    pub year: i32,
    /// Normalised region name
    pub region: String,
    pub values: Vec<MetricValue>,
}

impl SelectionReport {
    /// Whether the values were forecast rather than looked up
    pub fn is_forecast(&self) -> bool {
        self.values
            .iter()
            .any(|v| v.source == ValueSource::Forecast)
    }

    /// Value of one metric
    pub fn get(&self, metric: IceMetric) -> Option<&MetricValue> {
        self.values.iter().find(|v| v.metric == metric)
    }

    /// Metrics whose forecast failed
    pub fn failures(&self) -> impl Iterator<Item = &MetricValue> {
        self.values.iter().filter(|v| v.failure.is_some())
    }
}

/// Builds selection reports from the datasets and a forecaster
#[derive(Debug)]
pub struct IceReporter<'a, A = ArimaModel, R = RandomForestModel>
where
    A: ForecastModel,
    R: ForecastModel,
{
    datasets: &'a IceDatasets,
    forecaster: &'a HybridForecaster<A, R>,
    horizon: usize,
}

impl<'a, A, R> IceReporter<'a, A, R>
where
    A: ForecastModel,
    R: ForecastModel,
{
    /// Create a reporter forecasting `horizon` years past the data
    pub fn new(
        datasets: &'a IceDatasets,
        forecaster: &'a HybridForecaster<A, R>,
        horizon: usize,
    ) -> Self {
        Self {
            datasets,
            forecaster,
            horizon,
        }
    }

    /// Years recorded in the reference dataset, ascending
    pub fn historical_years(&self) -> Vec<i32> {
        let mut years = self.datasets.reference().years().to_vec();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// The `horizon` years after the last recorded one
    ///
    /// Stops early rather than wrapping when the years would leave the `i32` range.
    pub fn future_years(&self) -> Vec<i32> {
        let Some(last) = self.datasets.reference().last_year() else {
            return Vec::new();
        };
        let horizon = i32::try_from(self.horizon).unwrap_or(i32::MAX);
        (1..=horizon).map_while(|i| last.checked_add(i)).collect()
    }

    /// Historical years followed by future years
    pub fn all_years(&self) -> Vec<i32> {
        let mut years = self.historical_years();
        years.extend(self.future_years());
        years
    }

    /// Selectable regions
    pub fn regions(&self) -> &[String] {
        self.datasets.reference().regions()
    }

    /// Report the four metrics for `year` in `region`
    pub fn report(&self, year: i32, region: &str) -> Result<SelectionReport> {
        let region = normalize_name(region);
        if !self.datasets.reference().has_region(&region) {
            return Err(ForecastError::DataError(format!(
                "unknown region '{}'",
                region
            )));
        }

        let forecast = self
            .datasets
            .reference()
            .last_year()
            .map_or(false, |last| year > last);
        debug!(year, region = %region, forecast, "building selection report");

        let values = IceMetric::ALL
            .iter()
            .map(|&metric| {
                if forecast {
                    self.forecast_value(metric, &region)
                } else {
                    Ok(self.historical_value(metric, year, &region))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SelectionReport {
            year,
            region,
            values,
        })
    }

    fn historical_value(&self, metric: IceMetric, year: i32, region: &str) -> MetricValue {
        MetricValue {
            metric,
            source: ValueSource::Historical,
            value: self.datasets.get(metric).historical_value(year, region),
            failure: None,
        }
    }

    fn forecast_value(&self, metric: IceMetric, region: &str) -> Result<MetricValue> {
        let dataset = self.datasets.get(metric);
        if !dataset.has_region(region) {
            return Ok(MetricValue {
                metric,
                source: ValueSource::Forecast,
                value: None,
                failure: None,
            });
        }

        let series = dataset.series(region)?;
        let (value, failure) = match self.forecaster.forecast(&series, self.horizon) {
            Ok(forecast) => (Some(forecast.value), None),
            Err(failure) => {
                warn!(metric = %metric, region, %failure, "no forecast, showing placeholder");
                (None, Some(failure))
            }
        };

        Ok(MetricValue {
            metric,
            source: ValueSource::Forecast,
            value,
            failure,
        })
    }
}

/// Render a report as a text bar chart on a 0-365 day scale
///
/// Each line holds the metric label, a bar `width` characters wide at full
/// scale, and the value. Missing values draw an empty bar.
pub fn render_bar_chart(report: &SelectionReport, width: usize) -> String {
    let label_width = IceMetric::ALL
        .iter()
        .map(|m| m.label().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for value in &report.values {
        let shown = value.display_value();
        let filled = ((shown / DAYS_IN_YEAR).clamp(0.0, 1.0) * width as f64).round() as usize;
        out.push_str(&format!(
            "{:<label_width$} |{}{}| {:>6.1}\n",
            value.metric.label(),
            "#".repeat(filled),
            " ".repeat(width - filled),
            shown,
            label_width = label_width
        ));
    }
    out
}
