//! Regional sea-ice datasets
//!
//! Each dataset is a CSV table with a `yyyy` year column followed by one
//! column per region, holding the day of year on which a melt or freeze
//! event was recorded. Column names are normalised (trimmed, lower-cased)
//! on load, and empty cells are kept as missing values.

use crate::config::DatasetPaths;
use crate::error::{ForecastError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Name of the year column after normalisation
pub const YEAR_COLUMN: &str = "yyyy";

/// Normalise a column or region name: trimmed and lower-cased
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The four recorded sea-ice events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IceMetric {
    EarlyMelt,
    LateMelt,
    EarlyFreeze,
    LateFreeze,
}

impl IceMetric {
    /// All metrics in display order
    pub const ALL: [IceMetric; 4] = [
        IceMetric::EarlyMelt,
        IceMetric::LateMelt,
        IceMetric::EarlyFreeze,
        IceMetric::LateFreeze,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            IceMetric::EarlyMelt => "Early Melt",
            IceMetric::LateMelt => "Late Melt",
            IceMetric::EarlyFreeze => "Early Freeze",
            IceMetric::LateFreeze => "Late Freeze",
        }
    }
}

impl fmt::Display for IceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One year-by-region table
#[derive(Debug, Clone, PartialEq)]
pub struct IceDataset {
    /// Normalised region names, in file order
    regions: Vec<String>,
    /// Year of each row
    years: Vec<i32>,
    /// `rows[i][j]` is the value for `years[i]` and `regions[j]`
    rows: Vec<Vec<Option<f64>>>,
}

impl IceDataset {
    /// Load a dataset from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dataset = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            years = dataset.years.len(),
            regions = dataset.regions.len(),
            "loaded ice dataset"
        );
        Ok(dataset)
    }

    /// Load a dataset from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv.headers()?.iter().map(normalize_name).collect();
        match headers.first() {
            Some(first) if first == YEAR_COLUMN => {}
            _ => {
                return Err(ForecastError::DataError(format!(
                    "first column must be '{}'",
                    YEAR_COLUMN
                )))
            }
        }
        let regions = headers[1..].to_vec();

        let mut years = Vec::new();
        let mut rows = Vec::new();
        for (line, record) in csv.records().enumerate() {
            let record = record?;
            years.push(parse_year(&record, line)?);
            rows.push(parse_row(&record, &regions, line)?);
        }

        Ok(Self {
            regions,
            years,
            rows,
        })
    }

    /// Years in file order
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Normalised region names
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Number of years
    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// Whether the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Last (most recent) year
    pub fn last_year(&self) -> Option<i32> {
        self.years.iter().copied().max()
    }

    /// Whether the dataset has a column for `region`
    pub fn has_region(&self, region: &str) -> bool {
        self.region_index(region).is_some()
    }

    fn region_index(&self, region: &str) -> Option<usize> {
        let region = normalize_name(region);
        self.regions.iter().position(|r| *r == region)
    }

    /// Recorded value for `year` in `region`, if the year exists and the cell is filled
    pub fn historical_value(&self, year: i32, region: &str) -> Option<f64> {
        let column = self.region_index(region)?;
        let row = self.years.iter().position(|y| *y == year)?;
        self.rows[row][column]
    }

    /// The region's values in year order, missing cells skipped
    pub fn series(&self, region: &str) -> Result<Vec<f64>> {
        let column = self
            .region_index(region)
            .ok_or_else(|| ForecastError::DataError(format!("unknown region '{}'", region)))?;
        Ok(self.rows.iter().filter_map(|row| row[column]).collect())
    }
}

fn parse_year(record: &StringRecord, line: usize) -> Result<i32> {
    let cell = record.get(0).unwrap_or_default();
    let year: f64 = cell.parse().map_err(|_| {
        ForecastError::DataError(format!("row {}: invalid year '{}'", line + 1, cell))
    })?;
    if !year.is_finite() || year.fract() != 0.0 {
        return Err(ForecastError::DataError(format!(
            "row {}: invalid year '{}'",
            line + 1,
            cell
        )));
    }
    if year < f64::from(i32::MIN) || year > f64::from(i32::MAX) {
        return Err(ForecastError::DataError(format!(
            "row {}: year '{}' is out of range",
            line + 1,
            cell
        )));
    }
    Ok(year as i32)
}

fn parse_row(record: &StringRecord, regions: &[String], line: usize) -> Result<Vec<Option<f64>>> {
    regions
        .iter()
        .enumerate()
        .map(|(j, region)| -> Result<Option<f64>> {
            let cell = record.get(j + 1).unwrap_or_default();
            if cell.is_empty() {
                return Ok(None);
            }
            let value: f64 = cell.parse().map_err(|_| {
                ForecastError::DataError(format!(
                    "row {}, region '{}': invalid value '{}'",
                    line + 1,
                    region,
                    cell
                ))
            })?;
            Ok(value.is_finite().then_some(value))
        })
        .collect()
}

/// The four datasets of one study
#[derive(Debug, Clone, PartialEq)]
pub struct IceDatasets {
    pub early_melt: IceDataset,
    pub late_melt: IceDataset,
    pub early_freeze: IceDataset,
    pub late_freeze: IceDataset,
}

impl IceDatasets {
    /// Load all four datasets from `dir`
    pub fn load<P: AsRef<Path>>(dir: P, paths: &DatasetPaths) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            early_melt: IceDataset::from_csv(dir.join(&paths.early_melt))?,
            late_melt: IceDataset::from_csv(dir.join(&paths.late_melt))?,
            early_freeze: IceDataset::from_csv(dir.join(&paths.early_freeze))?,
            late_freeze: IceDataset::from_csv(dir.join(&paths.late_freeze))?,
        })
    }

    /// Dataset for a metric
    pub fn get(&self, metric: IceMetric) -> &IceDataset {
        match metric {
            IceMetric::EarlyMelt => &self.early_melt,
            IceMetric::LateMelt => &self.late_melt,
            IceMetric::EarlyFreeze => &self.early_freeze,
            IceMetric::LateFreeze => &self.late_freeze,
        }
    }

    /// Dataset whose years and regions define what can be selected
    pub fn reference(&self) -> &IceDataset {
        &self.early_melt
    }
}

/// Result of looking up the countries affected by a region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryLookup {
    /// Countries listed for the region
    Countries(Vec<String>),
    /// The region has a column but it is empty
    NoneListed,
    /// No column matches the region
    RegionNotFound,
}

/// Region to affected-countries table, one column per region
#[derive(Debug, Clone, PartialEq)]
pub struct CountriesTable {
    columns: Vec<(String, Vec<String>)>,
}

impl CountriesTable {
    /// Load the table from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load the table from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut columns: Vec<(String, Vec<String>)> = csv
            .headers()?
            .iter()
            .map(|h| (normalize_name(h), Vec::new()))
            .collect();

        for record in csv.records() {
            let record = record?;
            for (column, cell) in columns.iter_mut().zip(record.iter()) {
                if !cell.is_empty() {
                    column.1.push(cell.to_string());
                }
            }
        }

        Ok(Self { columns })
    }

    /// Countries affected by `region`
    ///
    /// Names are compared case-insensitively with spaces removed, so
    /// `"Hudson Bay"` matches a `hudsonbay` column. The first matching
    /// column wins.
    pub fn lookup(&self, region: &str) -> CountryLookup {
        let key = squash(region);
        match self.columns.iter().find(|(name, _)| squash(name) == key) {
            Some((_, countries)) if countries.is_empty() => CountryLookup::NoneListed,
            Some((_, countries)) => CountryLookup::Countries(countries.clone()),
            None => CountryLookup::RegionNotFound,
        }
    }
}

fn squash(name: &str) -> String {
    normalize_name(name).replace(' ', "")
}
