//! # ice_report
//!
//! Command-line report of sea-ice melt and freeze dates for one region and year.

use clap::Parser;
use ice_forecast::config::ForecasterConfig;
use ice_forecast::data::{CountriesTable, CountryLookup, IceDatasets};
use ice_forecast::error::{ForecastError, Result};
use ice_forecast::report::{render_bar_chart, IceReporter, ValueSource};
use ice_forecast::HybridForecaster;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ice_report")]
#[command(about = "Sea-ice melt and freeze report with hybrid forecasts", long_about = None)]
struct Cli {
    /// Directory holding the dataset CSV files
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Year to report; defaults to the last recorded year
    #[arg(short, long)]
    year: Option<i32>,

    /// Region to report; defaults to the first region
    #[arg(short, long)]
    region: Option<String>,

    /// List regions and selectable years, then exit
    #[arg(short, long)]
    list: bool,

    /// Width of the chart bars
    #[arg(long, default_value = "50")]
    width: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ice_forecast=info,ice_report=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => ForecasterConfig::from_json_file(path)?,
        None => ForecasterConfig::default(),
    };
    config.validate()?;

    let datasets = IceDatasets::load(&cli.data_dir, &config.datasets)?;
    let forecaster = HybridForecaster::from_config(&config)?;
    let reporter = IceReporter::new(&datasets, &forecaster, config.horizon);

    if cli.list {
        cmd_list(&reporter);
        return Ok(());
    }

    let region = match cli.region.or_else(|| reporter.regions().first().cloned()) {
        Some(region) => region,
        None => return Err(ForecastError::DataError("dataset has no regions".to_string())),
    };
    let year = match cli.year.or_else(|| reporter.historical_years().last().copied()) {
        Some(year) => year,
        None => return Err(ForecastError::DataError("dataset has no years".to_string())),
    };
    if !reporter.all_years().contains(&year) {
        return Err(ForecastError::InvalidParameter(format!(
            "year {} is outside the selectable range",
            year
        )));
    }

    let report = reporter.report(year, &region)?;

    println!("Region: {}", report.region);
    println!("Year:   {}", report.year);
    println!();
    for value in &report.values {
        let tag = match value.source {
            ValueSource::Historical => "",
            ValueSource::Forecast => " (forecast)",
        };
        match &value.failure {
            Some(failure) => println!(
                "{}{}: {:.1}  [warning: {}]",
                value.metric,
                tag,
                value.display_value(),
                failure
            ),
            None => println!("{}{}: {:.1}", value.metric, tag, value.display_value()),
        }
    }
    println!();
    print!("{}", render_bar_chart(&report, cli.width));
    println!();

    let countries_path = cli.data_dir.join(&config.datasets.countries);
    match CountriesTable::from_csv(&countries_path) {
        Ok(table) => match table.lookup(&report.region) {
            CountryLookup::Countries(countries) => {
                println!("Countries affected:");
                for country in countries {
                    println!("  - {}", country);
                }
            }
            CountryLookup::NoneListed => println!("No countries listed for this region."),
            CountryLookup::RegionNotFound => {
                println!("Region not found in the countries table.")
            }
        },
        Err(err) => warn!(path = %countries_path.display(), %err, "countries table unavailable"),
    }

    Ok(())
}

fn cmd_list(reporter: &IceReporter<'_>) {
    println!("Regions:");
    for region in reporter.regions() {
        println!("  {}", region);
    }

    let historical = reporter.historical_years();
    let future = reporter.future_years();
    if let (Some(first), Some(last)) = (historical.first(), historical.last()) {
        println!("Recorded years: {}-{}", first, last);
    }
    if let (Some(first), Some(last)) = (future.first(), future.last()) {
        println!("Forecast years: {}-{}", first, last);
    }
}
