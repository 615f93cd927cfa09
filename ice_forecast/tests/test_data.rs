use ice_forecast::config::DatasetPaths;
use ice_forecast::data::{CountriesTable, CountryLookup, IceDataset, IceDatasets, IceMetric};
use ice_forecast::error::ForecastError;
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

const EARLY_MELT: &str = "\
 YYYY ,Sea of Okhotsk, Bering Sea ,Hudson Bay
1979.0,120,98,160
1980,118,,158
1981,121,101,
";

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_csv(EARLY_MELT);
    let dataset = IceDataset::from_csv(file.path()).unwrap();

    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.years(), &[1979, 1980, 1981]);
    assert_eq!(
        dataset.regions(),
        &["sea of okhotsk", "bering sea", "hudson bay"]
    );
    assert_eq!(dataset.last_year(), Some(1981));
}

#[test]
fn test_historical_values() {
    let dataset = IceDataset::from_reader(EARLY_MELT.as_bytes()).unwrap();

    assert_eq!(dataset.historical_value(1979, "Sea of Okhotsk"), Some(120.0));
    assert_eq!(dataset.historical_value(1981, "hudson bay"), None);
    assert_eq!(dataset.historical_value(1980, "Bering Sea"), None);
    assert_eq!(dataset.historical_value(1990, "hudson bay"), None);
    assert_eq!(dataset.historical_value(1979, "kara sea"), None);
}

#[test]
fn test_series_skips_missing_cells() {
    let dataset = IceDataset::from_reader(EARLY_MELT.as_bytes()).unwrap();

    assert_eq!(dataset.series("bering sea").unwrap(), vec![98.0, 101.0]);
    assert_eq!(dataset.series(" Hudson Bay ").unwrap(), vec![160.0, 158.0]);
    assert!(matches!(
        dataset.series("kara sea"),
        Err(ForecastError::DataError(_))
    ));
}

#[test]
fn test_requires_year_column() {
    let result = IceDataset::from_reader("year,hudson bay\n1979,160\n".as_bytes());
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_rejects_bad_cells() {
    let bad_value = IceDataset::from_reader("yyyy,hudson bay\n1979,early\n".as_bytes());
    assert!(matches!(bad_value, Err(ForecastError::DataError(_))));

    let bad_year = IceDataset::from_reader("yyyy,hudson bay\n1979.5,160\n".as_bytes());
    assert!(matches!(bad_year, Err(ForecastError::DataError(_))));
}

#[test]
fn test_rejects_years_outside_i32() {
    for year in ["1e12", "-3000000000", "2147483648"] {
        let csv = format!("yyyy,hudson bay\n{},160\n", year);
        let result = IceDataset::from_reader(csv.as_bytes());
        assert!(
            matches!(result, Err(ForecastError::DataError(_))),
            "year {} should be rejected",
            year
        );
    }

    let dataset = IceDataset::from_reader("yyyy,hudson bay\n2147483647,160\n".as_bytes()).unwrap();
    assert_eq!(dataset.years(), &[i32::MAX]);
}

#[test]
fn test_ragged_rows_are_csv_errors() {
    let result = IceDataset::from_reader("yyyy,hudson bay\n1979,160,12\n".as_bytes());
    assert!(matches!(result, Err(ForecastError::CsvError(_))));
}

#[test]
fn test_load_all_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DatasetPaths::default();
    for (name, offset) in [
        (&paths.early_melt, 0),
        (&paths.late_melt, 10),
        (&paths.early_freeze, 150),
        (&paths.late_freeze, 170),
    ] {
        let contents = format!("yyyy,hudson bay\n1979,{}\n1980,{}\n", 150 + offset, 152 + offset);
        fs::write(dir.path().join(name), contents).unwrap();
    }

    let datasets = IceDatasets::load(dir.path(), &paths).unwrap();
    assert_eq!(
        datasets
            .get(IceMetric::LateFreeze)
            .historical_value(1980, "hudson bay"),
        Some(322.0)
    );
    assert_eq!(datasets.reference().years(), &[1979, 1980]);
}

#[test]
fn test_load_missing_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let result = IceDatasets::load(dir.path(), &DatasetPaths::default());
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_metric_labels() {
    let labels: Vec<String> = IceMetric::ALL.iter().map(|m| m.to_string()).collect();
    assert_eq!(
        labels,
        vec!["Early Melt", "Late Melt", "Early Freeze", "Late Freeze"]
    );
}

#[test]
fn test_countries_lookup() {
    let csv = "\
Sea of Okhotsk,Bering Sea,Baffin Bay
Russia,USA,
Japan,Russia,
";
    let file = write_csv(csv);
    let table = CountriesTable::from_csv(file.path()).unwrap();

    assert_eq!(
        table.lookup("sea of okhotsk"),
        CountryLookup::Countries(vec!["Russia".to_string(), "Japan".to_string()])
    );
    assert_eq!(
        table.lookup("BERINGSEA"),
        CountryLookup::Countries(vec!["USA".to_string(), "Russia".to_string()])
    );
    assert_eq!(table.lookup("Baffin Bay"), CountryLookup::NoneListed);
    assert_eq!(table.lookup("Kara Sea"), CountryLookup::RegionNotFound);
}
