use approx::assert_relative_eq;
use ice_forecast::error::ForecastError;
use ice_forecast::models::arima::ArimaModel;
use ice_forecast::models::decision_tree::TreeSettings;
use ice_forecast::models::random_forest::RandomForestModel;
use ice_forecast::models::{ForecastModel, TrainedForecastModel};
use rstest::rstest;

fn melt_days() -> Vec<f64> {
    vec![
        152.0, 149.0, 155.0, 150.0, 147.0, 151.0, 146.0, 148.0, 144.0, 149.0, 143.0, 145.0, 141.0,
        146.0, 140.0, 142.0, 139.0, 143.0, 137.0, 140.0,
    ]
}

#[test]
fn test_arima_linear_ramp() {
    let model = ArimaModel::default();
    let trained = model.train(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

    let forecast = trained.forecast(1).unwrap();
    assert_eq!(forecast.horizons(), 1);
    assert_relative_eq!(forecast.values()[0], 6.0, epsilon = 1e-3);
}

#[test]
fn test_arima_default_has_no_constant() {
    let trained = ArimaModel::default().train(&melt_days()).unwrap();
    assert_eq!(trained.drift(), 0.0);

    let with_drift = ArimaModel::default()
        .with_drift(true)
        .train(&melt_days())
        .unwrap();
    // Mean of the first differences: (140 - 152) / 19
    assert_relative_eq!(with_drift.drift(), -12.0 / 19.0, epsilon = 1e-12);
}

#[test]
fn test_arima_linear_ramp_with_drift() {
    let model = ArimaModel::default().with_drift(true);
    let trained = model.train(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

    let forecast = trained.forecast(3).unwrap();
    assert_eq!(forecast.horizons(), 3);
    assert_relative_eq!(forecast.values()[0], 6.0, epsilon = 1e-6);
    assert_relative_eq!(forecast.values()[1], 7.0, epsilon = 1e-6);
    assert_relative_eq!(forecast.values()[2], 8.0, epsilon = 1e-6);
    assert_relative_eq!(trained.drift(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_arima_minimum_length() {
    let model = ArimaModel::default();
    assert_eq!(model.min_observations(), 5);

    match model.train(&[1.0, 2.0, 3.0, 4.0]) {
        Err(ForecastError::InsufficientData(_)) => {}
        other => panic!("Expected InsufficientData, got {:?}", other),
    }
    assert!(model.train(&[1.0, 2.0, 3.0, 4.0, 5.0]).is_ok());
}

#[test]
fn test_arima_rejects_non_finite() {
    let model = ArimaModel::default();
    match model.train(&[1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0]) {
        Err(ForecastError::NumericalFailure(msg)) => assert!(msg.contains("NaN")),
        other => panic!("Expected NumericalFailure, got {:?}", other),
    }
}

#[rstest]
#[case(11, 1, 0)]
#[case(1, 3, 0)]
#[case(0, 1, 11)]
fn test_arima_invalid_order(#[case] p: usize, #[case] d: usize, #[case] q: usize) {
    assert!(matches!(
        ArimaModel::new(p, d, q),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_arima_invalid_confidence_level() {
    assert!(ArimaModel::default().with_confidence_level(1.0).is_err());
    assert!(ArimaModel::default().with_confidence_level(0.0).is_err());
    assert!(ArimaModel::default().with_confidence_level(0.8).is_ok());
}

#[test]
fn test_arima_coefficients_are_admissible() {
    let trained = ArimaModel::default().train(&melt_days()).unwrap();

    assert_eq!(trained.ar_coefficients().len(), 2);
    assert_eq!(trained.ma_coefficients().len(), 2);
    let (phi1, phi2) = (trained.ar_coefficients()[0], trained.ar_coefficients()[1]);
    // AR(2) stationarity triangle
    assert!(phi2.abs() < 1.0);
    assert!(phi1 + phi2 < 1.0);
    assert!(phi2 - phi1 < 1.0);
    assert!(trained.sigma2() >= 0.0);
}

#[test]
fn test_arima_intervals_widen() {
    let trained = ArimaModel::default().train(&melt_days()).unwrap();
    let forecast = trained.forecast(10).unwrap();

    let intervals = forecast.intervals().unwrap();
    assert_eq!(intervals.len(), 10);
    for ((lower, upper), value) in intervals.iter().zip(forecast.values()) {
        assert!(lower <= value && value <= upper);
    }
    for pair in intervals.windows(2) {
        let width = |(l, u): (f64, f64)| u - l;
        assert!(width(pair[1]) >= width(pair[0]) - 1e-9);
    }
}

#[test]
fn test_arima_zero_horizon() {
    let trained = ArimaModel::default().train(&melt_days()).unwrap();
    assert!(matches!(
        trained.forecast(0),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_arima_without_differencing() {
    let model = ArimaModel::new(1, 0, 0).unwrap();
    let trained = model.train(&melt_days()).unwrap();
    let forecast = trained.forecast(1).unwrap();

    let (min, max) = (137.0, 155.0);
    let value = forecast.first().unwrap();
    assert!(value > min - 10.0 && value < max + 10.0);
}

#[test]
fn test_forest_is_deterministic() {
    let model = RandomForestModel::default();
    let first = model.train(&melt_days()).unwrap().forecast(5).unwrap();
    let second = model.train(&melt_days()).unwrap().forecast(5).unwrap();

    assert_eq!(first.values(), second.values());
}

#[test]
fn test_forest_seed_changes_trees() {
    let series = melt_days();
    let a = RandomForestModel::new(50, 42).unwrap().train(&series).unwrap();
    let b = RandomForestModel::new(50, 7).unwrap().train(&series).unwrap();

    let predictions = |forest: &ice_forecast::models::random_forest::TrainedRandomForest| {
        (0..series.len())
            .map(|i| forest.predict(i as f64))
            .collect::<Vec<f64>>()
    };
    assert_ne!(predictions(&a), predictions(&b));
}

#[test]
fn test_forest_extrapolates_flat() {
    let series = melt_days();
    let trained = RandomForestModel::default().train(&series).unwrap();
    assert_eq!(trained.n_trees(), 50);

    let forecast = trained.forecast(4).unwrap();
    let first = forecast.values()[0];
    assert!(forecast.values().iter().all(|v| *v == first));
    assert!((137.0..=155.0).contains(&first));
}

#[test]
fn test_forest_without_bootstrap_repeats_last_value() {
    let series = melt_days();
    let trained = RandomForestModel::default()
        .with_bootstrap(false)
        .train(&series)
        .unwrap();

    let forecast = trained.forecast(1).unwrap();
    assert_relative_eq!(forecast.values()[0], 140.0, epsilon = 1e-12);
}

#[test]
fn test_forest_depth_limit() {
    let series = melt_days();
    let stumps = RandomForestModel::new(1, 42)
        .unwrap()
        .with_bootstrap(false)
        .with_tree_settings(TreeSettings {
            max_depth: Some(1),
            ..TreeSettings::default()
        })
        .unwrap()
        .train(&series)
        .unwrap();

    let mut predictions: Vec<f64> = (0..series.len()).map(|i| stumps.predict(i as f64)).collect();
    predictions.dedup();
    assert_eq!(predictions.len(), 2);
}

#[test]
fn test_forest_invalid_parameters() {
    assert!(matches!(
        RandomForestModel::new(0, 42),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert!(RandomForestModel::default()
        .with_tree_settings(TreeSettings {
            min_samples_leaf: 0,
            ..TreeSettings::default()
        })
        .is_err());
    assert!(RandomForestModel::default()
        .with_tree_settings(TreeSettings {
            max_depth: Some(0),
            ..TreeSettings::default()
        })
        .is_err());
    assert!(matches!(
        RandomForestModel::default().train(&[]),
        Err(ForecastError::InsufficientData(_))
    ));
}
