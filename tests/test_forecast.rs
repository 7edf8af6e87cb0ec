use chrono::{Duration, NaiveDate};
use demand_forecast::aggregate::aggregate_weekly;
use demand_forecast::data::Transaction;
use demand_forecast::encode::FeatureEncoder;
use demand_forecast::features::build_features;
use demand_forecast::forecast::{clamp_demand, RecursiveForecaster, SeriesHistory};
use demand_forecast::grid::{build_grid, SalesGrid};
use demand_forecast::model::{DemandModel, GbdtParams};
use std::collections::{BTreeSet, HashMap};

fn monday(weeks_after: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 3).unwrap() + Duration::weeks(weeks_after)
}

/// Two stores x two products, eight weeks of sales each
fn training_grid() -> SalesGrid {
    let mut transactions = Vec::new();
    for (series, &(store_id, product_id)) in
        [(10, 200), (10, 201), (11, 200), (11, 201)].iter().enumerate()
    {
        for week in 0..8 {
            transactions.push(Transaction {
                store_id,
                product_id,
                date: monday(week),
                quantity: 2.0 + series as f64 + (week % 3) as f64,
                value: 10.0,
            });
        }
    }

    let facts = aggregate_weekly(&transactions);
    build_grid(&facts, &HashMap::new(), &HashMap::new())
}

fn trained(grid: &SalesGrid) -> (DemandModel, FeatureEncoder) {
    let features = build_features(grid).unwrap();
    let training_rows = features.training_rows();
    let targets = features.training_targets();
    let encoder = FeatureEncoder::fit(&training_rows);
    let matrix = encoder.encode_rows(&training_rows);
    let model = DemandModel::train(&matrix, &targets, &GbdtParams::smoke()).unwrap();
    (model, encoder)
}

#[test]
fn test_clamp_demand_is_non_negative_integer() {
    assert_eq!(clamp_demand(-1.7), 0);
    assert_eq!(clamp_demand(-0.1), 0);
    assert_eq!(clamp_demand(0.0), 0);
    assert_eq!(clamp_demand(3.4), 3);
    assert_eq!(clamp_demand(3.9), 3);
    assert_eq!(clamp_demand(5.0), 5);
}

#[test]
fn test_series_history_lag_and_window() {
    let grid = training_grid();
    let mut history = SeriesHistory::from_grid(&grid);
    let pair = (10, 200);

    assert_eq!(history.len(pair), 8);
    // Series quantities follow 2 + (week % 3): last week (7) sold 3
    assert_eq!(history.lag(pair, 1), Some(3.0));
    assert_eq!(history.lag(pair, 2), Some(2.0));
    assert_eq!(history.lag(pair, 9), None);

    history.push(pair, 42.0);
    assert_eq!(history.len(pair), 9);
    assert_eq!(history.lag(pair, 1), Some(42.0));

    let window = history.rolling_window(pair);
    assert_eq!(window.len(), 4);
    assert_eq!(window.last(), Some(&42.0));

    assert_eq!(history.rolling_window((99, 999)), &[] as &[f64]);
    assert_eq!(history.lag((99, 999), 1), None);
}

#[test]
fn test_forecast_covers_every_pair_and_week() {
    let grid = training_grid();
    let (model, encoder) = trained(&grid);

    let forecaster = RecursiveForecaster::new(&model, &encoder, 5);
    let records = forecaster.run(&grid).unwrap();

    assert_eq!(records.len(), 5 * grid.pairs().len());

    let week_indices: BTreeSet<u32> = records.iter().map(|r| r.week_index).collect();
    assert_eq!(week_indices, BTreeSet::from([1, 2, 3, 4, 5]));

    for week_index in 1..=5 {
        let pairs: BTreeSet<(i64, i64)> = records
            .iter()
            .filter(|r| r.week_index == week_index)
            .map(|r| (r.store_id, r.product_id))
            .collect();
        assert_eq!(pairs.len(), grid.pairs().len());
    }
}

#[test]
fn test_forecast_quantities_are_non_negative() {
    let grid = training_grid();
    let (model, encoder) = trained(&grid);

    let forecaster = RecursiveForecaster::new(&model, &encoder, 5);
    let records = forecaster.run(&grid).unwrap();

    assert!(records.iter().all(|r| r.quantity >= 0));
}

#[test]
fn test_forecast_is_deterministic() {
    let grid = training_grid();
    let (model, encoder) = trained(&grid);

    let forecaster = RecursiveForecaster::new(&model, &encoder, 5);
    let first = forecaster.run(&grid).unwrap();
    let second = forecaster.run(&grid).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_forecasting_an_empty_grid_fails() {
    let grid = build_grid(&[], &HashMap::new(), &HashMap::new());
    let (model, encoder) = trained(&training_grid());

    let forecaster = RecursiveForecaster::new(&model, &encoder, 5);
    assert!(forecaster.run(&grid).is_err());
}
