use chrono::{Duration, NaiveDate};
use demand_forecast::{pipeline, ForecastError, GbdtParams, PipelineConfig};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::fs::File;
use std::path::Path;
use tempfile::tempdir;

const STORES: [i64; 2] = [10, 11];
const PRODUCTS: [i64; 2] = [200, 201];
const WEEKS: i64 = 10;

fn monday(weeks_after: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 3).unwrap() + Duration::weeks(weeks_after)
}

fn write_parquet_table(path: &Path, mut df: DataFrame) {
    let file = File::create(path).unwrap();
    ParquetWriter::new(file).finish(&mut df).unwrap();
}

/// Write the three raw extracts with their external collaborator schemas
fn write_raw_tables(dir: &Path) {
    let mut rng = StdRng::seed_from_u64(42);

    let mut store_ids = Vec::new();
    let mut product_ids = Vec::new();
    let mut dates = Vec::new();
    let mut quantities = Vec::new();
    let mut values = Vec::new();
    for &store_id in &STORES {
        for &product_id in &PRODUCTS {
            for week in 0..WEEKS {
                // One or two transactions per pair per week, mid-week dates
                for _ in 0..rng.gen_range(1..=2) {
                    let offset = Duration::days(rng.gen_range(0..5));
                    store_ids.push(store_id);
                    product_ids.push(product_id);
                    dates.push((monday(week) + offset).format("%Y-%m-%d").to_string());
                    let quantity = rng.gen_range(1..10) as f64;
                    quantities.push(quantity);
                    values.push(quantity * 4.5);
                }
            }
        }
    }

    let transactions = DataFrame::new(vec![
        Series::new("internal_store_id", store_ids),
        Series::new("internal_product_id", product_ids),
        Series::new("transaction_date", dates),
        Series::new("quantity", quantities),
        Series::new("gross_value", values),
    ])
    .unwrap();
    write_parquet_table(&dir.join("transactions.parquet"), transactions);

    let products = DataFrame::new(vec![
        Series::new("produto", PRODUCTS.to_vec()),
        Series::new(
            "categoria",
            vec!["beverage".to_string(), "snack".to_string()],
        ),
    ])
    .unwrap();
    write_parquet_table(&dir.join("products.parquet"), products);

    let stores = DataFrame::new(vec![
        Series::new("pdv", STORES.to_vec()),
        Series::new("premise", vec!["off".to_string(), "on".to_string()]),
        Series::new(
            "categoria_pdv",
            vec!["liquor".to_string(), "grocery".to_string()],
        ),
        Series::new("zipcode", vec![11_001i64, 11_002]),
    ])
    .unwrap();
    write_parquet_table(&dir.join("stores.parquet"), stores);
}

fn test_config(dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default()
        .with_data_dir(dir)
        .with_submissions_dir(dir.join("submissions"));
    config.model = GbdtParams::smoke();
    config
}

#[test]
fn test_full_pipeline_run() {
    // 1. Write synthetic raw extracts
    let dir = tempdir().unwrap();
    write_raw_tables(dir.path());

    // 2. Run the whole pipeline
    let config = test_config(dir.path());
    let summary = pipeline::run(&config).unwrap();

    // 3. Grid and training set shapes
    let pairs = STORES.len() * PRODUCTS.len();
    assert_eq!(summary.pairs, pairs);
    assert_eq!(summary.weeks, WEEKS as usize);
    // The first four weeks of every series lack a full lag history
    assert_eq!(summary.training_rows, pairs * (WEEKS as usize - 4));

    // 4. Submission size: horizon x pairs
    assert_eq!(summary.records, config.horizon * pairs);

    // 5. CSV content: headerless, semicolon-delimited, non-negative integers
    let content = fs::read_to_string(&summary.csv_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), summary.records);
    for line in &lines {
        let fields: Vec<&str> = line.split(';').collect();
        assert_eq!(fields.len(), 4);
        let week: u32 = fields[0].parse().unwrap();
        assert!((1..=config.horizon as u32).contains(&week));
        let quantity: i64 = fields[3].parse().unwrap();
        assert!(quantity >= 0);
    }

    // 6. Parquet mirrors the CSV
    let df = ParquetReader::new(File::open(&summary.parquet_path).unwrap())
        .finish()
        .unwrap();
    assert_eq!(df.height(), summary.records);
    assert_eq!(
        df.get_column_names(),
        vec!["semana", "pdv", "produto", "quantidade"]
    );
}

#[test]
fn test_missing_input_is_an_ingestion_error() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, ForecastError::Ingestion(_)));
}
