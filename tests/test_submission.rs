use demand_forecast::forecast::ForecastRecord;
use demand_forecast::submission::{
    from_forecasts, write_all, write_csv, write_parquet, SubmissionRecord, CSV_FILE, PARQUET_FILE,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::fs::File;
use tempfile::tempdir;

fn sample_records() -> Vec<SubmissionRecord> {
    from_forecasts(&[
        ForecastRecord {
            week_index: 1,
            store_id: 10,
            product_id: 200,
            quantity: 3,
        },
        ForecastRecord {
            week_index: 1,
            store_id: 11,
            product_id: 201,
            quantity: 0,
        },
        ForecastRecord {
            week_index: 2,
            store_id: 10,
            product_id: 200,
            quantity: 7,
        },
    ])
}

#[test]
fn test_external_schema_mapping() {
    let records = sample_records();
    assert_eq!(
        records[0],
        SubmissionRecord {
            semana: 1,
            pdv: 10,
            produto: 200,
            quantidade: 3,
        }
    );
}

#[test]
fn test_csv_is_semicolon_delimited_without_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(CSV_FILE);

    write_csv(&path, &sample_records()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, vec!["1;10;200;3", "1;11;201;0", "2;10;200;7"]);
}

#[test]
fn test_parquet_has_identical_logical_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(PARQUET_FILE);

    let records = sample_records();
    write_parquet(&path, &records).unwrap();

    let df = ParquetReader::new(File::open(&path).unwrap()).finish().unwrap();
    assert_eq!(df.height(), 3);
    assert_eq!(
        df.get_column_names(),
        vec!["semana", "pdv", "produto", "quantidade"]
    );

    let quantities: Vec<i64> = df
        .column("quantidade")
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(quantities, vec![3, 0, 7]);

    let weeks: Vec<u32> = df
        .column("semana")
        .unwrap()
        .u32()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(weeks, vec![1, 1, 2]);
}

#[test]
fn test_write_all_creates_the_output_directory() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("nested").join("submissions");

    let (csv_path, parquet_path) = write_all(&out, &sample_records()).unwrap();

    assert!(csv_path.exists());
    assert!(parquet_path.exists());
    assert_eq!(csv_path.file_name().unwrap(), CSV_FILE);
    assert_eq!(parquet_path.file_name().unwrap(), PARQUET_FILE);
}
