//! Ingestion and normalization of the raw input tables

use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// A single raw sales transaction, one row per real-world sale
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Point-of-sale identifier
    pub store_id: i64,
    /// Product identifier
    pub product_id: i64,
    /// Date the transaction occurred
    pub date: NaiveDate,
    /// Units sold
    pub quantity: f64,
    /// Gross sale value
    pub value: f64,
}

/// Static product registry attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductInfo {
    /// Product category label
    pub category: Option<String>,
}

/// Static store registry attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreInfo {
    /// On/off premise label
    pub premise: Option<String>,
    /// Store category label
    pub category: Option<String>,
    /// Store zipcode
    pub zipcode: Option<i64>,
}

/// Loader for the three raw input tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a columnar table from disk, dispatching on the file extension.
    ///
    /// Parquet is the collaborator format; CSV is accepted for smaller
    /// extracts and test fixtures.
    pub fn load_table<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let df = match ext.as_str() {
            "parquet" => {
                let file = File::open(path).map_err(|e| {
                    ForecastError::Ingestion(format!("cannot open {}: {}", path.display(), e))
                })?;
                ParquetReader::new(file).finish()?
            }
            "csv" => CsvReader::from_path(path)
                .map_err(|e| {
                    ForecastError::Ingestion(format!("cannot open {}: {}", path.display(), e))
                })?
                .has_header(true)
                .finish()?,
            other => {
                return Err(ForecastError::Ingestion(format!(
                    "unsupported table format '{}' for {}",
                    other,
                    path.display()
                )))
            }
        };

        Ok(df)
    }

    /// Load the raw transactions table and normalize it to the canonical schema
    pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>> {
        let mut df = Self::load_table(&path)?;
        rename_if_present(&mut df, "internal_store_id", "store_id")?;
        rename_if_present(&mut df, "internal_product_id", "product_id")?;
        rename_if_present(&mut df, "transaction_date", "date")?;
        rename_if_present(&mut df, "gross_value", "value")?;

        let store_ids = column_as_i64(&df, "store_id")?;
        let product_ids = column_as_i64(&df, "product_id")?;
        let dates = column_as_dates(&df, "date")?;
        let quantities = column_as_f64(&df, "quantity")?;
        let values = column_as_f64(&df, "value")?;

        let mut transactions = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            transactions.push(Transaction {
                store_id: store_ids[i],
                product_id: product_ids[i],
                date: dates[i],
                quantity: quantities[i],
                value: values[i],
            });
        }

        Ok(transactions)
    }

    /// Load the product registry keyed by product id
    pub fn load_products<P: AsRef<Path>>(path: P) -> Result<HashMap<i64, ProductInfo>> {
        let mut df = Self::load_table(&path)?;
        rename_if_present(&mut df, "produto", "product_id")?;

        let product_ids = column_as_i64(&df, "product_id")?;
        let categories = optional_str_column(&df, "categoria");

        let mut registry = HashMap::with_capacity(df.height());
        for (i, id) in product_ids.into_iter().enumerate() {
            registry.insert(
                id,
                ProductInfo {
                    category: categories.as_ref().and_then(|c| c[i].clone()),
                },
            );
        }

        Ok(registry)
    }

    /// Load the store registry keyed by store id
    pub fn load_stores<P: AsRef<Path>>(path: P) -> Result<HashMap<i64, StoreInfo>> {
        let mut df = Self::load_table(&path)?;
        rename_if_present(&mut df, "pdv", "store_id")?;

        let store_ids = column_as_i64(&df, "store_id")?;
        let premises = optional_str_column(&df, "premise");
        let categories = optional_str_column(&df, "categoria_pdv");
        let zipcodes = optional_i64_column(&df, "zipcode");

        let mut registry = HashMap::with_capacity(df.height());
        for (i, id) in store_ids.into_iter().enumerate() {
            registry.insert(
                id,
                StoreInfo {
                    premise: premises.as_ref().and_then(|c| c[i].clone()),
                    category: categories.as_ref().and_then(|c| c[i].clone()),
                    zipcode: zipcodes.as_ref().and_then(|c| c[i]),
                },
            );
        }

        Ok(registry)
    }
}

/// Rename a column when the external name is present, leaving
/// already-canonical tables untouched.
fn rename_if_present(df: &mut DataFrame, from: &str, to: &str) -> Result<()> {
    if df.get_column_names().contains(&from) {
        df.rename(from, to)?;
    }
    Ok(())
}

/// Extract a column as i64 values
fn column_as_i64(df: &DataFrame, column_name: &str) -> Result<Vec<i64>> {
    let col = df.column(column_name).map_err(|e| {
        ForecastError::Ingestion(format!("column '{}' not found: {}", column_name, e))
    })?;

    let values: Vec<Option<i64>> = match col.dtype() {
        DataType::Int64 => col.i64().unwrap().into_iter().collect(),
        DataType::Int32 => col
            .i32()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|v| v as i64))
            .collect(),
        DataType::UInt64 => col
            .u64()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|v| v as i64))
            .collect(),
        DataType::UInt32 => col
            .u32()
            .unwrap()
            .into_iter()
            .map(|v| v.map(|v| v as i64))
            .collect(),
        _ => {
            return Err(ForecastError::Ingestion(format!(
                "column '{}' cannot be read as i64",
                column_name
            )))
        }
    };

    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| {
                ForecastError::Ingestion(format!("null id in column '{}' row {}", column_name, i))
            })
        })
        .collect()
}

/// Extract a column as f64 values, nulls mapped to 0.0
fn column_as_f64(df: &DataFrame, column_name: &str) -> Result<Vec<f64>> {
    let col = df.column(column_name).map_err(|e| {
        ForecastError::Ingestion(format!("column '{}' not found: {}", column_name, e))
    })?;

    match col.dtype() {
        DataType::Float64 => Ok(col
            .f64()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect()),
        DataType::Float32 => Ok(col
            .f32()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap_or(0.0) as f64)
            .collect()),
        DataType::Int64 => Ok(col
            .i64()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap_or(0) as f64)
            .collect()),
        DataType::Int32 => Ok(col
            .i32()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap_or(0) as f64)
            .collect()),
        _ => Err(ForecastError::Ingestion(format!(
            "column '{}' cannot be read as f64",
            column_name
        ))),
    }
}

/// Extract a column as dates, accepting Utf8, Date, and Datetime storage
fn column_as_dates(df: &DataFrame, column_name: &str) -> Result<Vec<NaiveDate>> {
    let col = df.column(column_name).map_err(|e| {
        ForecastError::Ingestion(format!("column '{}' not found: {}", column_name, e))
    })?;

    let null_date = |i: usize| {
        ForecastError::Ingestion(format!("null date in column '{}' row {}", column_name, i))
    };

    match col.dtype() {
        DataType::Utf8 => col
            .utf8()
            .unwrap()
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let raw = v.ok_or_else(|| null_date(i))?;
                parse_date(raw).ok_or_else(|| {
                    ForecastError::Ingestion(format!(
                        "unparseable date '{}' in column '{}' row {}",
                        raw, column_name, i
                    ))
                })
            })
            .collect(),
        DataType::Date => col
            .date()
            .unwrap()
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let days = v.ok_or_else(|| null_date(i))?;
                NaiveDate::from_ymd_opt(1970, 1, 1)
                    .unwrap()
                    .checked_add_days(chrono::Days::new(days as u64))
                    .ok_or_else(|| null_date(i))
            })
            .collect(),
        DataType::Datetime(unit, _) => {
            let divisor = match unit {
                TimeUnit::Nanoseconds => 1_000_000_000,
                TimeUnit::Microseconds => 1_000_000,
                TimeUnit::Milliseconds => 1_000,
            };
            col.datetime()
                .unwrap()
                .into_iter()
                .enumerate()
                .map(|(i, v)| {
                    let ts = v.ok_or_else(|| null_date(i))?;
                    NaiveDateTime::from_timestamp_opt(ts / divisor, 0)
                        .map(|dt| dt.date())
                        .ok_or_else(|| null_date(i))
                })
                .collect()
        }
        other => Err(ForecastError::Ingestion(format!(
            "column '{}' has unsupported date type {:?}",
            column_name, other
        ))),
    }
}

/// Parse a date from its textual form, tolerating a trailing time component
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Read an attribute column as optional strings; absent columns yield `None`
fn optional_str_column(df: &DataFrame, column_name: &str) -> Option<Vec<Option<String>>> {
    let col = df.column(column_name).ok()?;
    let ca = col.utf8().ok()?;
    Some(ca.into_iter().map(|v| v.map(|s| s.to_string())).collect())
}

/// Read an attribute column as optional i64; absent or non-integer columns yield `None`
fn optional_i64_column(df: &DataFrame, column_name: &str) -> Option<Vec<Option<i64>>> {
    let col = df.column(column_name).ok()?;
    match col.dtype() {
        DataType::Int64 => Some(col.i64().unwrap().into_iter().collect()),
        DataType::Int32 => Some(
            col.i32()
                .unwrap()
                .into_iter()
                .map(|v| v.map(|v| v as i64))
                .collect(),
        ),
        _ => None,
    }
}
