//! Submission file output in the external schema

use crate::error::{ForecastError, Result};
use crate::forecast::ForecastRecord;
use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// File name of the delimited text submission
pub const CSV_FILE: &str = "submission.csv";

/// File name of the columnar binary submission
pub const PARQUET_FILE: &str = "submission.parquet";

/// One submission row in the external collaborator schema.
///
/// Field order is the required output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmissionRecord {
    /// Forecast week index, 1-based
    pub semana: u32,
    /// Point-of-sale identifier
    pub pdv: i64,
    /// Product identifier
    pub produto: i64,
    /// Predicted units
    pub quantidade: i64,
}

/// Map forecast records onto the external schema
pub fn from_forecasts(records: &[ForecastRecord]) -> Vec<SubmissionRecord> {
    records
        .iter()
        .map(|r| SubmissionRecord {
            semana: r.week_index,
            pdv: r.store_id,
            produto: r.product_id,
            quantidade: r.quantity,
        })
        .collect()
}

/// Write the semicolon-delimited text submission: no header row, columns
/// [semana, pdv, produto, quantidade], UTF-8.
pub fn write_csv<P: AsRef<Path>>(path: P, records: &[SubmissionRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_path(path.as_ref())
        .map_err(|e| {
            ForecastError::Write(format!("cannot create {}: {}", path.as_ref().display(), e))
        })?;

    for record in records {
        writer.serialize(record)?;
    }
    writer
        .flush()
        .map_err(|e| ForecastError::Write(format!("flush failed: {}", e)))?;

    Ok(())
}

/// Write the columnar binary submission with the same logical content
pub fn write_parquet<P: AsRef<Path>>(path: P, records: &[SubmissionRecord]) -> Result<()> {
    let semanas: Vec<u32> = records.iter().map(|r| r.semana).collect();
    let pdvs: Vec<i64> = records.iter().map(|r| r.pdv).collect();
    let produtos: Vec<i64> = records.iter().map(|r| r.produto).collect();
    let quantidades: Vec<i64> = records.iter().map(|r| r.quantidade).collect();

    let mut df = DataFrame::new(vec![
        Series::new("semana", semanas),
        Series::new("pdv", pdvs),
        Series::new("produto", produtos),
        Series::new("quantidade", quantidades),
    ])?;

    let file = File::create(path.as_ref()).map_err(|e| {
        ForecastError::Write(format!("cannot create {}: {}", path.as_ref().display(), e))
    })?;
    ParquetWriter::new(file).finish(&mut df)?;

    Ok(())
}

/// Write both submission formats into the output directory, creating the
/// directory if absent. Returns the (csv, parquet) paths.
pub fn write_all<P: AsRef<Path>>(
    dir: P,
    records: &[SubmissionRecord],
) -> Result<(PathBuf, PathBuf)> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .map_err(|e| ForecastError::Write(format!("cannot create {}: {}", dir.display(), e)))?;

    let csv_path = dir.join(CSV_FILE);
    let parquet_path = dir.join(PARQUET_FILE);
    write_csv(&csv_path, records)?;
    write_parquet(&parquet_path, records)?;

    Ok((csv_path, parquet_path))
}
