//! Pipeline configuration

use crate::model::GbdtParams;
use std::path::{Path, PathBuf};

/// Configuration for an end-to-end forecasting run.
///
/// Every pipeline stage receives this by reference; there are no
/// module-level path constants.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory containing the raw input tables
    pub data_dir: PathBuf,
    /// Directory where submission files are written (created if absent)
    pub submissions_dir: PathBuf,
    /// File name of the raw transactions table
    pub transactions_file: String,
    /// File name of the product registry table
    pub products_file: String,
    /// File name of the store registry table
    pub stores_file: String,
    /// Number of weeks to forecast ahead
    pub horizon: usize,
    /// Model training parameters
    pub model: GbdtParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            submissions_dir: PathBuf::from("./submissions"),
            transactions_file: "transactions.parquet".to_string(),
            products_file: "products.parquet".to_string(),
            stores_file: "stores.parquet".to_string(),
            horizon: 5,
            model: GbdtParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Full path to the transactions table
    pub fn transactions_path(&self) -> PathBuf {
        self.data_dir.join(&self.transactions_file)
    }

    /// Full path to the product registry table
    pub fn products_path(&self) -> PathBuf {
        self.data_dir.join(&self.products_file)
    }

    /// Full path to the store registry table
    pub fn stores_path(&self) -> PathBuf {
        self.data_dir.join(&self.stores_file)
    }

    /// Replace the data directory, keeping the configured file names
    pub fn with_data_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Replace the submissions directory
    pub fn with_submissions_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.submissions_dir = dir.as_ref().to_path_buf();
        self
    }
}
