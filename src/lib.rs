//! # Demand Forecast
//!
//! A Rust library for building a weekly sales forecasting dataset from raw
//! retail extracts and producing a multi-week demand forecast with gradient
//! boosted decision trees.
//!
//! ## Features
//!
//! - Ingestion of transactions, products, and stores tables (parquet or CSV)
//! - Weekly aggregation and densification onto a full (store, product) x week grid
//! - Calendar, lag, and rolling-window feature derivation per series
//! - Categorical encoding and f32 downcasting of the feature table
//! - L1-objective gradient boosted regression training
//! - Recursive one-step-ahead forecasting that feeds predictions back into
//!   each series' history
//! - Submission output as semicolon-delimited CSV and parquet
//!
//! ## Quick Start
//!
//! ```no_run
//! use demand_forecast::{pipeline, PipelineConfig};
//!
//! fn main() -> demand_forecast::Result<()> {
//!     let config = PipelineConfig::default();
//!     let summary = pipeline::run(&config)?;
//!     println!(
//!         "wrote {} forecast records to {}",
//!         summary.records,
//!         summary.csv_path.display()
//!     );
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod calendar;
pub mod config;
pub mod data;
pub mod encode;
pub mod error;
pub mod features;
pub mod forecast;
pub mod grid;
pub mod model;
pub mod pipeline;
pub mod submission;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use crate::data::DataLoader;
pub use crate::encode::FeatureEncoder;
pub use crate::error::{ForecastError, Result};
pub use crate::features::FeatureTable;
pub use crate::forecast::{ForecastRecord, RecursiveForecaster, SeriesHistory};
pub use crate::grid::SalesGrid;
pub use crate::model::{DemandModel, GbdtParams};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
