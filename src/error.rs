//! Error types for the demand_forecast crate

use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error while loading or normalizing a raw input table
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// Error while deriving calendar, lag, or rolling features
    #[error("Feature error: {0}")]
    Feature(String),

    /// Error while training the model or generating predictions
    #[error("Model error: {0}")]
    Model(String),

    /// Error while writing submission output files
    #[error("Write error: {0}")]
    Write(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<polars::prelude::PolarsError> for ForecastError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Write(err.to_string())
    }
}
