//! End-to-end forecasting pipeline

use crate::aggregate::aggregate_weekly;
use crate::config::PipelineConfig;
use crate::data::DataLoader;
use crate::encode::FeatureEncoder;
use crate::error::Result;
use crate::features::build_features;
use crate::forecast::RecursiveForecaster;
use crate::grid::build_grid;
use crate::model::DemandModel;
use crate::submission;
use log::info;
use std::path::PathBuf;

/// Summary of a completed pipeline run
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// Distinct (store, product) pairs in the grid
    pub pairs: usize,
    /// Distinct weeks in the grid
    pub weeks: usize,
    /// Rows the model was trained on
    pub training_rows: usize,
    /// Submission records written
    pub records: usize,
    /// Path of the written CSV submission
    pub csv_path: PathBuf,
    /// Path of the written parquet submission
    pub parquet_path: PathBuf,
}

/// Run the whole pipeline: ingest, aggregate, densify, featurize, train,
/// forecast, and write the submission files.
pub fn run(config: &PipelineConfig) -> Result<PipelineSummary> {
    info!("loading raw tables from {}", config.data_dir.display());
    let transactions = DataLoader::load_transactions(config.transactions_path())?;
    let products = DataLoader::load_products(config.products_path())?;
    let stores = DataLoader::load_stores(config.stores_path())?;
    info!(
        "loaded {} transactions, {} products, {} stores",
        transactions.len(),
        products.len(),
        stores.len()
    );

    let facts = aggregate_weekly(&transactions);
    info!("aggregated into {} weekly facts", facts.len());
    drop(transactions);

    let grid = build_grid(&facts, &products, &stores);
    info!(
        "grid: {} pairs x {} weeks = {} rows",
        grid.pairs().len(),
        grid.weeks().len(),
        grid.len()
    );
    drop(facts);
    drop(products);
    drop(stores);

    let features = build_features(&grid)?;
    let training_rows = features.training_rows();
    let targets = features.training_targets();
    info!(
        "feature table: {} rows, {} eligible for training",
        features.rows.len(),
        training_rows.len()
    );

    let encoder = FeatureEncoder::fit(&training_rows);
    let matrix = encoder.encode_rows(&training_rows);
    info!(
        "training on {} rows x {} features",
        matrix.len(),
        matrix.width()
    );

    let model = DemandModel::train(&matrix, &targets, &config.model)?;
    drop(matrix);
    drop(features);
    info!("model trained, forecasting {} weeks ahead", config.horizon);

    let forecaster = RecursiveForecaster::new(&model, &encoder, config.horizon);
    let forecasts = forecaster.run(&grid)?;

    let records = submission::from_forecasts(&forecasts);
    let (csv_path, parquet_path) = submission::write_all(&config.submissions_dir, &records)?;
    info!(
        "wrote {} records to {} and {}",
        records.len(),
        csv_path.display(),
        parquet_path.display()
    );

    Ok(PipelineSummary {
        pairs: grid.pairs().len(),
        weeks: grid.weeks().len(),
        training_rows: targets.len(),
        records: records.len(),
        csv_path,
        parquet_path,
    })
}
