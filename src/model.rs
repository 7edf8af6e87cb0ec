//! Gradient boosted regression model for weekly demand

use crate::encode::FeatureMatrix;
use crate::error::{ForecastError, Result};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;

/// Training parameters for the gradient boosted ensemble.
///
/// Defaults are the final-run settings: an L1 objective fit on the full
/// history with no held-out split. The underlying library controls tree
/// complexity by depth; depth 5 caps each tree at 32 leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct GbdtParams {
    /// Number of boosting rounds
    pub iterations: usize,
    /// Learning rate
    pub shrinkage: f32,
    /// Maximum tree depth
    pub max_depth: u32,
    /// Fraction of rows sampled per boosting round
    pub data_sample_ratio: f64,
    /// Fraction of feature columns sampled per tree
    pub feature_sample_ratio: f64,
    /// Minimum number of rows in a leaf
    pub min_leaf_size: usize,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            iterations: 3000,
            shrinkage: 0.05,
            max_depth: 5,
            data_sample_ratio: 0.8,
            feature_sample_ratio: 0.8,
            min_leaf_size: 20,
        }
    }
}

impl GbdtParams {
    /// Small, deterministic settings for tests and smoke runs
    pub fn smoke() -> Self {
        Self {
            iterations: 10,
            shrinkage: 0.1,
            max_depth: 3,
            data_sample_ratio: 1.0,
            feature_sample_ratio: 1.0,
            min_leaf_size: 1,
        }
    }
}

/// A trained demand model
pub struct DemandModel {
    gbdt: GBDT,
    feature_names: Vec<String>,
    categorical: Vec<bool>,
}

impl DemandModel {
    /// Train on the engineered feature matrix with an absolute-error
    /// objective. The categorical columns declared by the matrix are passed
    /// to the trees as their integer codes.
    pub fn train(matrix: &FeatureMatrix, targets: &[f64], params: &GbdtParams) -> Result<Self> {
        if matrix.is_empty() {
            return Err(ForecastError::Model(
                "cannot train on an empty feature matrix".to_string(),
            ));
        }
        if matrix.len() != targets.len() {
            return Err(ForecastError::Model(format!(
                "feature rows ({}) and targets ({}) differ in length",
                matrix.len(),
                targets.len()
            )));
        }

        let mut cfg = Config::new();
        cfg.set_feature_size(matrix.width());
        cfg.set_max_depth(params.max_depth);
        cfg.set_iterations(params.iterations);
        cfg.set_shrinkage(params.shrinkage);
        cfg.set_loss("LAD");
        cfg.set_data_sample_ratio(params.data_sample_ratio);
        cfg.set_feature_sample_ratio(params.feature_sample_ratio);
        cfg.set_min_leaf_size(params.min_leaf_size);
        cfg.set_debug(false);
        cfg.set_training_optimization_level(2);

        let mut training: DataVec = matrix
            .rows
            .iter()
            .zip(targets)
            .map(|(row, &target)| Data::new_training_data(row.clone(), 1.0, target as f32, None))
            .collect();

        let mut gbdt = GBDT::new(&cfg);
        gbdt.fit(&mut training);

        Ok(Self {
            gbdt,
            feature_names: matrix.names.clone(),
            categorical: matrix.categorical.clone(),
        })
    }

    /// Predict raw (unclamped) quantities for a feature matrix
    pub fn predict(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>> {
        if matrix.names != self.feature_names {
            return Err(ForecastError::Model(format!(
                "feature layout mismatch: trained on {:?}, given {:?}",
                self.feature_names, matrix.names
            )));
        }

        let test: DataVec = matrix
            .rows
            .iter()
            .map(|row| Data::new_test_data(row.clone(), None))
            .collect();

        let predictions = self.gbdt.predict(&test);
        Ok(predictions.into_iter().map(|p| p as f64).collect())
    }

    /// Model input column names, in training order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Per-column categorical flags the model was trained with
    pub fn categorical_flags(&self) -> &[bool] {
        &self.categorical
    }
}
