//! Categorical encoding and numeric downcasting of the feature table

use crate::features::{FeatureRow, LAG_WEEKS};
use std::collections::{BTreeSet, HashMap};

/// Cardinality statistics for one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnStats {
    /// Number of rows in the column
    pub rows: usize,
    /// Number of distinct non-missing values
    pub distinct: usize,
}

/// Whether a text column is low-cardinality enough to store as a
/// categorical encoding. The threshold is a distinct-to-rows ratio of 0.5.
pub fn should_encode_as_categorical(stats: &ColumnStats) -> bool {
    stats.rows > 0 && (stats.distinct as f64) / (stats.rows as f64) < 0.5
}

/// Dense integer codes for one text column.
///
/// Code 0 is reserved for missing and unseen values; observed values get
/// codes 1..=n in lexical order, so a refit over the same data is stable.
#[derive(Debug, Clone, Default)]
pub struct CategoricalEncoder {
    codes: HashMap<String, u32>,
}

impl CategoricalEncoder {
    /// Fit the encoder over a column of optional values
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let distinct: BTreeSet<&str> = values.into_iter().flatten().collect();
        let codes = distinct
            .into_iter()
            .enumerate()
            .map(|(i, v)| (v.to_string(), i as u32 + 1))
            .collect();
        Self { codes }
    }

    /// Encode a value; missing and unseen values map to 0
    pub fn encode(&self, value: Option<&str>) -> u32 {
        value
            .and_then(|v| self.codes.get(v))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct known values
    pub fn cardinality(&self) -> usize {
        self.codes.len()
    }
}

/// Compact, model-ready feature table: f32 storage with per-column
/// categorical flags.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    /// Column names, in model input order
    pub names: Vec<String>,
    /// Whether each column holds categorical codes
    pub categorical: Vec<bool>,
    /// Row-major feature values
    pub rows: Vec<Vec<f32>>,
}

impl FeatureMatrix {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the matrix holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of feature columns
    pub fn width(&self) -> usize {
        self.names.len()
    }
}

/// Encodes feature rows into the model input layout.
///
/// Identifier, target, and leakage columns never enter the matrix: week,
/// store id, product id, quantity, value, transaction count, and year are
/// all excluded. Remaining missing values are zero-filled here.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    premise: CategoricalEncoder,
    store_category: CategoricalEncoder,
    product_category: CategoricalEncoder,
    premise_categorical: bool,
    store_category_categorical: bool,
    product_category_categorical: bool,
}

impl FeatureEncoder {
    /// Fit the attribute encoders over the training rows, deciding per
    /// column whether it qualifies for categorical storage.
    pub fn fit(rows: &[&FeatureRow]) -> Self {
        let premise = CategoricalEncoder::fit(rows.iter().map(|r| r.grid.premise.as_deref()));
        let store_category =
            CategoricalEncoder::fit(rows.iter().map(|r| r.grid.store_category.as_deref()));
        let product_category =
            CategoricalEncoder::fit(rows.iter().map(|r| r.grid.product_category.as_deref()));

        let stats = |distinct: usize| ColumnStats {
            rows: rows.len(),
            distinct,
        };

        Self {
            premise_categorical: should_encode_as_categorical(&stats(premise.cardinality())),
            store_category_categorical: should_encode_as_categorical(&stats(
                store_category.cardinality(),
            )),
            product_category_categorical: should_encode_as_categorical(&stats(
                product_category.cardinality(),
            )),
            premise,
            store_category,
            product_category,
        }
    }

    /// Model input column names, in order
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = vec![
            "month".to_string(),
            "iso_week".to_string(),
            "month_sin".to_string(),
            "month_cos".to_string(),
            "premise".to_string(),
            "store_category".to_string(),
            "zipcode".to_string(),
            "product_category".to_string(),
        ];
        for k in 1..=LAG_WEEKS {
            names.push(format!("qty_lag_{}", k));
        }
        names.extend([
            "qty_mean_4w".to_string(),
            "qty_std_4w".to_string(),
            "qty_max_4w".to_string(),
            "qty_min_4w".to_string(),
        ]);
        names
    }

    /// Per-column categorical flags, aligned with `feature_names`
    pub fn categorical_flags(&self) -> Vec<bool> {
        let mut flags = vec![false; 4];
        flags.push(self.premise_categorical);
        flags.push(self.store_category_categorical);
        flags.push(false); // zipcode
        flags.push(self.product_category_categorical);
        flags.extend(std::iter::repeat(false).take(LAG_WEEKS + 4));
        flags
    }

    /// Encode one feature row into the model input layout
    pub fn encode_row(&self, row: &FeatureRow) -> Vec<f32> {
        let mut out = Vec::with_capacity(8 + LAG_WEEKS + 4);
        out.push(row.calendar.month as f32);
        out.push(row.calendar.iso_week as f32);
        out.push(row.calendar.month_sin as f32);
        out.push(row.calendar.month_cos as f32);
        out.push(self.premise.encode(row.grid.premise.as_deref()) as f32);
        out.push(self.store_category.encode(row.grid.store_category.as_deref()) as f32);
        out.push(row.grid.zipcode.unwrap_or(0) as f32);
        out.push(
            self.product_category
                .encode(row.grid.product_category.as_deref()) as f32,
        );
        for lag in &row.lags {
            out.push(lag.unwrap_or(0.0) as f32);
        }
        out.push(row.roll_mean as f32);
        out.push(row.roll_std as f32);
        out.push(row.roll_max as f32);
        out.push(row.roll_min as f32);
        out
    }

    /// Encode a set of feature rows into a matrix
    pub fn encode_rows(&self, rows: &[&FeatureRow]) -> FeatureMatrix {
        FeatureMatrix {
            names: self.feature_names(),
            categorical: self.categorical_flags(),
            rows: rows.iter().map(|r| self.encode_row(r)).collect(),
        }
    }
}
