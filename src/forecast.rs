//! Recursive multi-week demand forecasting

use crate::calendar::{future_weeks, CalendarFeatures};
use crate::encode::FeatureEncoder;
use crate::error::{ForecastError, Result};
use crate::features::{rolling_stats, FeatureRow, LAG_WEEKS, ROLLING_WINDOW};
use crate::grid::{GridRow, SalesGrid};
use crate::model::DemandModel;
use log::info;
use std::collections::BTreeMap;

/// One forecast output record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastRecord {
    /// Forecast week index, 1-based
    pub week_index: u32,
    /// Point-of-sale identifier
    pub store_id: i64,
    /// Product identifier
    pub product_id: i64,
    /// Predicted units, always a non-negative integer
    pub quantity: i64,
}

/// Append-only ordered quantity log per (store, product) series.
///
/// Seeded from the full grid and grown by one entry per series per forecast
/// step, so lag and rolling lookups for week i see predictions for weeks
/// earlier than i and nothing later.
#[derive(Debug, Clone)]
pub struct SeriesHistory {
    series: BTreeMap<(i64, i64), Vec<f64>>,
}

impl SeriesHistory {
    /// Seed the history with every series' full weekly quantities
    pub fn from_grid(grid: &SalesGrid) -> Self {
        let mut series: BTreeMap<(i64, i64), Vec<f64>> = BTreeMap::new();
        for row in &grid.rows {
            series
                .entry((row.store_id, row.product_id))
                .or_default()
                .push(row.quantity);
        }
        Self { series }
    }

    /// Quantity k weeks before the next (not yet appended) week, if the
    /// series reaches back that far. `k` is 1-based.
    pub fn lag(&self, pair: (i64, i64), k: usize) -> Option<f64> {
        let log = self.series.get(&pair)?;
        if log.len() >= k {
            Some(log[log.len() - k])
        } else {
            None
        }
    }

    /// The trailing rolling window of the series, at most `ROLLING_WINDOW`
    /// most recent entries
    pub fn rolling_window(&self, pair: (i64, i64)) -> &[f64] {
        match self.series.get(&pair) {
            Some(log) => &log[log.len().saturating_sub(ROLLING_WINDOW)..],
            None => &[],
        }
    }

    /// Append the next week's quantity to a series
    pub fn push(&mut self, pair: (i64, i64), quantity: f64) {
        self.series.entry(pair).or_default().push(quantity);
    }

    /// Number of entries recorded for a series
    pub fn len(&self, pair: (i64, i64)) -> usize {
        self.series.get(&pair).map(|log| log.len()).unwrap_or(0)
    }
}

/// Clamp a raw model output to a valid demand quantity: never negative,
/// truncated to a whole number of units.
pub fn clamp_demand(raw: f64) -> i64 {
    raw.max(0.0) as i64
}

/// Iterative one-step-ahead forecaster.
///
/// Each step predicts one week for every (store, product) pair and folds
/// the predictions back into the series history before the next step, so
/// subsequent lag and rolling features chain off predicted values.
pub struct RecursiveForecaster<'a> {
    model: &'a DemandModel,
    encoder: &'a FeatureEncoder,
    horizon: usize,
}

impl<'a> RecursiveForecaster<'a> {
    /// Create a forecaster for the given trained model and encoder
    pub fn new(model: &'a DemandModel, encoder: &'a FeatureEncoder, horizon: usize) -> Self {
        Self {
            model,
            encoder,
            horizon,
        }
    }

    /// Run the full multi-week forecast over every pair in the grid.
    ///
    /// Returns exactly `horizon * pairs` records, week indices 1..=horizon.
    pub fn run(&self, grid: &SalesGrid) -> Result<Vec<ForecastRecord>> {
        let last_week = grid
            .last_week()
            .ok_or_else(|| ForecastError::Feature("cannot forecast from an empty grid".into()))?;

        // Static attributes per pair, taken from the pair's first grid row
        let mut attributes: BTreeMap<(i64, i64), &GridRow> = BTreeMap::new();
        for row in &grid.rows {
            attributes.entry((row.store_id, row.product_id)).or_insert(row);
        }

        let mut history = SeriesHistory::from_grid(grid);
        let mut records = Vec::with_capacity(self.horizon * grid.pairs().len());

        for (step, week) in future_weeks(last_week, self.horizon).into_iter().enumerate() {
            let week_index = step as u32 + 1;
            info!(
                "forecasting week {} of {} ({})",
                week_index, self.horizon, week
            );

            let calendar = CalendarFeatures::for_week(week);
            let rows: Vec<FeatureRow> = grid
                .pairs()
                .iter()
                .map(|&pair| self.future_row(pair, week, calendar, &attributes, &history))
                .collect();

            let refs: Vec<&FeatureRow> = rows.iter().collect();
            let matrix = self.encoder.encode_rows(&refs);
            let predictions = self.model.predict(&matrix)?;

            for (&(store_id, product_id), raw) in grid.pairs().iter().zip(&predictions) {
                let quantity = clamp_demand(*raw);
                history.push((store_id, product_id), quantity as f64);
                records.push(ForecastRecord {
                    week_index,
                    store_id,
                    product_id,
                    quantity,
                });
            }
        }

        Ok(records)
    }

    /// Build the feature row for one pair and one future week.
    ///
    /// Lags come straight off the series history; the rolling window covers
    /// only known history since the week's own quantity does not exist yet.
    fn future_row(
        &self,
        pair: (i64, i64),
        week: chrono::NaiveDate,
        calendar: CalendarFeatures,
        attributes: &BTreeMap<(i64, i64), &GridRow>,
        history: &SeriesHistory,
    ) -> FeatureRow {
        let (store_id, product_id) = pair;
        let template = attributes.get(&pair);

        let mut lags = [None; LAG_WEEKS];
        for (k, lag) in lags.iter_mut().enumerate() {
            *lag = history.lag(pair, k + 1);
        }

        let window = history.rolling_window(pair);
        let (roll_mean, roll_std, roll_max, roll_min) = if window.is_empty() {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            rolling_stats(window)
        };

        FeatureRow {
            grid: GridRow {
                week_start: week,
                store_id,
                product_id,
                quantity: 0.0,
                value: None,
                tx_count: None,
                product_category: template.and_then(|t| t.product_category.clone()),
                premise: template.and_then(|t| t.premise.clone()),
                store_category: template.and_then(|t| t.store_category.clone()),
                zipcode: template.and_then(|t| t.zipcode),
            },
            calendar,
            lags,
            roll_mean,
            roll_std,
            roll_max,
            roll_min,
        }
    }
}
