//! Calendar, lag, and rolling-window feature derivation

use crate::calendar::CalendarFeatures;
use crate::error::Result;
use crate::grid::{GridRow, SalesGrid};
use statrs::statistics::Statistics;

/// Number of weekly lags derived per series
pub const LAG_WEEKS: usize = 4;

/// Trailing window length for rolling statistics, current week inclusive
pub const ROLLING_WINDOW: usize = 4;

/// A grid row extended with calendar and time-series features
#[derive(Debug, Clone)]
pub struct FeatureRow {
    /// The underlying grid row
    pub grid: GridRow,
    /// Calendar features for the row's week
    pub calendar: CalendarFeatures,
    /// Quantity k weeks prior within the same series, absent for the
    /// first k weeks of the series
    pub lags: [Option<f64>; LAG_WEEKS],
    /// Rolling mean of quantity over the trailing window
    pub roll_mean: f64,
    /// Rolling sample standard deviation, 0 for windows under 2 observations
    pub roll_std: f64,
    /// Rolling maximum of quantity over the trailing window
    pub roll_max: f64,
    /// Rolling minimum of quantity over the trailing window
    pub roll_min: f64,
}

impl FeatureRow {
    /// Whether the row carries a full lag history and may train the model
    pub fn has_full_lags(&self) -> bool {
        self.lags[LAG_WEEKS - 1].is_some()
    }
}

/// The engineered feature table, same order as the grid
#[derive(Debug, Clone)]
pub struct FeatureTable {
    /// All feature rows, including those with partial lag history
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Rows eligible for training: only those with a full 4-week lag history.
    /// The first `LAG_WEEKS` weeks of every series are excluded.
    pub fn training_rows(&self) -> Vec<&FeatureRow> {
        self.rows.iter().filter(|r| r.has_full_lags()).collect()
    }

    /// Target quantities aligned with `training_rows`
    pub fn training_targets(&self) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| r.has_full_lags())
            .map(|r| r.grid.quantity)
            .collect()
    }
}

/// Mean, sample std, max, and min over a trailing window of quantities.
///
/// The std of a single observation is 0 rather than undefined.
pub fn rolling_stats(window: &[f64]) -> (f64, f64, f64, f64) {
    debug_assert!(!window.is_empty());
    let mean = window.mean();
    let std = if window.len() < 2 {
        0.0
    } else {
        window.std_dev()
    };
    (mean, std, window.max(), window.min())
}

/// Derive calendar and per-series lag/rolling features over the grid.
///
/// The grid is already sorted by (store, product, week), which establishes
/// the per-series time order the lag and rolling passes depend on. Rolling
/// statistics include the current week's quantity; the forecaster computes
/// its own rolling window from history alone since the current quantity is
/// exactly what it predicts.
pub fn build_features(grid: &SalesGrid) -> Result<FeatureTable> {
    let mut rows = Vec::with_capacity(grid.rows.len());
    let mut series: Vec<f64> = Vec::new();
    let mut current_pair: Option<(i64, i64)> = None;

    for grid_row in &grid.rows {
        let pair = (grid_row.store_id, grid_row.product_id);
        if current_pair != Some(pair) {
            current_pair = Some(pair);
            series.clear();
        }

        let mut lags = [None; LAG_WEEKS];
        for (k, lag) in lags.iter_mut().enumerate() {
            if series.len() > k {
                *lag = Some(series[series.len() - 1 - k]);
            }
        }

        series.push(grid_row.quantity);
        let window_start = series.len().saturating_sub(ROLLING_WINDOW);
        let (roll_mean, roll_std, roll_max, roll_min) = rolling_stats(&series[window_start..]);

        rows.push(FeatureRow {
            grid: grid_row.clone(),
            calendar: CalendarFeatures::for_week(grid_row.week_start),
            lags,
            roll_mean,
            roll_std,
            roll_max,
            roll_min,
        });
    }

    Ok(FeatureTable { rows })
}
