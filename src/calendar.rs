//! Week anchoring and calendar-derived features

use chrono::{Datelike, Duration, NaiveDate};

/// Truncate a date to the Monday-aligned start of its calendar week.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(offset)
}

/// The `horizon` week starts strictly after `last_week`, one week apart.
pub fn future_weeks(last_week: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon as i64)
        .map(|i| last_week + Duration::weeks(i))
        .collect()
}

/// Cyclical encoding of a month number onto the unit circle.
///
/// Avoids the false ordinal distance between December and January that a
/// raw integer month would introduce into tree splits.
pub fn month_cycle(month: u32) -> (f64, f64) {
    let angle = 2.0 * std::f64::consts::PI * month as f64 / 12.0;
    (angle.sin(), angle.cos())
}

/// Calendar features derived from a week start date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarFeatures {
    /// Month of the year (1-12)
    pub month: u32,
    /// Calendar year
    pub year: i32,
    /// ISO week number (1-53)
    pub iso_week: u32,
    /// Sine component of the cyclical month encoding
    pub month_sin: f64,
    /// Cosine component of the cyclical month encoding
    pub month_cos: f64,
}

impl CalendarFeatures {
    /// Compute calendar features for a week start date
    pub fn for_week(week: NaiveDate) -> Self {
        let month = week.month();
        let (month_sin, month_cos) = month_cycle(month);
        Self {
            month,
            year: week.year(),
            iso_week: week.iso_week().week(),
            month_sin,
            month_cos,
        }
    }
}
