//! Weekly aggregation of raw transactions

use crate::calendar::week_start;
use crate::data::Transaction;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Sales facts for one observed (week, store, product) combination
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyFact {
    /// Monday-aligned start of the week
    pub week_start: NaiveDate,
    /// Point-of-sale identifier
    pub store_id: i64,
    /// Product identifier
    pub product_id: i64,
    /// Sum of units sold in the week
    pub quantity: f64,
    /// Sum of gross value in the week
    pub value: f64,
    /// Number of transactions in the week
    pub tx_count: u32,
}

/// Bucket raw transactions into weekly (week, store, product) facts.
///
/// Output contains exactly one row per observed combination, sorted by
/// (week, store, product). Combinations without transactions do not appear;
/// the grid builder densifies them later.
pub fn aggregate_weekly(transactions: &[Transaction]) -> Vec<WeeklyFact> {
    let mut buckets: BTreeMap<(NaiveDate, i64, i64), (f64, f64, u32)> = BTreeMap::new();

    for tx in transactions {
        let key = (week_start(tx.date), tx.store_id, tx.product_id);
        let entry = buckets.entry(key).or_insert((0.0, 0.0, 0));
        entry.0 += tx.quantity;
        entry.1 += tx.value;
        entry.2 += 1;
    }

    buckets
        .into_iter()
        .map(
            |((week_start, store_id, product_id), (quantity, value, tx_count))| WeeklyFact {
                week_start,
                store_id,
                product_id,
                quantity,
                value,
                tx_count,
            },
        )
        .collect()
}
