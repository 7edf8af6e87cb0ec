//! Densified (store, product) x week sales grid

use crate::aggregate::WeeklyFact;
use crate::data::{ProductInfo, StoreInfo};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// One row of the densified sales grid.
///
/// Every (store, product) pair observed anywhere in the facts gets a row for
/// every observed week. Weeks without a sale carry an explicit zero quantity;
/// value and transaction count stay absent for them, as do registry
/// attributes for unknown stores or products.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    /// Monday-aligned start of the week
    pub week_start: NaiveDate,
    /// Point-of-sale identifier
    pub store_id: i64,
    /// Product identifier
    pub product_id: i64,
    /// Units sold in the week, zero when no transaction occurred
    pub quantity: f64,
    /// Gross value summed over the week, absent without a sale
    pub value: Option<f64>,
    /// Transactions in the week, absent without a sale
    pub tx_count: Option<u32>,
    /// Product category from the registry
    pub product_category: Option<String>,
    /// Store premise attribute from the registry
    pub premise: Option<String>,
    /// Store category from the registry
    pub store_category: Option<String>,
    /// Store zipcode from the registry
    pub zipcode: Option<i64>,
}

/// The complete densified grid, sorted by (store, product, week)
#[derive(Debug, Clone)]
pub struct SalesGrid {
    /// Grid rows, one per pair x week
    pub rows: Vec<GridRow>,
    pairs: Vec<(i64, i64)>,
    weeks: Vec<NaiveDate>,
}

impl SalesGrid {
    /// Distinct (store, product) pairs, ascending
    pub fn pairs(&self) -> &[(i64, i64)] {
        &self.pairs
    }

    /// Distinct week starts, ascending
    pub fn weeks(&self) -> &[NaiveDate] {
        &self.weeks
    }

    /// Most recent week start in the grid
    pub fn last_week(&self) -> Option<NaiveDate> {
        self.weeks.last().copied()
    }

    /// Number of rows, always pairs x weeks
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the grid holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Materialize the full cross product of observed pairs and weeks,
/// left-joining weekly facts and static registry attributes onto it.
pub fn build_grid(
    facts: &[WeeklyFact],
    products: &HashMap<i64, ProductInfo>,
    stores: &HashMap<i64, StoreInfo>,
) -> SalesGrid {
    let pairs: BTreeSet<(i64, i64)> = facts.iter().map(|f| (f.store_id, f.product_id)).collect();
    let weeks: BTreeSet<NaiveDate> = facts.iter().map(|f| f.week_start).collect();

    let fact_index: HashMap<(i64, i64, NaiveDate), &WeeklyFact> = facts
        .iter()
        .map(|f| ((f.store_id, f.product_id, f.week_start), f))
        .collect();

    let mut rows = Vec::with_capacity(pairs.len() * weeks.len());
    for &(store_id, product_id) in &pairs {
        let product = products.get(&product_id);
        let store = stores.get(&store_id);
        for &week in &weeks {
            let fact = fact_index.get(&(store_id, product_id, week));
            rows.push(GridRow {
                week_start: week,
                store_id,
                product_id,
                quantity: fact.map(|f| f.quantity).unwrap_or(0.0),
                value: fact.map(|f| f.value),
                tx_count: fact.map(|f| f.tx_count),
                product_category: product.and_then(|p| p.category.clone()),
                premise: store.and_then(|s| s.premise.clone()),
                store_category: store.and_then(|s| s.category.clone()),
                zipcode: store.and_then(|s| s.zipcode),
            });
        }
    }

    SalesGrid {
        rows,
        pairs: pairs.into_iter().collect(),
        weeks: weeks.into_iter().collect(),
    }
}
