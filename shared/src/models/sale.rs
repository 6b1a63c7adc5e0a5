//! Sale records derived from sold orders

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Order;
use crate::types::YearMonth;

/// One sold line item, the input unit of the sales series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub product_option_id: String,
    pub sale_date: NaiveDateTime,
    pub quantity: u32,
    /// Forecasting cross-section, the ship-to region
    pub group: String,
}

impl Sale {
    pub fn new(
        product_option_id: impl Into<String>,
        sale_date: NaiveDateTime,
        quantity: u32,
        group: impl Into<String>,
    ) -> Self {
        Self {
            product_option_id: product_option_id.into(),
            sale_date,
            quantity,
            group: group.into(),
        }
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth::of(&self.sale_date)
    }
}

/// Collect one sale per (order, item) of every sold order, keyed by option id.
///
/// Keys and per-key sales keep the order in which they were first met.
pub fn sales_by_option<'a>(orders: impl IntoIterator<Item = &'a Order>) -> IndexMap<String, Vec<Sale>> {
    let mut sales: IndexMap<String, Vec<Sale>> = IndexMap::new();
    for order in orders.into_iter().filter(|order| order.is_sold()) {
        for item in order.items.values() {
            sales
                .entry(item.product_option_id.clone())
                .or_default()
                .push(Sale::new(
                    item.product_option_id.clone(),
                    order.created_at,
                    item.quantity,
                    order.address.region(),
                ));
        }
    }
    sales
}
