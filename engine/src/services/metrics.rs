//! Metrics over the order set after fulfillment
//!
//! Every ranking keeps the first entity, in iteration order, that reaches
//! the best score: a later entity replaces it only when strictly better.

use std::fmt;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use shared::{Catalog, Order};

use crate::error::EmptyAggregate;

/// Winner of a ranking and its score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked<K, S> {
    pub key: K,
    pub score: S,
}

/// Argmax over `(key, score)` pairs with first-encountered tie-break
pub fn first_best<K, S, I>(scores: I) -> Option<Ranked<K, S>>
where
    S: PartialOrd,
    I: IntoIterator<Item = (K, S)>,
{
    let mut best: Option<Ranked<K, S>> = None;
    for (key, score) in scores {
        let replace = match &best {
            None => true,
            Some(current) => score > current.score,
        };
        if replace {
            best = Some(Ranked { key, score });
        }
    }
    best
}

/// Best-selling option with its display name when known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestSellingOption {
    pub option_id: String,
    pub option_name: Option<String>,
    pub units: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CancellationRatio {
    pub total: usize,
    pub canceled: usize,
    pub ratio: f64,
}

/// Report of the five run metrics
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    pub best_selling_option: Result<BestSellingOption, EmptyAggregate>,
    pub largest_order_by_amount: Result<Ranked<String, Decimal>, EmptyAggregate>,
    pub region_with_most_orders: Result<Ranked<String, u64>, EmptyAggregate>,
    pub largest_order_by_quantity: Result<Ranked<String, u64>, EmptyAggregate>,
    pub cancellation_ratio: Result<CancellationRatio, EmptyAggregate>,
}

/// Metrics aggregator over a catalog and order set
pub struct MetricsAggregator<'a> {
    catalog: &'a Catalog,
    orders: &'a [Order],
}

impl<'a> MetricsAggregator<'a> {
    pub fn new(catalog: &'a Catalog, orders: &'a [Order]) -> Self {
        Self { catalog, orders }
    }

    fn sold(&self) -> impl Iterator<Item = &'a Order> {
        self.orders.iter().filter(|order| order.is_sold())
    }

    /// Option with the most units across sold orders
    pub fn best_selling_option(&self) -> Result<BestSellingOption, EmptyAggregate> {
        let mut units: IndexMap<&str, u64> = IndexMap::new();
        for order in self.sold() {
            for item in order.items.values() {
                *units.entry(item.product_option_id.as_str()).or_insert(0) += u64::from(item.quantity);
            }
        }

        let best = first_best(units).ok_or(EmptyAggregate {
            metric: "best_selling_option",
        })?;
        Ok(BestSellingOption {
            option_id: best.key.to_string(),
            option_name: self.catalog.find_option(best.key).map(|option| option.name.clone()),
            units: best.score,
        })
    }

    /// Sold order with the largest dollar amount, tester prices excluded
    pub fn largest_order_by_amount(&self) -> Result<Ranked<String, Decimal>, EmptyAggregate> {
        first_best(self.sold().map(|order| (order.id.clone(), order.dollar_amount()))).ok_or(EmptyAggregate {
            metric: "largest_order_by_amount",
        })
    }

    /// Region with the most sold orders
    pub fn region_with_most_orders(&self) -> Result<Ranked<String, u64>, EmptyAggregate> {
        let mut counts: IndexMap<&str, u64> = IndexMap::new();
        for order in self.sold() {
            *counts.entry(order.address.region()).or_insert(0) += 1;
        }
        first_best(counts)
            .map(|best| Ranked {
                key: best.key.to_string(),
                score: best.score,
            })
            .ok_or(EmptyAggregate {
                metric: "region_with_most_orders",
            })
    }

    /// Sold order with the most units
    pub fn largest_order_by_quantity(&self) -> Result<Ranked<String, u64>, EmptyAggregate> {
        first_best(self.sold().map(|order| (order.id.clone(), order.items_quantity()))).ok_or(EmptyAggregate {
            metric: "largest_order_by_quantity",
        })
    }

    /// Share of canceled orders among all orders
    pub fn cancellation_ratio(&self) -> Result<CancellationRatio, EmptyAggregate> {
        let total = self.orders.len();
        if total == 0 {
            return Err(EmptyAggregate {
                metric: "cancellation_ratio",
            });
        }
        let canceled = self.orders.iter().filter(|order| order.is_canceled()).count();
        Ok(CancellationRatio {
            total,
            canceled,
            ratio: canceled as f64 / total as f64,
        })
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            best_selling_option: self.best_selling_option(),
            largest_order_by_amount: self.largest_order_by_amount(),
            region_with_most_orders: self.region_with_most_orders(),
            largest_order_by_quantity: self.largest_order_by_quantity(),
            cancellation_ratio: self.cancellation_ratio(),
        }
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.best_selling_option {
            Ok(best) => writeln!(
                f,
                "Best selling product option has id \"{}\" and name \"{}\". Sold {} units",
                best.option_id,
                best.option_name.as_deref().unwrap_or(""),
                best.units
            )?,
            Err(_) => writeln!(f, "No product options sold yet")?,
        }
        match &self.largest_order_by_amount {
            Ok(largest) => writeln!(
                f,
                "Largest order by dollar amount has id \"{}\". Value is {} dollars",
                largest.key, largest.score
            )?,
            Err(_) => writeln!(f, "No orders sold yet")?,
        }
        match &self.region_with_most_orders {
            Ok(region) => writeln!(
                f,
                "Region with most orders is \"{}\". It has {} orders",
                region.key, region.score
            )?,
            Err(_) => writeln!(f, "No orders sold yet")?,
        }
        match &self.largest_order_by_quantity {
            Ok(largest) => writeln!(
                f,
                "Largest order by items quantity has id \"{}\". Quantity is {} units",
                largest.key, largest.score
            )?,
            Err(_) => writeln!(f, "No orders sold yet")?,
        }
        match &self.cancellation_ratio {
            Ok(ratio) => write!(
                f,
                "Total number of orders is {}. Canceled orders number is {}. The ratio is {}",
                ratio.total, ratio.canceled, ratio.ratio
            ),
            Err(_) => write!(f, "No orders found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_best_keeps_first_on_tie() {
        let best = first_best(vec![("a", 3), ("b", 7), ("c", 7), ("d", 1)]).unwrap();
        assert_eq!(best, Ranked { key: "b", score: 7 });
    }

    #[test]
    fn test_first_best_empty() {
        assert!(first_best(Vec::<(&str, u32)>::new()).is_none());
    }

    #[test]
    fn test_first_best_decimal_scores() {
        let best = first_best(vec![
            ("bo_1", Decimal::new(1050, 2)),
            ("bo_2", Decimal::new(105, 1)),
        ])
        .unwrap();
        assert_eq!(best.key, "bo_1");
    }

    #[test]
    fn test_report_without_orders() {
        let catalog = Catalog::default();
        let report = MetricsAggregator::new(&catalog, &[]).report();
        assert!(report.best_selling_option.is_err());
        assert!(report.cancellation_ratio.is_err());
        let rendered = report.to_string();
        assert!(rendered.contains("No product options sold yet"));
        assert!(rendered.ends_with("No orders found"));
    }
}
