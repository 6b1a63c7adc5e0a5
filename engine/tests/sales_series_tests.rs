//! Sales series tests
//!
//! Tests for the per-region monthly matrices including:
//! - Zero-filled months between first sale and the series end
//! - Columns scoped to one region
//! - Sales taken from sold orders only

mod common;

use common::{at, order};
use indexmap::IndexMap;
use proptest::prelude::*;
use shared::{sales_by_option, OrderState, Sale, YearMonth};
use wholesale_pipeline::services::SalesSeriesBuilder;

fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// A: 3 units in Jan, B: 1 unit in Feb, A: 5 units in Mar, as of March
    #[test]
    fn test_single_region_matrix_layout() {
        let orders = vec![
            order("bo_1", OrderState::Delivered, at(2023, 1, 10), "X", &[("po_a", 3, 100)]),
            order("bo_2", OrderState::Delivered, at(2023, 2, 10), "X", &[("po_b", 1, 100)]),
            order("bo_3", OrderState::Delivered, at(2023, 3, 10), "X", &[("po_a", 5, 100)]),
        ];

        let matrices = SalesSeriesBuilder::new(ym(2023, 3)).build(&sales_by_option(&orders));

        let matrix = &matrices["X"];
        assert_eq!(matrix.option_ids(), &["po_a".to_string(), "po_b".to_string()]);
        assert_eq!(matrix.rows(), 3);
        assert_eq!(matrix.row(0), Some(vec![3, 0]));
        assert_eq!(matrix.row(1), Some(vec![0, 1]));
        assert_eq!(matrix.row(2), Some(vec![5, 0]));
    }

    #[test]
    fn test_regions_do_not_share_columns() {
        let orders = vec![
            order("bo_1", OrderState::Processing, at(2023, 1, 10), "CA", &[("po_a", 2, 100)]),
            order("bo_2", OrderState::Processing, at(2023, 2, 10), "NY", &[("po_b", 4, 100)]),
        ];

        let matrices = SalesSeriesBuilder::new(ym(2023, 2)).build(&sales_by_option(&orders));

        assert_eq!(matrices.len(), 2);
        assert_eq!(matrices["CA"].option_ids(), &["po_a".to_string()]);
        assert_eq!(matrices["NY"].option_ids(), &["po_b".to_string()]);
        assert_eq!(matrices["CA"].rows(), 2);
        assert_eq!(matrices["NY"].rows(), 1);
    }

    #[test]
    fn test_gap_months_are_zero_rows() {
        let orders = vec![
            order("bo_1", OrderState::Delivered, at(2022, 11, 10), "CA", &[("po_a", 2, 100)]),
            order("bo_2", OrderState::Delivered, at(2023, 2, 10), "CA", &[("po_a", 1, 100)]),
        ];

        let matrix = &SalesSeriesBuilder::new(ym(2023, 4)).build(&sales_by_option(&orders))["CA"];

        assert_eq!(matrix.start(), ym(2022, 11));
        assert_eq!(matrix.end(), ym(2023, 4));
        assert_eq!(matrix.rows(), 6);
        let column: Vec<u64> = (0..matrix.rows()).map(|row| matrix.get(row, 0).unwrap()).collect();
        assert_eq!(column, vec![2, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn test_unsold_orders_produce_no_sales() {
        let orders = vec![
            order("bo_1", OrderState::Canceled, at(2023, 1, 10), "CA", &[("po_a", 2, 100)]),
            order("bo_2", OrderState::Backordered, at(2023, 1, 10), "CA", &[("po_a", 2, 100)]),
            order("bo_3", OrderState::New, at(2023, 1, 10), "CA", &[("po_a", 2, 100)]),
        ];

        let matrices = SalesSeriesBuilder::new(ym(2023, 1)).build(&sales_by_option(&orders));

        assert!(matrices.is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::NaiveDate;

    const OPTIONS: [&str; 3] = ["po_a", "po_b", "po_c"];
    const GROUPS: [&str; 2] = ["CA", "NY"];

    /// Sales as (option, group, months after Jan 2022, quantity)
    fn sales_strategy() -> impl Strategy<Value = Vec<(usize, usize, u32, u32)>> {
        prop::collection::vec((0..OPTIONS.len(), 0..GROUPS.len(), 0u32..24, 1u32..50), 1..40)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every unit lands in exactly one cell and each matrix ends at as_of
        #[test]
        fn prop_units_are_preserved(specs in sales_strategy()) {
            let as_of = ym(2023, 12);
            let mut sales: IndexMap<String, Vec<Sale>> = IndexMap::new();
            for (option, group, offset, quantity) in &specs {
                let month = ym(2022, 1).add_months(i64::from(*offset));
                let date = NaiveDate::from_ymd_opt(month.year, month.month, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap();
                sales
                    .entry(OPTIONS[*option].to_string())
                    .or_default()
                    .push(Sale::new(OPTIONS[*option], date, *quantity, GROUPS[*group]));
            }

            let matrices = SalesSeriesBuilder::new(as_of).build(&sales);

            let expected: u64 = specs.iter().map(|(_, _, _, quantity)| u64::from(*quantity)).sum();
            let mut total = 0u64;
            for matrix in matrices.values() {
                prop_assert_eq!(matrix.end(), as_of);
                for row in 0..matrix.rows() {
                    total += matrix.row(row).unwrap().iter().sum::<u64>();
                }
            }
            prop_assert_eq!(total, expected);
        }
    }
}
