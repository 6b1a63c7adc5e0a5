//! Snapshot loading tests
//!
//! Tests for turning fetched marketplace records into a catalog and order
//! set, using an in-memory record source.

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::OrderState;
use wholesale_pipeline::external::{load_snapshot, RecordSource, Resource};
use wholesale_pipeline::{AppError, AppResult};

/// Record source serving canned records
struct Canned {
    products: Vec<Value>,
    orders: Vec<Value>,
}

#[async_trait]
impl RecordSource for Canned {
    async fn fetch_all(&self, resource: Resource) -> AppResult<Vec<Value>> {
        Ok(match resource {
            Resource::Products => self.products.clone(),
            Resource::Orders => self.orders.clone(),
        })
    }
}

fn product(id: &str, brand: &str, stock: i64) -> Value {
    json!({
        "id": id,
        "brand_id": brand,
        "name": format!("Product {id}"),
        "wholesale_price_cents": 500,
        "retail_price_cents": 1000,
        "active": true,
        "options": [{
            "id": format!("{id}_o"),
            "product_id": id,
            "name": "Default",
            "active": true,
            "sku": format!("SKU-{id}"),
            "available_quantity": stock
        }]
    })
}

fn order(id: &str, state: &str) -> Value {
    json!({
        "id": id,
        "state": state,
        "created_at": "20230301T120000.000Z",
        "items": [{
            "id": format!("{id}_i"),
            "order_id": id,
            "product_id": "p_1",
            "product_option_id": "p_1_o",
            "quantity": 2,
            "price_cents": 500
        }],
        "address": {
            "address1": "5 Elm St",
            "postal_code": "10001",
            "city": "New York",
            "state": "New York",
            "state_code": "NY",
            "country": "United States",
            "country_code": "USA"
        }
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_keeps_fetch_order_and_filters_brand() {
        let source = Canned {
            products: vec![product("p_1", "b_1", 4), product("p_2", "b_2", 1), product("p_3", "b_1", 0)],
            orders: vec![order("bo_2", "DELIVERED"), order("bo_1", "NEW")],
        };

        let (catalog, orders) = load_snapshot(&source, Some("b_1")).await.unwrap();

        let ids: Vec<_> = catalog.products().map(|product| product.id.as_str()).collect();
        assert_eq!(ids, vec!["p_1", "p_3"]);
        assert_eq!(catalog.option("p_1", "p_1_o").unwrap().available_quantity, 4);

        let ids: Vec<_> = orders.iter().map(|order| order.id.as_str()).collect();
        assert_eq!(ids, vec!["bo_2", "bo_1"]);
        assert_eq!(orders[1].state, OrderState::New);
        assert_eq!(orders[1].address.region(), "NY");
    }

    #[tokio::test]
    async fn test_snapshot_without_brand_keeps_everything() {
        let source = Canned {
            products: vec![product("p_1", "b_1", 4), product("p_2", "b_2", 1)],
            orders: vec![],
        };

        let (catalog, orders) = load_snapshot(&source, None).await.unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_order_fails_the_load() {
        let mut broken = order("bo_9", "NEW");
        broken["created_at"] = json!("yesterday");
        let source = Canned {
            products: vec![product("p_1", "b_1", 4)],
            orders: vec![broken],
        };

        let err = load_snapshot(&source, None).await.unwrap_err();

        match err {
            AppError::Decode { resource, id, .. } => {
                assert_eq!(resource, "order");
                assert_eq!(id, "bo_9");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
