//! Outbound requests produced by the fulfillment engine

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Kind of side effect a request has on the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Accept,
    Backorder,
    InventoryUpdate,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Accept => "accept",
            RequestKind::Backorder => "backorder",
            RequestKind::InventoryUpdate => "inventory_update",
        }
    }
}

/// New stock level for one SKU
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryLevel {
    pub sku: String,
    pub current_quantity: u32,
    pub discontinued: bool,
}

/// Availability reported for one item of a backordered order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackorderedItem {
    pub item_id: String,
    pub available_quantity: u32,
    pub discontinued: bool,
}

/// A request sent to the marketplace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketplaceRequest {
    /// Batched stock levels, one entry per SKU
    InventoryUpdate { levels: Vec<InventoryLevel> },
    /// Per-item availability for an order that cannot ship
    Backorder {
        order_id: String,
        items: Vec<BackorderedItem>,
    },
    /// Move an order to PROCESSING
    Accept { order_id: String },
}

impl MarketplaceRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            MarketplaceRequest::InventoryUpdate { .. } => RequestKind::InventoryUpdate,
            MarketplaceRequest::Backorder { .. } => RequestKind::Backorder,
            MarketplaceRequest::Accept { .. } => RequestKind::Accept,
        }
    }

    /// Order the request targets, if any
    pub fn order_id(&self) -> Option<&str> {
        match self {
            MarketplaceRequest::InventoryUpdate { .. } => None,
            MarketplaceRequest::Backorder { order_id, .. }
            | MarketplaceRequest::Accept { order_id } => Some(order_id),
        }
    }

    /// Path below the API root
    pub fn path(&self) -> String {
        match self {
            MarketplaceRequest::InventoryUpdate { .. } => "/products/options/inventory-levels".to_string(),
            MarketplaceRequest::Backorder { order_id, .. } => {
                format!("/orders/{}/items/availability", order_id)
            }
            MarketplaceRequest::Accept { order_id } => format!("/orders/{}/processing", order_id),
        }
    }

    /// JSON body of the request
    pub fn payload(&self) -> Value {
        match self {
            MarketplaceRequest::InventoryUpdate { levels } => json!({ "inventories": levels }),
            MarketplaceRequest::Backorder { items, .. } => {
                let body: Map<String, Value> = items
                    .iter()
                    .map(|item| {
                        (
                            item.item_id.clone(),
                            json!({
                                "available_quantity": item.available_quantity,
                                "discontinued": item.discontinued,
                            }),
                        )
                    })
                    .collect();
                Value::Object(body)
            }
            MarketplaceRequest::Accept { .. } => json!({}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_update_payload() {
        let request = MarketplaceRequest::InventoryUpdate {
            levels: vec![InventoryLevel {
                sku: "SKU-1".into(),
                current_quantity: 7,
                discontinued: false,
            }],
        };
        assert_eq!(request.kind(), RequestKind::InventoryUpdate);
        assert_eq!(request.path(), "/products/options/inventory-levels");
        assert_eq!(
            request.payload(),
            json!({"inventories": [{"sku": "SKU-1", "current_quantity": 7, "discontinued": false}]})
        );
        assert_eq!(request.order_id(), None);
    }

    #[test]
    fn test_backorder_payload_keyed_by_item() {
        let request = MarketplaceRequest::Backorder {
            order_id: "bo_1".into(),
            items: vec![BackorderedItem {
                item_id: "oi_1".into(),
                available_quantity: 3,
                discontinued: false,
            }],
        };
        assert_eq!(request.path(), "/orders/bo_1/items/availability");
        assert_eq!(
            request.payload(),
            json!({"oi_1": {"available_quantity": 3, "discontinued": false}})
        );
    }

    #[test]
    fn test_accept_path() {
        let request = MarketplaceRequest::Accept { order_id: "bo_9".into() };
        assert_eq!(request.path(), "/orders/bo_9/processing");
        assert_eq!(request.order_id(), Some("bo_9"));
        assert_eq!(request.kind().as_str(), "accept");
    }
}
