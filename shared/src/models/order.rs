//! Order, line item and ship-to address models

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of an order on the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    New,
    Processing,
    PreTransit,
    InTransit,
    Delivered,
    Backordered,
    Canceled,
}

/// Whether an order counts towards sales figures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleStatus {
    Sold,
    Unsold,
}

/// Errors raised by order state changes
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderStateError {
    #[error("Unknown order state: {0}")]
    Unknown(String),

    #[error("Invalid state transition for order {order_id}: {from} -> {to}")]
    InvalidTransition {
        order_id: String,
        from: OrderState,
        to: OrderState,
    },
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::New => "NEW",
            OrderState::Processing => "PROCESSING",
            OrderState::PreTransit => "PRE_TRANSIT",
            OrderState::InTransit => "IN_TRANSIT",
            OrderState::Delivered => "DELIVERED",
            OrderState::Backordered => "BACKORDERED",
            OrderState::Canceled => "CANCELED",
        }
    }

    /// An order is sold once it left acceptance and was not canceled
    pub fn classify(&self) -> SaleStatus {
        match self {
            OrderState::Processing
            | OrderState::PreTransit
            | OrderState::InTransit
            | OrderState::Delivered => SaleStatus::Sold,
            OrderState::New | OrderState::Backordered | OrderState::Canceled => SaleStatus::Unsold,
        }
    }

    pub fn is_sold(&self) -> bool {
        self.classify() == SaleStatus::Sold
    }

    /// A run may only move a NEW order to PROCESSING or BACKORDERED
    pub fn can_transition_to(&self, target: OrderState) -> bool {
        matches!(
            (self, target),
            (OrderState::New, OrderState::Processing) | (OrderState::New, OrderState::Backordered)
        )
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderState {
    type Err = OrderStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(OrderState::New),
            "PROCESSING" => Ok(OrderState::Processing),
            "PRE_TRANSIT" => Ok(OrderState::PreTransit),
            "IN_TRANSIT" => Ok(OrderState::InTransit),
            "DELIVERED" => Ok(OrderState::Delivered),
            "BACKORDERED" => Ok(OrderState::Backordered),
            "CANCELED" => Ok(OrderState::Canceled),
            other => Err(OrderStateError::Unknown(other.to_string())),
        }
    }
}

/// Ship-to address of an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub name: Option<String>,
    pub address1: String,
    pub address2: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub state: String,
    pub state_code: String,
    pub phone_number: Option<String>,
    pub country: String,
    pub country_code: String,
    pub company_name: String,
}

impl Address {
    /// Minimal address carrying only the state, used by fixtures and tests
    pub fn in_state(state: impl Into<String>, state_code: impl Into<String>) -> Self {
        Self {
            name: None,
            address1: String::new(),
            address2: None,
            postal_code: String::new(),
            city: String::new(),
            state: state.into(),
            state_code: state_code.into(),
            phone_number: None,
            country: String::new(),
            country_code: String::new(),
            company_name: String::new(),
        }
    }

    /// Grouping key for regional metrics and forecasts
    pub fn region(&self) -> &str {
        &self.state_code
    }
}

/// A line item of an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub product_option_id: String,
    pub quantity: u32,
    pub sku: Option<String>,
    pub price_cents: i64,
    pub product_name: String,
    pub product_option_name: String,
    pub includes_tester: bool,
    pub tester_price_cents: Option<i64>,
}

impl OrderItem {
    pub fn new(
        id: impl Into<String>,
        order_id: impl Into<String>,
        product_id: impl Into<String>,
        product_option_id: impl Into<String>,
        quantity: u32,
        price_cents: i64,
    ) -> Self {
        Self {
            id: id.into(),
            order_id: order_id.into(),
            product_id: product_id.into(),
            product_option_id: product_option_id.into(),
            quantity,
            sku: None,
            price_cents,
            product_name: String::new(),
            product_option_name: String::new(),
            includes_tester: false,
            tester_price_cents: None,
        }
    }

    /// `quantity * price_cents / 100`. Tester pricing is not part of the amount.
    pub fn dollar_amount(&self) -> Decimal {
        Decimal::from(self.quantity) * Decimal::new(self.price_cents, 2)
    }
}

/// An order with its items, keyed by item id in fetch order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub state: OrderState,
    pub created_at: NaiveDateTime,
    pub ship_after: Option<NaiveDateTime>,
    pub items: IndexMap<String, OrderItem>,
    pub address: Address,
}

impl Order {
    pub fn new(
        id: impl Into<String>,
        state: OrderState,
        created_at: NaiveDateTime,
        address: Address,
    ) -> Self {
        Self {
            id: id.into(),
            state,
            created_at,
            ship_after: None,
            items: IndexMap::new(),
            address,
        }
    }

    /// Builder-style helper to attach an item
    pub fn with_item(mut self, item: OrderItem) -> Self {
        self.items.insert(item.id.clone(), item);
        self
    }

    pub fn is_new(&self) -> bool {
        self.state == OrderState::New
    }

    pub fn is_sold(&self) -> bool {
        self.state.is_sold()
    }

    pub fn is_canceled(&self) -> bool {
        self.state == OrderState::Canceled
    }

    /// Move the order to `target`, refusing anything but NEW -> PROCESSING/BACKORDERED
    pub fn transition(&mut self, target: OrderState) -> Result<(), OrderStateError> {
        if !self.state.can_transition_to(target) {
            return Err(OrderStateError::InvalidTransition {
                order_id: self.id.clone(),
                from: self.state,
                to: target,
            });
        }
        self.state = target;
        Ok(())
    }

    pub fn dollar_amount(&self) -> Decimal {
        self.items.values().map(OrderItem::dollar_amount).sum()
    }

    pub fn items_quantity(&self) -> u64 {
        self.items.values().map(|item| u64::from(item.quantity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn created_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn order(state: OrderState) -> Order {
        Order::new("bo_1", state, created_at(), Address::in_state("California", "CA"))
            .with_item(OrderItem::new("oi_1", "bo_1", "p_1", "po_1", 3, 1250))
            .with_item(OrderItem::new("oi_2", "bo_1", "p_1", "po_2", 2, 99))
    }

    #[test]
    fn test_sold_classification() {
        let sold = [
            OrderState::Processing,
            OrderState::PreTransit,
            OrderState::InTransit,
            OrderState::Delivered,
        ];
        for state in sold {
            assert_eq!(state.classify(), SaleStatus::Sold, "{state}");
        }
        for state in [OrderState::New, OrderState::Backordered, OrderState::Canceled] {
            assert_eq!(state.classify(), SaleStatus::Unsold, "{state}");
        }
    }

    #[test]
    fn test_state_round_trips_through_wire_name() {
        for state in [OrderState::New, OrderState::PreTransit, OrderState::Canceled] {
            assert_eq!(state.as_str().parse::<OrderState>(), Ok(state));
        }
        assert!(matches!("SHIPPED".parse::<OrderState>(), Err(OrderStateError::Unknown(_))));
    }

    #[test]
    fn test_transition_only_from_new() {
        let mut order = order(OrderState::New);
        assert!(order.transition(OrderState::Backordered).is_ok());
        assert_eq!(order.state, OrderState::Backordered);

        let err = order.transition(OrderState::Processing).unwrap_err();
        assert!(matches!(err, OrderStateError::InvalidTransition { .. }));
        assert_eq!(order.state, OrderState::Backordered);

        let mut canceled = self::order(OrderState::Canceled);
        assert!(canceled.transition(OrderState::Processing).is_err());
    }

    #[test]
    fn test_order_totals() {
        let order = order(OrderState::Delivered);
        // 3 * 12.50 + 2 * 0.99
        assert_eq!(order.dollar_amount(), Decimal::new(3948, 2));
        assert_eq!(order.items_quantity(), 5);
    }

    #[test]
    fn test_tester_price_not_in_amount() {
        let mut item = OrderItem::new("oi_1", "bo_1", "p_1", "po_1", 2, 500);
        item.includes_tester = true;
        item.tester_price_cents = Some(300);
        assert_eq!(item.dollar_amount(), Decimal::new(1000, 2));
    }

    #[test]
    fn test_region_is_state_code() {
        let order = order(OrderState::New);
        assert_eq!(order.address.region(), "CA");
    }
}
