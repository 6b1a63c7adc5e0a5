//! Fixtures shared by the integration tests

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use shared::{Address, Catalog, Order, OrderItem, OrderState, Product, ProductOption};

pub fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

/// One product per option, each option with a SKU derived from its id
pub fn catalog(stock: &[(&str, u32)]) -> Catalog {
    let products = stock.iter().map(|(option_id, quantity)| {
        let product_id = product_of(option_id);
        let sku = format!("SKU-{}", option_id);
        Product::new(product_id.clone(), "b_1").with_option(ProductOption::new(
            *option_id,
            product_id,
            Some(sku.as_str()),
            *quantity,
        ))
    });
    Catalog::from_products(products, None)
}

pub fn product_of(option_id: &str) -> String {
    format!("p_{}", option_id)
}

/// Order whose items are `(option_id, quantity, price_cents)`
pub fn order(
    id: &str,
    state: OrderState,
    created_at: NaiveDateTime,
    region: &str,
    items: &[(&str, u32, i64)],
) -> Order {
    let mut order = Order::new(id, state, created_at, Address::in_state(region, region));
    for (index, (option_id, quantity, price_cents)) in items.iter().enumerate() {
        order = order.with_item(OrderItem::new(
            format!("{}_oi_{}", id, index + 1),
            id,
            product_of(option_id),
            *option_id,
            *quantity,
            *price_cents,
        ));
    }
    order
}

pub fn stock(catalog: &Catalog, option_id: &str) -> u32 {
    catalog
        .option(&product_of(option_id), option_id)
        .map(|option| option.available_quantity)
        .unwrap()
}

pub fn state_of(orders: &[Order], id: &str) -> OrderState {
    orders.iter().find(|order| order.id == id).unwrap().state
}
