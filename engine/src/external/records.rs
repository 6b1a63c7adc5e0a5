//! Marketplace JSON records and their conversion into domain models
//!
//! Records mirror the wire format; conversion validates them once and
//! resolves every optional field to its default.

use serde::Deserialize;
use shared::{
    normalize_sku, parse_marketplace_timestamp, parse_optional_timestamp, validate_available_quantity,
    validate_item_quantity, validate_price_cents, validate_region_code, Address, Order, OrderItem, OrderState, Product,
    ProductOption,
};

use crate::error::{AppError, AppResult};

/// Product as returned by `GET /products`
#[derive(Debug, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub wholesale_price_cents: i64,
    pub retail_price_cents: i64,
    pub active: bool,
    #[serde(default = "default_unit_multiplier")]
    pub unit_multiplier: u32,
    #[serde(default)]
    pub options: Vec<OptionRecord>,
}

fn default_unit_multiplier() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct OptionRecord {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub active: bool,
    pub sku: Option<String>,
    pub available_quantity: Option<i64>,
    pub backordered_until: Option<String>,
}

/// Order as returned by `GET /orders`
#[derive(Debug, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub state: String,
    pub created_at: String,
    pub ship_after: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRecord>,
    pub address: AddressRecord,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRecord {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub product_option_id: String,
    pub quantity: i64,
    pub sku: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_option_name: String,
    #[serde(default)]
    pub includes_tester: bool,
    pub tester_price_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddressRecord {
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
    #[serde(default)]
    pub company_name: String,
}

impl TryFrom<OptionRecord> for ProductOption {
    type Error = AppError;

    fn try_from(record: OptionRecord) -> AppResult<Self> {
        let available_quantity = validate_available_quantity(record.available_quantity)
            .map_err(|e| AppError::decode("product option", &record.id, e))?;
        let backordered_until = parse_optional_timestamp(record.backordered_until.as_deref())
            .map_err(|e| AppError::decode("product option", &record.id, e))?;

        Ok(ProductOption {
            id: record.id,
            product_id: record.product_id,
            name: record.name,
            sku: normalize_sku(record.sku),
            available_quantity,
            active: record.active,
            backordered_until,
        })
    }
}

impl TryFrom<ProductRecord> for Product {
    type Error = AppError;

    fn try_from(record: ProductRecord) -> AppResult<Self> {
        let wholesale_price_cents = validate_price_cents(record.wholesale_price_cents)
            .map_err(|e| AppError::decode("product", &record.id, e))?;
        let retail_price_cents = validate_price_cents(record.retail_price_cents)
            .map_err(|e| AppError::decode("product", &record.id, e))?;

        let mut product = Product::new(record.id, record.brand_id);
        product.name = record.name;
        product.wholesale_price_cents = wholesale_price_cents;
        product.retail_price_cents = retail_price_cents;
        product.active = record.active;
        product.unit_multiplier = record.unit_multiplier;
        for option in record.options {
            let option = ProductOption::try_from(option)?;
            if product.options.insert(option.id.clone(), option).is_some() {
                return Err(AppError::decode("product", &product.id, "duplicate option id"));
            }
        }
        Ok(product)
    }
}

impl TryFrom<OrderItemRecord> for OrderItem {
    type Error = AppError;

    fn try_from(record: OrderItemRecord) -> AppResult<Self> {
        let quantity = validate_item_quantity(record.quantity)
            .map_err(|e| AppError::decode("order item", &record.id, e))?;
        let price_cents = validate_price_cents(record.price_cents)
            .map_err(|e| AppError::decode("order item", &record.id, e))?;

        Ok(OrderItem {
            id: record.id,
            order_id: record.order_id,
            product_id: record.product_id,
            product_option_id: record.product_option_id,
            quantity,
            sku: normalize_sku(record.sku),
            price_cents,
            product_name: record.product_name,
            product_option_name: record.product_option_name,
            includes_tester: record.includes_tester,
            tester_price_cents: record.tester_price_cents,
        })
    }
}

impl From<AddressRecord> for Address {
    fn from(record: AddressRecord) -> Self {
        Address {
            name: record.name,
            address1: record.address1,
            address2: record.address2,
            postal_code: record.postal_code,
            city: record.city,
            state: record.state,
            state_code: record.state_code,
            phone_number: record.phone_number,
            country: record.country,
            country_code: record.country_code,
            company_name: record.company_name,
        }
    }
}

impl TryFrom<OrderRecord> for Order {
    type Error = AppError;

    fn try_from(record: OrderRecord) -> AppResult<Self> {
        let state: OrderState = record
            .state
            .parse()
            .map_err(|e: shared::OrderStateError| AppError::decode("order", &record.id, e.to_string()))?;
        let created_at = parse_marketplace_timestamp(&record.created_at)
            .map_err(|e| AppError::decode("order", &record.id, e))?;
        let ship_after = parse_optional_timestamp(record.ship_after.as_deref())
            .map_err(|e| AppError::decode("order", &record.id, e))?;
        validate_region_code(&record.address.state_code)
            .map_err(|e| AppError::decode("order", &record.id, e))?;

        let mut order = Order::new(record.id, state, created_at, record.address.into());
        order.ship_after = ship_after;
        for item in record.items {
            let item = OrderItem::try_from(item)?;
            if order.items.insert(item.id.clone(), item).is_some() {
                return Err(AppError::decode("order", &order.id, "duplicate item id"));
            }
        }
        Ok(order)
    }
}

/// Decode raw JSON values into records, then into models
pub fn decode_all<R, M>(resource: &'static str, values: Vec<serde_json::Value>) -> AppResult<Vec<M>>
where
    R: for<'de> Deserialize<'de>,
    M: TryFrom<R, Error = AppError>,
{
    values
        .into_iter()
        .map(|value| {
            let id = value
                .get("id")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("<unknown>")
                .to_string();
            let record: R = serde_json::from_value(value)
                .map_err(|e| AppError::decode(resource, &id, e.to_string()))?;
            M::try_from(record)
        })
        .collect()
}
