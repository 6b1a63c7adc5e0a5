//! Catalog snapshot models

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A sellable variant of a product, the unit of inventory tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub id: String,
    pub product_id: String,
    pub name: String,
    /// Options without a SKU never take part in inventory-level updates
    pub sku: Option<String>,
    /// Missing in the feed means zero
    pub available_quantity: u32,
    pub active: bool,
    pub backordered_until: Option<NaiveDateTime>,
}

impl ProductOption {
    pub fn new(
        id: impl Into<String>,
        product_id: impl Into<String>,
        sku: Option<&str>,
        available_quantity: u32,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            product_id: product_id.into(),
            sku: sku.map(str::to_string),
            available_quantity,
            active: true,
            backordered_until: None,
        }
    }
}

/// A product and its options.
///
/// Options are owned by the product and joined back to it through
/// [`ProductOption::product_id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub wholesale_price_cents: i64,
    pub retail_price_cents: i64,
    pub active: bool,
    pub unit_multiplier: u32,
    pub options: IndexMap<String, ProductOption>,
}

impl Product {
    pub fn new(id: impl Into<String>, brand_id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            brand_id: brand_id.into(),
            wholesale_price_cents: 0,
            retail_price_cents: 0,
            active: true,
            unit_multiplier: 1,
            options: IndexMap::new(),
        }
    }

    /// Builder-style helper to attach an option
    pub fn with_option(mut self, option: ProductOption) -> Self {
        self.options.insert(option.id.clone(), option);
        self
    }
}

/// In-memory view of the catalog for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    products: IndexMap<String, Product>,
}

impl Catalog {
    /// Build a catalog, keeping only products of `brand_id` when given
    pub fn from_products(products: impl IntoIterator<Item = Product>, brand_id: Option<&str>) -> Self {
        let products = products
            .into_iter()
            .filter(|product| brand_id.map_or(true, |brand| product.brand_id == brand))
            .map(|product| (product.id.clone(), product))
            .collect();
        Self { products }
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Resolve an option through its owning product
    pub fn option(&self, product_id: &str, option_id: &str) -> Option<&ProductOption> {
        self.products.get(product_id)?.options.get(option_id)
    }

    pub fn option_mut(&mut self, product_id: &str, option_id: &str) -> Option<&mut ProductOption> {
        self.products.get_mut(product_id)?.options.get_mut(option_id)
    }

    /// Look an option up by its id alone, scanning every product
    pub fn find_option(&self, option_id: &str) -> Option<&ProductOption> {
        self.options().find(|option| option.id == option_id)
    }

    pub fn options(&self) -> impl Iterator<Item = &ProductOption> {
        self.products.values().flat_map(|product| product.options.values())
    }
}
