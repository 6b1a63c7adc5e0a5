//! Marketplace integration: record fetching, record mapping and outbound requests

pub mod dry_run;
pub mod marketplace;
pub mod records;
pub mod requests;

pub use dry_run::DryRunRequests;
pub use marketplace::MarketplaceClient;
pub use requests::{BackorderedItem, InventoryLevel, MarketplaceRequest, RequestKind};

use async_trait::async_trait;
use serde_json::Value;
use shared::{Catalog, Order, Product};

use crate::error::AppResult;
use records::{decode_all, OrderRecord, ProductRecord};

/// Paginated collections exposed by the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Products,
    Orders,
}

impl Resource {
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Products => "/products",
            Resource::Orders => "/orders",
        }
    }

    /// Key of the record array in a page response
    pub fn item_key(&self) -> &'static str {
        match self {
            Resource::Products => "products",
            Resource::Orders => "orders",
        }
    }
}

/// Source of raw marketplace records, pagination hidden
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_all(&self, resource: Resource) -> AppResult<Vec<Value>>;
}

/// Destination of the fulfillment engine's requests
#[async_trait]
pub trait RequestSink: Send {
    async fn send(&mut self, request: &MarketplaceRequest) -> AppResult<()>;
}

/// Fetch and decode the catalog and order set for one run
pub async fn load_snapshot<S>(source: &S, brand_id: Option<&str>) -> AppResult<(Catalog, Vec<Order>)>
where
    S: RecordSource + ?Sized,
{
    let products: Vec<Product> =
        decode_all::<ProductRecord, Product>("product", source.fetch_all(Resource::Products).await?)?;
    let fetched = products.len();
    let catalog = Catalog::from_products(products, brand_id);

    let orders: Vec<Order> =
        decode_all::<OrderRecord, Order>("order", source.fetch_all(Resource::Orders).await?)?;

    tracing::info!(
        products = catalog.len(),
        skipped_products = fetched - catalog.len(),
        orders = orders.len(),
        "loaded marketplace snapshot"
    );
    Ok((catalog, orders))
}
