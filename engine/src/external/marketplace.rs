//! Marketplace REST client
//!
//! Fetches paginated catalog and order records and sends the fulfillment
//! engine's requests. No request is retried.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;

use super::{MarketplaceRequest, RecordSource, RequestSink, Resource};
use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};

const API_KEY_HEADER: &str = "X-FAIRE-ACCESS-TOKEN";

/// Marketplace API client
#[derive(Clone)]
pub struct MarketplaceClient {
    client: Client,
    api_key: String,
    base_url: String,
    page_limit: u32,
}

impl MarketplaceClient {
    /// Create a new MarketplaceClient from configuration
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_base_url(config.key.clone(), config.base_url(), config.page_limit)
    }

    /// Create a new MarketplaceClient with custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String, page_limit: u32) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            page_limit: page_limit.max(1),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Perform one request and decode the JSON response
    async fn request(&self, method: Method, url: &str, body: Option<&Value>) -> AppResult<Value> {
        let mut request = self
            .client
            .request(method.clone(), url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json;charset=utf-8");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::RequestFailure(format!("{} {}: {}", method, url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RequestFailure(format!(
                "{} {} returned {} - {}",
                method, url, status, body
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::RequestFailure(format!("{} {}: {}", method, url, e)))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| AppError::RequestFailure(format!("Failed to parse response of {}: {}", url, e)))
    }

    /// Fetch one page of `resource`
    async fn get_page(&self, resource: Resource, page: u32) -> AppResult<Vec<Value>> {
        let url = format!(
            "{}?limit={}&page={}",
            self.url(resource.path()),
            self.page_limit,
            page
        );
        let mut body = self.request(Method::GET, &url, None).await?;
        match body.get_mut(resource.item_key()).map(Value::take) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(AppError::RequestFailure(format!(
                "Response of {} has no '{}' array",
                url,
                resource.item_key()
            ))),
        }
    }
}

fn method_for(request: &MarketplaceRequest) -> Method {
    match request {
        MarketplaceRequest::InventoryUpdate { .. } => Method::PATCH,
        MarketplaceRequest::Backorder { .. } => Method::POST,
        MarketplaceRequest::Accept { .. } => Method::PUT,
    }
}

#[async_trait]
impl RecordSource for MarketplaceClient {
    /// Keep requesting pages while a page comes back full
    async fn fetch_all(&self, resource: Resource) -> AppResult<Vec<Value>> {
        let mut records = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.get_page(resource, page).await?;
            let full = batch.len() >= self.page_limit as usize;
            tracing::debug!(resource = resource.item_key(), page, count = batch.len(), "fetched page");
            records.extend(batch);
            if !full {
                break;
            }
            page += 1;
        }
        Ok(records)
    }
}

#[async_trait]
impl RequestSink for MarketplaceClient {
    async fn send(&mut self, request: &MarketplaceRequest) -> AppResult<()> {
        let url = self.url(&request.path());
        let payload = request.payload();
        tracing::debug!(kind = request.kind().as_str(), %url, "sending marketplace request");
        self.request(method_for(request), &url, Some(&payload)).await?;
        Ok(())
    }
}
