//! Configuration management for the wholesale pipeline
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with WFP_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::YearMonth;

use crate::error::{AppError, AppResult};
use crate::services::fulfillment::UnresolvedItemPolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Marketplace API configuration
    pub api: ApiConfig,

    /// Only products of this brand enter the catalog
    pub brand_id: Option<String>,

    /// Record outbound requests instead of sending them
    pub dry_run: bool,

    /// Diagnostic output format
    pub log_format: LogFormat,

    pub fulfillment: FulfillmentConfig,

    #[serde(default)]
    pub forecast: ForecastConfig,
}

/// Format of the diagnostics written to stderr
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// URL scheme (http, https)
    pub scheme: String,

    /// Marketplace host
    pub host: String,

    /// Access token sent with every request
    pub key: String,

    /// Records requested per page
    pub page_limit: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FulfillmentConfig {
    /// What to do with order items whose option is not in the catalog
    pub unresolved_item_policy: UnresolvedItemPolicy,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ForecastConfig {
    /// Last month of every sales series, `YYYY-MM`; defaults to the current month
    pub as_of: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("WFP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("api.scheme", "http")?
            .set_default("api.host", "www.faire-stage.com")?
            .set_default("api.page_limit", 50)?
            .set_default("dry_run", false)?
            .set_default("log_format", "text")?
            .set_default("fulfillment.unresolved_item_policy", "skip_item")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (WFP_ prefix, __ between sections)
            .add_source(
                Environment::with_prefix("WFP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl ApiConfig {
    /// Root of the versioned REST API
    pub fn base_url(&self) -> String {
        format!("{}://{}/api/v1", self.scheme, self.host)
    }
}

impl ForecastConfig {
    /// Resolve the series end month, falling back to `today`
    pub fn as_of(&self, today: YearMonth) -> AppResult<YearMonth> {
        match &self.as_of {
            Some(value) => value
                .parse()
                .map_err(|e| AppError::Configuration(format!("forecast.as_of: {}", e))),
            None => Ok(today),
        }
    }
}
