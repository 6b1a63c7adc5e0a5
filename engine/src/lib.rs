//! Wholesale order fulfillment and sales-forecasting pipeline
//!
//! One run fetches the catalog and order feed, reconciles NEW orders against
//! stock, reports order metrics and forecasts next-month demand per region.

pub mod config;
pub mod error;
pub mod external;
pub mod services;

pub use config::{Config, LogFormat};
pub use error::{AppError, AppResult};
