//! Pipeline services: fulfillment, metrics, sales series and forecasting

pub mod forecast;
pub mod fulfillment;
pub mod metrics;
pub mod sales_series;
pub mod var_model;

pub use forecast::{ForecastOrchestrator, ForecastReport, Forecaster, PredictionVector};
pub use fulfillment::{FulfillmentAborted, FulfillmentEngine, FulfillmentRun, UnresolvedItemPolicy};
pub use metrics::{MetricsAggregator, MetricsReport};
pub use sales_series::{SalesMatrix, SalesSeriesBuilder};
pub use var_model::VarModel;
