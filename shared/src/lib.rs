//! Shared types and models for the wholesale fulfillment pipeline
//!
//! This crate contains the catalog, order and sale models plus the
//! calendar types shared by the fulfillment engine and the forecasting
//! services.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
