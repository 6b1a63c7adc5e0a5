//! Domain models for the wholesale pipeline

mod catalog;
mod order;
mod sale;

pub use catalog::*;
pub use order::*;
pub use sale::*;
