//! Error handling for the wholesale pipeline
//!
//! `AppError` covers failures that can stop a run; the forecasting and
//! metrics errors are recovered locally by omitting a single result.

use shared::OrderStateError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Data errors
    #[error("Data inconsistency: {0}")]
    DataInconsistency(String),

    #[error("Failed to decode {resource} record {id}: {message}")]
    Decode {
        resource: &'static str,
        id: String,
        message: String,
    },

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(#[from] OrderStateError),

    // External service errors
    #[error("Marketplace request failed: {0}")]
    RequestFailure(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

}

impl AppError {
    /// Stable code used in log lines
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DataInconsistency(_) => "DATA_INCONSISTENCY",
            AppError::Decode { .. } => "DECODE_ERROR",
            AppError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            AppError::RequestFailure(_) => "REQUEST_FAILURE",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    pub(crate) fn decode(resource: &'static str, id: &str, message: impl Into<String>) -> Self {
        AppError::Decode {
            resource,
            id: id.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for pipeline operations
pub type AppResult<T> = Result<T, AppError>;

/// A metric had no qualifying entities
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("No data for metric '{metric}'")]
pub struct EmptyAggregate {
    pub metric: &'static str,
}

/// Why a group has no forecast
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForecastUnavailable {
    #[error("Group tracks {columns} option(s); at least 2 are required")]
    InsufficientVariables { columns: usize },

    #[error("Model fit failed: {0}")]
    ModelFitFailed(#[from] ModelFitError),
}

/// Failures raised by a forecasting model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelFitError {
    #[error("Series has no observations")]
    EmptySeries,

    #[error("Not enough observations: {observations} available, {required} required")]
    InsufficientObservations { observations: usize, required: usize },

    #[error("Design matrix is singular")]
    SingularDesign,

    #[error("Non-finite value encountered")]
    NonFinite,

    #[error("Model returned {returned} predictions for {expected} variables")]
    WrongWidth { expected: usize, returned: usize },
}
