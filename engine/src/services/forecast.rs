//! Forecast orchestration over per-region sales matrices
//!
//! A group needs at least two options to be forecast jointly. Model failures
//! only remove that group from the report; they never stop a run.

use std::fmt;

use indexmap::IndexMap;
use nalgebra::{DMatrix, DVector};
use shared::YearMonth;

use crate::error::{ForecastUnavailable, ModelFitError};
use crate::services::sales_series::SalesMatrix;

/// Minimum number of options a group must track
pub const MIN_VARIABLES: usize = 2;

/// Multivariate one-step-ahead forecasting capability.
///
/// Receives a `T x N` matrix of jointly evolving variables and returns one
/// prediction per variable for the month after the last row.
pub trait Forecaster {
    fn forecast_next(&self, observations: &DMatrix<f64>) -> Result<DVector<f64>, ModelFitError>;
}

/// Predicted units of one option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionPrediction {
    pub option_id: String,
    /// Rounded model output; a negative value means the model expects no sales
    pub quantity: i64,
}

/// Next-month predictions of one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionVector {
    pub group: String,
    pub month: YearMonth,
    pub predictions: Vec<OptionPrediction>,
}

impl PredictionVector {
    pub fn quantity_of(&self, option_id: &str) -> Option<i64> {
        self.predictions
            .iter()
            .find(|prediction| prediction.option_id == option_id)
            .map(|prediction| prediction.quantity)
    }
}

/// Forecast outcome of every group, in matrix order
#[derive(Debug, Clone, Default)]
pub struct ForecastReport {
    pub outcomes: IndexMap<String, Result<PredictionVector, ForecastUnavailable>>,
}

impl ForecastReport {
    pub fn available(&self) -> impl Iterator<Item = &PredictionVector> {
        self.outcomes.values().filter_map(|outcome| outcome.as_ref().ok())
    }

    pub fn unavailable(&self) -> impl Iterator<Item = (&str, &ForecastUnavailable)> {
        self.outcomes
            .iter()
            .filter_map(|(group, outcome)| outcome.as_ref().err().map(|reason| (group.as_str(), reason)))
    }
}

/// Forecast orchestrator
pub struct ForecastOrchestrator<F> {
    forecaster: F,
}

impl<F: Forecaster> ForecastOrchestrator<F> {
    pub fn new(forecaster: F) -> Self {
        Self { forecaster }
    }

    /// Predict next month's units for every option of one group
    pub fn forecast(&self, matrix: &SalesMatrix) -> Result<PredictionVector, ForecastUnavailable> {
        if matrix.columns() < MIN_VARIABLES {
            return Err(ForecastUnavailable::InsufficientVariables {
                columns: matrix.columns(),
            });
        }

        let predicted = self.forecaster.forecast_next(&matrix.observations())?;
        if predicted.len() != matrix.columns() {
            return Err(ModelFitError::WrongWidth {
                expected: matrix.columns(),
                returned: predicted.len(),
            }
            .into());
        }
        if predicted.iter().any(|value| !value.is_finite()) {
            return Err(ModelFitError::NonFinite.into());
        }

        let predictions = matrix
            .option_ids()
            .iter()
            .zip(predicted.iter())
            .map(|(option_id, value)| OptionPrediction {
                option_id: option_id.clone(),
                quantity: value.round() as i64,
            })
            .collect();

        Ok(PredictionVector {
            group: matrix.group().to_string(),
            month: matrix.end().next(),
            predictions,
        })
    }

    /// Forecast every group, logging the ones that cannot be forecast
    pub fn forecast_all(&self, matrices: &IndexMap<String, SalesMatrix>) -> ForecastReport {
        let outcomes = matrices
            .iter()
            .map(|(group, matrix)| {
                let outcome = self.forecast(matrix);
                if let Err(reason) = &outcome {
                    tracing::warn!(group = %group, %reason, "forecast unavailable");
                }
                (group.clone(), outcome)
            })
            .collect();
        ForecastReport { outcomes }
    }
}

impl fmt::Display for ForecastReport {
    /// Groups without a forecast are left out
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for vector in self.available() {
            writeln!(f, "Region \"{}\" forecast for {}:", vector.group, vector.month)?;
            for prediction in &vector.predictions {
                writeln!(f, "  {}: {}", prediction.option_id, prediction.quantity)?;
            }
        }
        Ok(())
    }
}
