//! First-order vector autoregression fitted by least squares
//!
//! Each variable at month `t` is regressed on an intercept and every
//! variable at month `t - 1`. The one-step-ahead forecast applies the fitted
//! coefficients to the last observed month.

use nalgebra::{DMatrix, DVector};

use crate::error::ModelFitError;
use crate::services::forecast::Forecaster;

/// Singular values below this share of the largest one count as zero
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// VAR(1) model with intercept
#[derive(Debug, Clone, Copy, Default)]
pub struct VarModel;

impl VarModel {
    pub fn new() -> Self {
        Self
    }

    /// Fit the coefficient matrix, `(n + 1) x n` with the intercept in row 0
    pub fn fit(&self, observations: &DMatrix<f64>) -> Result<DMatrix<f64>, ModelFitError> {
        validate(observations)?;
        let (rows, width) = observations.shape();
        let regressors = width + 1;
        let samples = rows - 1;
        if samples < regressors {
            return Err(ModelFitError::InsufficientObservations {
                observations: samples,
                required: regressors,
            });
        }

        // design row t is [1, y(t)], its target y(t + 1)
        let design = DMatrix::from_fn(samples, regressors, |t, j| {
            if j == 0 {
                1.0
            } else {
                observations[(t, j - 1)]
            }
        });
        let targets = observations.rows(1, samples).into_owned();

        let svd = design.svd(true, true);
        let tolerance = SINGULAR_TOLERANCE * svd.singular_values.max().max(1.0);
        if svd.rank(tolerance) < regressors {
            return Err(ModelFitError::SingularDesign);
        }
        svd.solve(&targets, tolerance)
            .map_err(|_| ModelFitError::SingularDesign)
    }
}

impl Forecaster for VarModel {
    fn forecast_next(&self, observations: &DMatrix<f64>) -> Result<DVector<f64>, ModelFitError> {
        let coefficients = self.fit(observations)?;
        let last = observations.row(observations.nrows() - 1);
        let regressors = DVector::from_iterator(
            coefficients.nrows(),
            std::iter::once(1.0).chain(last.iter().copied()),
        );

        let forecast = coefficients.transpose() * regressors;
        if forecast.iter().any(|value| !value.is_finite()) {
            return Err(ModelFitError::NonFinite);
        }
        Ok(forecast)
    }
}

fn validate(observations: &DMatrix<f64>) -> Result<(), ModelFitError> {
    if observations.is_empty() {
        return Err(ModelFitError::EmptySeries);
    }
    if observations.iter().any(|value| !value.is_finite()) {
        return Err(ModelFitError::NonFinite);
    }
    Ok(())
}
