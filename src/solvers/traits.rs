//! Core traits for regression estimators.

use faer::{Col, Mat};
use thiserror::Error;

/// Errors that can occur during regression fitting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegressionError {
    #[error("dimension mismatch: X has {x_rows} rows but y has {y_len} elements")]
    DimensionMismatch { x_rows: usize, y_len: usize },

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("matrix is singular or nearly singular")]
    SingularMatrix,
}

/// A regression estimator that can be fit to data.
///
/// Fitting returns a separate fitted model that can then make predictions.
pub trait Regressor {
    /// The type of the fitted model.
    type Fitted: FittedRegressor;

    /// Fit the model to the data.
    ///
    /// # Arguments
    /// * `x` - Design matrix of shape (n_samples, n_features)
    /// * `y` - Target vector of length n_samples
    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError>;
}

/// A fitted regression model that can make predictions.
pub trait FittedRegressor {
    /// Predicted values for each row of `x`.
    fn predict(&self, x: &Mat<f64>) -> Col<f64>;

    /// Fitted coefficients, one per column of the design matrix.
    fn coefficients(&self) -> &Col<f64>;

    /// Calculate the score (R²) on new data.
    fn score(&self, x: &Mat<f64>, y: &Col<f64>) -> f64 {
        let predictions = self.predict(x);
        let n = y.nrows();
        if n == 0 {
            return f64::NAN;
        }

        let y_mean: f64 = (0..n).map(|i| y[i]).sum::<f64>() / n as f64;
        let tss: f64 = (0..n).map(|i| (y[i] - y_mean).powi(2)).sum();
        let rss: f64 = (0..n).map(|i| (y[i] - predictions[i]).powi(2)).sum();

        if tss == 0.0 {
            // Perfect prediction of constant target
            if rss == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - rss / tss
        }
    }
}
