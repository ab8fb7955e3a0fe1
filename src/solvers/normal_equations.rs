//! Closed-form least squares via the normal equations.

use crate::solvers::traits::{FittedRegressor, RegressionError, Regressor};
use crate::utils::{gauss_jordan_inverse, mat_mul, mat_vec_mul, transpose};
use faer::{Col, Mat};

/// Least-squares estimator solving `β = (XᵀX)⁻¹ Xᵀy`.
///
/// The design matrix is used as given: include a column of ones to fit an
/// intercept. The Gram matrix is inverted with Gauss-Jordan elimination, and a
/// rank-deficient design (for instance a feature that is constant zero over
/// the window) is reported as [`RegressionError::SingularMatrix`].
///
/// # Example
///
/// ```rust,ignore
/// use aqi_forecast::solvers::{FittedRegressor, NormalEquationsRegressor, Regressor};
/// use faer::{Col, Mat};
///
/// let x = Mat::from_fn(5, 2, |i, j| if j == 0 { i as f64 } else { 1.0 });
/// let y = Col::from_fn(5, |i| 2.0 + 3.0 * i as f64);
///
/// let fitted = NormalEquationsRegressor::new().fit(&x, &y)?;
/// println!("Coefficients: {:?}", fitted.coefficients());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalEquationsRegressor;

impl NormalEquationsRegressor {
    pub fn new() -> Self {
        Self
    }
}

impl Regressor for NormalEquationsRegressor {
    type Fitted = FittedNormalEquations;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        if x.nrows() != y.nrows() {
            return Err(RegressionError::DimensionMismatch {
                x_rows: x.nrows(),
                y_len: y.nrows(),
            });
        }
        if x.nrows() == 0 {
            return Err(RegressionError::InsufficientObservations {
                needed: 1,
                got: 0,
            });
        }

        let xt = transpose(x);
        let gram = mat_mul(&xt, x);
        let gram_inverse = gauss_jordan_inverse(&gram).ok_or(RegressionError::SingularMatrix)?;
        let xty = mat_vec_mul(&xt, y);
        let coefficients = mat_vec_mul(&gram_inverse, &xty);

        Ok(FittedNormalEquations {
            coefficients,
            gram_inverse,
        })
    }
}

/// A fitted normal-equations model.
#[derive(Debug, Clone)]
pub struct FittedNormalEquations {
    coefficients: Col<f64>,
    /// (XᵀX)⁻¹ from the fit.
    gram_inverse: Mat<f64>,
}

impl FittedNormalEquations {
    pub fn gram_inverse(&self) -> &Mat<f64> {
        &self.gram_inverse
    }

    /// Coefficients as a plain vector.
    pub fn coefficients_vec(&self) -> Vec<f64> {
        (0..self.coefficients.nrows())
            .map(|i| self.coefficients[i])
            .collect()
    }
}

impl FittedRegressor for FittedNormalEquations {
    fn predict(&self, x: &Mat<f64>) -> Col<f64> {
        mat_vec_mul(x, &self.coefficients)
    }

    fn coefficients(&self) -> &Col<f64> {
        &self.coefficients
    }
}
