//! Training diagnostics: residual spread and accuracy metrics.
//!
//! - **Residual std**: sample standard deviation of in-sample residuals, the
//!   input to the forecast uncertainty bands
//! - **RMSE / MAPE**: goodness of fit reported with every forecast

mod residuals;

pub use residuals::{mape, residual_std, residuals, rmse, round2};
