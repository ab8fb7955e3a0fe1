//! Fits a [`LinearModel`] to a design matrix and scores it in AQI space.

use crate::core::{Degradation, ForecastMetrics, LinearModel, SeriesId, FEATURE_SCHEMA_VERSION};
use crate::diagnostics::{mape, residual_std, residuals, rmse, round2};
use crate::features::DesignMatrix;
use crate::solvers::normal_equations::NormalEquationsRegressor;
use crate::solvers::traits::{FittedRegressor, RegressionError, Regressor};
use crate::utils::{detect_constant_columns, dot};
use chrono::{DateTime, Utc};
use log::debug;

/// A freshly fit model together with its in-sample metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    pub model: LinearModel,
    pub metrics: ForecastMetrics,
}

/// In-sample fit of a model over a design matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Predictions integrated back into AQI space, one per row.
    pub predicted_aqi: Vec<f64>,
    pub residual_std: Option<f64>,
    pub metrics: ForecastMetrics,
}

/// Trains one linear model per call via the normal equations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegressionTrainer {
    regressor: NormalEquationsRegressor,
}

impl RegressionTrainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit `β = (XᵀX)⁻¹ Xᵀy` over `design`.
    ///
    /// An empty design fails with `InsufficientObservations` and a singular Gram
    /// matrix with `SingularMatrix`; callers treat both as "no model".
    pub fn train(
        &self,
        series_id: &SeriesId,
        design: &DesignMatrix,
        trained_at: DateTime<Utc>,
    ) -> Result<TrainedModel, RegressionError> {
        if design.is_empty() {
            return Err(RegressionError::InsufficientObservations {
                needed: 1,
                got: 0,
            });
        }

        let fitted = match self.regressor.fit(&design.x, &design.y) {
            Ok(fitted) => fitted,
            Err(RegressionError::SingularMatrix) => {
                let constant = detect_constant_columns(&design.x, 1e-10);
                let names: Vec<_> = design
                    .feature_order
                    .features()
                    .iter()
                    .zip(&constant)
                    .filter(|(_, c)| **c)
                    .map(|(f, _)| f.name())
                    .collect();
                debug!(
                    "{}: singular Gram matrix over {} rows (constant columns: {:?})",
                    series_id,
                    design.n_rows(),
                    names
                );
                return Err(RegressionError::SingularMatrix);
            }
            Err(e) => return Err(e),
        };

        let mut model = LinearModel {
            series_id: series_id.clone(),
            coefficients: fitted.coefficients_vec(),
            feature_order: design.feature_order.clone(),
            schema_version: FEATURE_SCHEMA_VERSION,
            target: design.target,
            trained_at,
            training_rows: design.n_rows(),
            residual_std: None,
        };

        let evaluation = evaluate(&model, design);
        model.residual_std = evaluation.residual_std;

        debug!(
            "{}: trained on {} rows, residual std {:?}, R² {:.3}",
            series_id,
            model.training_rows,
            model.residual_std,
            fitted.score(&design.x, &design.y)
        );

        Ok(TrainedModel {
            model,
            metrics: evaluation.metrics,
        })
    }
}

/// Score `model` on `design`, integrating each row's prediction into AQI
/// space before comparing it with the actual next-hour AQI.
///
/// `design` must share the model's feature layout.
pub fn evaluate(model: &LinearModel, design: &DesignMatrix) -> Evaluation {
    let predicted_aqi: Vec<f64> = (0..design.n_rows())
        .map(|i| {
            let raw = dot(&design.row(i), &model.coefficients);
            model.target.integrate(design.prev_aqi[i], raw)
        })
        .collect();

    let resid = residuals(&predicted_aqi, &design.actual_aqi);
    let metrics = ForecastMetrics {
        rmse: rmse(&predicted_aqi, &design.actual_aqi).map(round2),
        mape: mape(&predicted_aqi, &design.actual_aqi).map(round2),
    };

    Evaluation {
        predicted_aqi,
        residual_std: residual_std(&resid),
        metrics,
    }
}

/// The recoverable condition a training failure stands for.
pub fn degradation_for(error: &RegressionError, rows: usize) -> Degradation {
    match error {
        RegressionError::SingularMatrix => Degradation::SingularDesign,
        RegressionError::InsufficientObservations { .. }
        | RegressionError::DimensionMismatch { .. } => Degradation::InsufficientData { rows },
    }
}
