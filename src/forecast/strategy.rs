//! One-step-ahead prediction strategies.

use crate::core::{FeatureOrder, LinearModel, Observation, SeriesId, StrategyKind};
use crate::utils::dot;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Errors raised by the forecasting layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForecastError {
    #[error("model expects features {expected:?} but the window provides {found:?}; retrain required")]
    FeatureShapeMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("series {0} has no observations and no current reading")]
    EmptySeries(SeriesId),

    #[error("series {0} has observations but none with a usable AQI")]
    NoResolvableAqi(SeriesId),
}

/// Produces the next AQI from the previous one.
///
/// Implementations are deterministic: the same inputs always give the same
/// output, which keeps cached and recomputed responses identical.
pub trait ForecastStrategy {
    fn kind(&self) -> StrategyKind;

    /// Unrounded AQI predicted for `step` (1-based) given the previous AQI and
    /// the exogenous channels held constant over the horizon.
    fn predict_step(&self, step: usize, prev_aqi: f64, exogenous: &Observation) -> f64;

    /// Spread of training residuals, if the strategy has one.
    fn residual_std(&self) -> Option<f64>;
}

/// Applies a fitted [`LinearModel`].
#[derive(Debug, Clone, Copy)]
pub struct FittedLinearStrategy<'a> {
    model: &'a LinearModel,
}

impl<'a> FittedLinearStrategy<'a> {
    /// Wrap `model` for rows laid out as `live_order`.
    ///
    /// Fails if the model was trained on a different feature layout, so that
    /// coefficients are never applied to misaligned columns.
    pub fn new(model: &'a LinearModel, live_order: &FeatureOrder) -> Result<Self, ForecastError> {
        if !model.accepts(live_order) {
            let names = |o: &FeatureOrder| -> Vec<String> {
                o.features().iter().map(|f| f.to_string()).collect()
            };
            return Err(ForecastError::FeatureShapeMismatch {
                expected: names(&model.feature_order),
                found: names(live_order),
            });
        }
        Ok(Self { model })
    }

    pub fn model(&self) -> &LinearModel {
        self.model
    }
}

impl ForecastStrategy for FittedLinearStrategy<'_> {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FittedLinear
    }

    fn predict_step(&self, _step: usize, prev_aqi: f64, exogenous: &Observation) -> f64 {
        let row = self.model.feature_order.row(prev_aqi, exogenous);
        let raw = dot(&row, &self.model.coefficients);
        self.model.target.integrate(prev_aqi, raw)
    }

    fn residual_std(&self) -> Option<f64> {
        self.model.residual_std
    }
}

/// Zero-drift random walk with a small reproducible perturbation.
///
/// Used when no model could be fit. The perturbation at each step is drawn
/// uniformly from `[-jitter, jitter)` by a [`StdRng`] seeded from the series id
/// and the step, so `jitter = 0` is a pure persistence forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaiveDriftStrategy {
    seed: u64,
    jitter: f64,
}

impl NaiveDriftStrategy {
    pub fn new(series_id: &SeriesId, jitter: f64) -> Self {
        Self {
            seed: fnv1a(series_id.as_str()),
            jitter,
        }
    }

    /// Uniform draw in `[-1, 1)` for `step`.
    fn draw(&self, step: usize) -> f64 {
        let step_seed = (step as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        let mut rng = StdRng::seed_from_u64(self.seed ^ step_seed);
        rng.gen_range(-1.0..1.0)
    }
}

impl ForecastStrategy for NaiveDriftStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::NaiveDrift
    }

    fn predict_step(&self, step: usize, prev_aqi: f64, _exogenous: &Observation) -> f64 {
        if self.jitter == 0.0 {
            return prev_aqi;
        }
        prev_aqi + self.jitter * self.draw(step)
    }

    fn residual_std(&self) -> Option<f64> {
        None
    }
}

/// 64-bit FNV-1a hash, stable across platforms and releases.
fn fnv1a(s: &str) -> u64 {
    s.bytes().fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
        (h ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}
