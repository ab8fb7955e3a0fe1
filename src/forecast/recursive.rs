//! Autoregressive multi-step forecasting.

use crate::core::{ForecastPoint, Observation};
use crate::forecast::strategy::ForecastStrategy;
use crate::inference::BandPolicy;
use chrono::{DateTime, Duration, Utc};

/// The reading a forecast starts from (point 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub timestamp: DateTime<Utc>,
    pub aqi: i64,
}

/// Walks a strategy forward one hour at a time.
///
/// Each step's previous-AQI input is the previous step's rounded prediction,
/// not a true lag, so the forecast is autoregressive on its own output.
/// Exogenous channels stay fixed at the last known observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecursiveForecaster {
    horizon: usize,
    bands: BandPolicy,
}

impl RecursiveForecaster {
    pub fn new(horizon: usize, bands: BandPolicy) -> Self {
        Self { horizon, bands }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Produce `horizon + 1` points: the anchor, then one banded prediction per
    /// hour. Predictions are rounded to the nearest integer and floored at 0.
    pub fn forecast(
        &self,
        strategy: &dyn ForecastStrategy,
        anchor: &Anchor,
        exogenous: &Observation,
    ) -> Vec<ForecastPoint> {
        let mut points = Vec::with_capacity(self.horizon + 1);
        points.push(ForecastPoint::observed(anchor.timestamp, anchor.aqi));

        let residual_std = strategy.residual_std();
        let mut prev = anchor.aqi;
        for step in 1..=self.horizon {
            let raw = strategy.predict_step(step, prev as f64, exogenous);
            // A blown-up model degrades to persistence for this step.
            let aqi = if raw.is_finite() {
                raw.round().max(0.0) as i64
            } else {
                prev
            };
            let (low, high) = self.bands.band(aqi, residual_std);
            points.push(ForecastPoint {
                timestamp: anchor.timestamp + Duration::hours(step as i64),
                aqi,
                low,
                high,
                observed: false,
            });
            prev = aqi;
        }

        points
    }
}
