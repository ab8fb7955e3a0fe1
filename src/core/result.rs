//! Forecast response structures.

use super::observation::SeriesId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One point of a forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    /// Point estimate.
    pub aqi: i64,
    pub low: i64,
    pub high: i64,
    /// True only for point 0, the authoritative current reading.
    pub observed: bool,
}

impl ForecastPoint {
    /// An observed point: `low == high == aqi`.
    pub fn observed(timestamp: DateTime<Utc>, aqi: i64) -> Self {
        Self {
            timestamp,
            aqi,
            low: aqi,
            high: aqi,
            observed: true,
        }
    }

    /// Half of the band width, rounded.
    pub fn half_width(&self) -> i64 {
        ((self.high - self.low) as f64 / 2.0).round() as i64
    }
}

/// Goodness of fit on the training window, in AQI units.
///
/// Both fields are `None` when no model was fit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastMetrics {
    pub rmse: Option<f64>,
    /// Mean absolute percentage error, in percent.
    pub mape: Option<f64>,
}

/// Which strategy produced the predicted points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    FittedLinear,
    NaiveDrift,
}

/// A recoverable condition the pipeline worked around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Degradation {
    /// Fewer than two usable observations in the window.
    InsufficientData { rows: usize },
    /// The Gram matrix could not be inverted.
    SingularDesign,
    /// No authoritative current reading; point 0 is the last historical AQI.
    MissingObservedReading,
    /// The stored model's feature layout no longer matches the window.
    FeatureShapeMismatch,
    /// The stored model was trained for the other target mode.
    TargetModeMismatch,
}

/// A complete forecast for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub series_id: SeriesId,
    pub horizon: usize,
    /// `horizon + 1` points; point 0 is the observed reading.
    pub points: Vec<ForecastPoint>,
    pub metrics: ForecastMetrics,
    pub strategy: StrategyKind,
    pub degradations: Vec<Degradation>,
    pub generated_at: DateTime<Utc>,
    /// Set when the response was served from the cache.
    #[serde(default)]
    pub cached: bool,
}

/// Structural problems found by [`ForecastResponse::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidResponse {
    #[error("expected {expected} points, found {found}")]
    PointCount { expected: usize, found: usize },
    #[error("point 0 is not marked observed")]
    FirstPointNotObserved,
    #[error("point {0} is marked observed")]
    UnexpectedObserved(usize),
    #[error("point {index}: band [{low}, {high}] does not contain {aqi}")]
    BandOrder {
        index: usize,
        low: i64,
        aqi: i64,
        high: i64,
    },
    #[error("observed point must have low == high == aqi")]
    ObservedBand,
}

impl ForecastResponse {
    /// The observed point.
    pub fn observed_point(&self) -> Option<&ForecastPoint> {
        self.points.first()
    }

    /// True if the pipeline had to work around the given condition.
    pub fn is_degraded_by(&self, degradation: &Degradation) -> bool {
        self.degradations.contains(degradation)
    }

    /// Check the structural invariants of a response.
    pub fn validate(&self) -> Result<(), InvalidResponse> {
        if self.points.len() != self.horizon + 1 {
            return Err(InvalidResponse::PointCount {
                expected: self.horizon + 1,
                found: self.points.len(),
            });
        }
        let first = &self.points[0];
        if !first.observed {
            return Err(InvalidResponse::FirstPointNotObserved);
        }
        if first.low != first.aqi || first.high != first.aqi {
            return Err(InvalidResponse::ObservedBand);
        }
        for (index, point) in self.points.iter().enumerate().skip(1) {
            if point.observed {
                return Err(InvalidResponse::UnexpectedObserved(index));
            }
            if !(point.low <= point.aqi && point.aqi <= point.high) {
                return Err(InvalidResponse::BandOrder {
                    index,
                    low: point.low,
                    aqi: point.aqi,
                    high: point.high,
                });
            }
        }
        Ok(())
    }
}
