//! Persisted forecasting model and its feature layout.

use super::observation::{Observation, SeriesId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of the feature layout written into every persisted model.
///
/// Bump when the meaning of a [`Feature`] column changes so that models
/// written by an older layout are never applied to new rows.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// A single column of the design matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    PrevAqi,
    Pm25,
    Pm10,
    No2,
    Co,
    Temp,
    Wind,
    Humidity,
    Intercept,
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PrevAqi => "prev_aqi",
            Self::Pm25 => "pm25",
            Self::Pm10 => "pm10",
            Self::No2 => "no2",
            Self::Co => "co",
            Self::Temp => "temp",
            Self::Wind => "wind",
            Self::Humidity => "humidity",
            Self::Intercept => "intercept",
        }
    }

    /// Value of this feature for the pair `(prev_aqi, cur)`. Missing channels
    /// contribute 0.
    fn value(&self, prev_aqi: f64, cur: &Observation) -> f64 {
        match self {
            Self::PrevAqi => prev_aqi,
            Self::Pm25 => cur.pm25.unwrap_or(0.0),
            Self::Pm10 => cur.pm10.unwrap_or(0.0),
            Self::No2 => cur.no2.unwrap_or(0.0),
            Self::Co => cur.co.unwrap_or(0.0),
            Self::Temp => cur.temp.unwrap_or(0.0),
            Self::Wind => cur.wind.unwrap_or(0.0),
            Self::Humidity => cur.humidity.unwrap_or(0.0),
            Self::Intercept => 1.0,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered list of features making up one design-matrix row.
///
/// Always `[prev_aqi, pm25, pm10, no2, co, (temp), (wind), (humidity), intercept]`,
/// where each optional weather column is present only if some observation in
/// the training window carries that channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureOrder(Vec<Feature>);

impl FeatureOrder {
    /// Derive the feature layout from a training window.
    pub fn from_window(window: &[Observation]) -> Self {
        let mut features = vec![
            Feature::PrevAqi,
            Feature::Pm25,
            Feature::Pm10,
            Feature::No2,
            Feature::Co,
        ];
        let present =
            |get: fn(&Observation) -> Option<f64>| window.iter().any(|o| get(o).is_some());
        if present(|o| o.temp) {
            features.push(Feature::Temp);
        }
        if present(|o| o.wind) {
            features.push(Feature::Wind);
        }
        if present(|o| o.humidity) {
            features.push(Feature::Humidity);
        }
        features.push(Feature::Intercept);
        Self(features)
    }

    /// Build one feature row.
    pub fn row(&self, prev_aqi: f64, cur: &Observation) -> Vec<f64> {
        self.0.iter().map(|f| f.value(prev_aqi, cur)).collect()
    }

    pub fn features(&self) -> &[Feature] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Feature>> for FeatureOrder {
    fn from(features: Vec<Feature>) -> Self {
        Self(features)
    }
}

/// What the regression target was during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    /// Hour-over-hour AQI change; predictions are integrated back onto the
    /// previous AQI.
    Delta,
    /// Next-hour AQI directly.
    Absolute,
}

impl TargetMode {
    pub fn from_delta_flag(delta_mode: bool) -> Self {
        if delta_mode {
            Self::Delta
        } else {
            Self::Absolute
        }
    }

    pub fn is_delta(&self) -> bool {
        matches!(self, Self::Delta)
    }

    /// Training target for the pair `(prev, cur)`.
    pub fn target(&self, prev_aqi: f64, cur_aqi: f64) -> f64 {
        match self {
            Self::Delta => cur_aqi - prev_aqi,
            Self::Absolute => cur_aqi,
        }
    }

    /// Map a raw model output back to AQI space.
    pub fn integrate(&self, prev_aqi: f64, raw_prediction: f64) -> f64 {
        match self {
            Self::Delta => prev_aqi + raw_prediction,
            Self::Absolute => raw_prediction,
        }
    }
}

/// A fitted linear model for one series.
///
/// Immutable once fit; a retrain replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub series_id: SeriesId,
    /// One coefficient per entry of `feature_order`.
    pub coefficients: Vec<f64>,
    pub feature_order: FeatureOrder,
    pub schema_version: u32,
    pub target: TargetMode,
    pub trained_at: DateTime<Utc>,
    pub training_rows: usize,
    /// Sample standard deviation of training residuals in AQI space.
    pub residual_std: Option<f64>,
}

impl LinearModel {
    pub fn delta_mode(&self) -> bool {
        self.target.is_delta()
    }

    /// True when this model can be applied to rows laid out as `order`.
    pub fn accepts(&self, order: &FeatureOrder) -> bool {
        self.schema_version == FEATURE_SCHEMA_VERSION
            && &self.feature_order == order
            && self.coefficients.len() == order.len()
    }
}
