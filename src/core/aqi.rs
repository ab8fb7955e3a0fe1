//! AQI derivation from pollutant concentrations (US EPA breakpoints).

use serde::{Deserialize, Serialize};

/// One row of an EPA breakpoint table: concentration range → index range.
#[derive(Debug, Clone, Copy)]
struct Breakpoint {
    c_low: f64,
    c_high: f64,
    i_low: f64,
    i_high: f64,
}

const fn bp(c_low: f64, c_high: f64, i_low: f64, i_high: f64) -> Breakpoint {
    Breakpoint {
        c_low,
        c_high,
        i_low,
        i_high,
    }
}

/// PM2.5 breakpoints, µg/m³.
const PM25_BREAKPOINTS: [Breakpoint; 7] = [
    bp(0.0, 12.0, 0.0, 50.0),
    bp(12.1, 35.4, 51.0, 100.0),
    bp(35.5, 55.4, 101.0, 150.0),
    bp(55.5, 150.4, 151.0, 200.0),
    bp(150.5, 250.4, 201.0, 300.0),
    bp(250.5, 350.4, 301.0, 400.0),
    bp(350.5, 500.4, 401.0, 500.0),
];

/// PM10 breakpoints, µg/m³.
const PM10_BREAKPOINTS: [Breakpoint; 7] = [
    bp(0.0, 54.0, 0.0, 50.0),
    bp(55.0, 154.0, 51.0, 100.0),
    bp(155.0, 254.0, 101.0, 150.0),
    bp(255.0, 354.0, 151.0, 200.0),
    bp(355.0, 424.0, 201.0, 300.0),
    bp(425.0, 504.0, 301.0, 400.0),
    bp(505.0, 604.0, 401.0, 500.0),
];

/// Index for `concentration`, truncated to `1 / resolution` as the tables are.
///
/// Negative readings count as zero; values past the last row scale by
/// `overflow_factor`.
fn interpolate(
    table: &[Breakpoint],
    concentration: f64,
    resolution: f64,
    overflow_factor: f64,
) -> i64 {
    let c = (concentration.max(0.0) * resolution + 1e-9).floor() / resolution;
    table
        .iter()
        .find(|b| c >= b.c_low && c <= b.c_high)
        .map(|b| {
            ((b.i_high - b.i_low) / (b.c_high - b.c_low) * (c - b.c_low) + b.i_low).round() as i64
        })
        .unwrap_or_else(|| (c * overflow_factor).round() as i64)
}

/// Sub-index for a PM2.5 concentration.
pub fn aqi_from_pm25(pm25: f64) -> i64 {
    interpolate(&PM25_BREAKPOINTS, pm25, 10.0, 2.0)
}

/// Sub-index for a PM10 concentration.
pub fn aqi_from_pm10(pm10: f64) -> i64 {
    interpolate(&PM10_BREAKPOINTS, pm10, 1.0, 1.5)
}

/// Overall AQI as the maximum of the available particulate sub-indices.
///
/// Returns `None` when neither concentration is known.
pub fn aqi_from_pollutants(pm25: Option<f64>, pm10: Option<f64>) -> Option<i64> {
    let a = pm25.filter(|v| v.is_finite()).map(aqi_from_pm25);
    let b = pm10.filter(|v| v.is_finite()).map(aqi_from_pm10);
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// Health category for an AQI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// Classify an AQI value.
    pub fn from_aqi(aqi: i64) -> Self {
        match aqi {
            i64::MIN..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthyForSensitive,
            151..=200 => Self::Unhealthy,
            201..=300 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitive => "Unhealthy (Sensitive)",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}
