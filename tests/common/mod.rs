//! Common test utilities and data generators.
#![allow(dead_code)]

use aqi_forecast::core::{Observation, SeriesId};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Start of every generated series.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

pub fn series_id() -> SeriesId {
    SeriesId::from_city("Test City")
}

/// The hourly AQI change the generated series follow exactly.
pub fn true_delta(pm25: f64, pm10: f64, no2: f64, co: f64) -> f64 {
    pm25 - pm10 - no2 + 2.0 * co + 3.0
}

/// Coefficients over `[prev_aqi, pm25, pm10, no2, co, intercept]` matching
/// [`true_delta`].
pub const TRUE_COEFFICIENTS: [f64; 6] = [0.0, 1.0, -1.0, -1.0, 2.0, 3.0];

/// Hourly observations with only an AQI, no pollutant channels.
pub fn hourly_aqi(aqis: &[i64]) -> Vec<Observation> {
    aqis.iter()
        .enumerate()
        .map(|(i, &aqi)| Observation::new(t0() + Duration::hours(i as i64), Some(aqi)))
        .collect()
}

/// The observation one hour after `prev` whose AQI follows [`true_delta`].
pub fn successor(prev: &Observation, pm25: f64, pm10: f64, no2: f64, co: f64) -> Observation {
    let prev_aqi = prev.aqi.unwrap_or(0);
    let aqi = prev_aqi + true_delta(pm25, pm10, no2, co) as i64;
    Observation::new(prev.timestamp + Duration::hours(1), Some(aqi)).with_pollutants(pm25, pm10, no2, co)
}

/// Generate `n` hourly observations whose AQI evolves exactly by
/// [`true_delta`] over integer pollutant readings.
pub fn generate_linear_history(n: usize, start_aqi: i64, seed: u64) -> Vec<Observation> {
    // Simple deterministic "random" for reproducibility
    let mut rng_state = seed;
    let mut next_int = |lo: i64, hi: i64| -> f64 {
        rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let span = (hi - lo + 1) as u64;
        (lo + ((rng_state >> 33) % span) as i64) as f64
    };

    let mut history = Vec::with_capacity(n);
    if n == 0 {
        return history;
    }
    history.push(
        Observation::new(t0(), Some(start_aqi)).with_pollutants(
            next_int(10, 30),
            next_int(10, 20),
            next_int(0, 5),
            next_int(0, 5),
        ),
    );
    while history.len() < n {
        let pm25 = next_int(10, 30);
        let pm10 = next_int(10, 20);
        let no2 = next_int(0, 5);
        let co = next_int(0, 5);
        let next = successor(history.last().unwrap(), pm25, pm10, no2, co);
        history.push(next);
    }
    history
}

/// Approximate equality check for floating point values.
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}
