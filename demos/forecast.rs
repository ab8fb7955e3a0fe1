//! # Hourly AQI Forecast
//!
//! Fits a per-city linear model on a synthetic week of hourly readings and
//! forecasts the next 24 hours with uncertainty bands.
//!
//! ## Key Features
//! - Delta-mode training on pollutant readings
//! - Point 0 pinned to the current reading
//! - Response caching with a TTL
//! - Naive fallback when the window cannot be fit
//!
//! Run with: `cargo run --example forecast`

use aqi_forecast::core::AqiCategory;
use aqi_forecast::prelude::*;
use chrono::{Duration, TimeZone, Utc};

fn main() {
    println!("=== Hourly AQI Forecast ===\n");

    fitted_forecast();
    naive_fallback();
}

/// Synthetic hourly readings with a daily pollutant cycle.
fn synthetic_history(hours: usize) -> Vec<Observation> {
    let start = Utc.with_ymd_and_hms(2024, 11, 4, 0, 0, 0).unwrap();
    let mut aqi = 90_i64;
    (0..hours)
        .map(|h| {
            let phase = (h % 24) as f64 / 24.0 * std::f64::consts::TAU;
            let pm25 = (35.0 + 15.0 * phase.sin()).round();
            let pm10 = (50.0 + 10.0 * phase.cos()).round();
            let no2 = (20.0 + (h % 7) as f64).round();
            let co = ((h % 3) as f64).round();
            aqi = (aqi + (0.4 * (pm25 - 35.0) - 0.1 * (no2 - 20.0) + co - 1.0).round() as i64).max(0);
            Observation::new(start + Duration::hours(h as i64), Some(aqi))
                .with_pollutants(pm25, pm10, no2, co)
                .with_temp(12.0 + 6.0 * phase.sin())
        })
        .collect()
}

/// Fitted path with caching
fn fitted_forecast() {
    println!("--- Fitted Model ---\n");

    let options = ForecastOptions::builder()
        .horizon(24)
        .window_size(72)
        .confidence_level(0.9)
        .build()
        .expect("valid options");
    let clock = SystemClock;
    let mut service = ForecastService::new(
        options.clone(),
        MemoryResponseCache::new(clock),
        MemoryModelStore::new(),
        clock,
    );

    let mut history = synthetic_history(7 * 24);
    let current = history.pop();
    let request = ForecastRequest::builder(SeriesId::from_city("Nowa Huta"), history)
        .defaults_from(&options)
        .current_observed(current)
        .build()
        .expect("valid request");

    let response = service.forecast(&request).expect("forecast");
    println!("Series: {}", response.series_id);
    println!("Strategy: {:?}", response.strategy);
    println!("RMSE: {:?}  MAPE: {:?}", response.metrics.rmse, response.metrics.mape);
    if let Some(model) = service.model(&request.series_id).expect("model store") {
        println!("Features: {:?}", model.feature_order.features());
        println!("Residual std: {:?}", model.residual_std);
    }

    println!("\n{:<18} {:>5} {:>11}  Category", "Hour", "AQI", "Band");
    for point in &response.points {
        println!(
            "{:<18} {:>5} [{:>3}, {:>3}]  {}{}",
            point.timestamp.format("%Y-%m-%d %H:%M"),
            point.aqi,
            point.low,
            point.high,
            AqiCategory::from_aqi(point.aqi).label(),
            if point.observed { " (observed)" } else { "" }
        );
    }

    let again = service.forecast(&request).expect("forecast");
    println!("\nSecond call served from cache: {}", again.cached);
    println!();
}

/// Too little data to fit anything
fn naive_fallback() {
    println!("--- Naive Fallback ---\n");

    let clock = SystemClock;
    let mut service = ForecastService::new(
        ForecastOptions::default(),
        MemoryResponseCache::new(clock),
        MemoryModelStore::new(),
        clock,
    );
    let now = Observation::new(Utc::now(), Some(57));
    let request = ForecastRequest::builder(SeriesId::from_city("Reykjavík"), Vec::new())
        .horizon(6)
        .current_observed(Some(now))
        .build()
        .expect("valid request");

    let response = service.forecast(&request).expect("forecast");
    println!("Strategy: {:?}", response.strategy);
    println!("Degradations: {:?}", response.degradations);
    for point in &response.points {
        println!("  {:>3} [{:>3}, {:>3}]", point.aqi, point.low, point.high);
    }
}
