//! File-backed cache and model store tests.

mod common;

use aqi_forecast::core::{ForecastPoint, StrategyKind};
use aqi_forecast::prelude::*;
use aqi_forecast::store::{CacheEntry, CacheKey};
use chrono::Duration;
use common::{generate_linear_history, series_id, successor, t0};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn response(horizon: usize) -> ForecastResponse {
    let points = (0..=horizon)
        .map(|h| {
            let ts = t0() + Duration::hours(h as i64);
            if h == 0 {
                ForecastPoint::observed(ts, 70)
            } else {
                ForecastPoint {
                    timestamp: ts,
                    aqi: 70 + h as i64,
                    low: 65 + h as i64,
                    high: 75 + h as i64,
                    observed: false,
                }
            }
        })
        .collect();
    ForecastResponse {
        series_id: series_id(),
        horizon,
        points,
        metrics: ForecastMetrics::default(),
        strategy: StrategyKind::NaiveDrift,
        degradations: Vec::new(),
        generated_at: t0(),
        cached: false,
    }
}

fn key(horizon: usize) -> CacheKey {
    CacheKey {
        horizon,
        window_size: 72,
        delta_mode: true,
        observed: Some((t0(), 70)),
    }
}

fn cache_file(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("forecast-test-city.json")
}

// ============================================================================
// Response cache
// ============================================================================

#[test]
fn test_file_cache_round_trip() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let mut cache = FileResponseCache::new(dir.path(), Arc::clone(&clock));
    let original = response(6);

    cache.write(&series_id(), &key(6), &original, Duration::minutes(30)).unwrap();
    assert!(cache_file(&dir).exists());

    let read = cache.read(&series_id(), &key(6)).unwrap().expect("entry should be fresh");
    assert!(read.cached);
    assert_eq!(read, ForecastResponse { cached: true, ..original });
}

#[test]
fn test_file_cache_expires() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let mut cache = FileResponseCache::new(dir.path(), Arc::clone(&clock));

    cache.write(&series_id(), &key(3), &response(3), Duration::minutes(30)).unwrap();
    clock.advance(Duration::minutes(30));
    assert!(cache.read(&series_id(), &key(3)).unwrap().is_some());
    clock.advance(Duration::seconds(1));
    assert!(cache.read(&series_id(), &key(3)).unwrap().is_none());
}

#[test]
fn test_invalid_cached_response_is_discarded() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let cache = FileResponseCache::new(dir.path(), Arc::clone(&clock));

    // Point 0 is not observed.
    let mut broken = response(3);
    broken.points[0].observed = false;
    let entry = CacheEntry {
        key: key(3),
        written_at: t0(),
        ttl_secs: 1800,
        response: broken,
    };
    fs::write(cache_file(&dir), serde_json::to_vec(&entry).unwrap()).unwrap();

    assert!(cache.read(&series_id(), &key(3)).unwrap().is_none());
}

#[test]
fn test_unparseable_cache_file_is_discarded() {
    let dir = TempDir::new().unwrap();
    let cache = FileResponseCache::new(dir.path(), SystemClock);

    fs::write(cache_file(&dir), b"{ not json").unwrap();
    assert!(cache.read(&series_id(), &key(6)).unwrap().is_none());
}

#[test]
fn test_invalidate_removes_entry() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let mut cache = FileResponseCache::new(dir.path(), Arc::clone(&clock));

    cache.write(&series_id(), &key(2), &response(2), Duration::minutes(30)).unwrap();
    cache.invalidate(&series_id()).unwrap();
    assert!(!cache_file(&dir).exists());
    assert!(cache.read(&series_id(), &key(2)).unwrap().is_none());

    // Removing a missing entry is fine.
    cache.invalidate(&series_id()).unwrap();
}

#[test]
fn test_memory_cache_tracks_entries() {
    let clock = Arc::new(ManualClock::new(t0()));
    let mut cache = MemoryResponseCache::new(Arc::clone(&clock));
    assert!(cache.is_empty());

    cache.write(&series_id(), &key(2), &response(2), Duration::minutes(5)).unwrap();
    assert_eq!(cache.len(), 1);
    assert!(cache.read(&series_id(), &key(2)).unwrap().unwrap().cached);

    clock.advance(Duration::minutes(6));
    assert!(cache.read(&series_id(), &key(2)).unwrap().is_none());
}

#[test]
fn test_entry_for_other_request_is_a_miss() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(t0()));
    let mut cache = FileResponseCache::new(dir.path(), Arc::clone(&clock));
    cache.write(&series_id(), &key(4), &response(4), Duration::minutes(30)).unwrap();

    let new_reading = CacheKey {
        observed: Some((t0(), 90)),
        ..key(4)
    };
    let other_window = CacheKey {
        window_size: 24,
        ..key(4)
    };
    let absolute = CacheKey {
        delta_mode: false,
        ..key(4)
    };
    let no_reading = CacheKey {
        observed: None,
        ..key(4)
    };

    assert!(cache.read(&series_id(), &key(4)).unwrap().is_some());
    assert!(cache.read(&series_id(), &key(6)).unwrap().is_none());
    assert!(cache.read(&series_id(), &new_reading).unwrap().is_none());
    assert!(cache.read(&series_id(), &other_window).unwrap().is_none());
    assert!(cache.read(&series_id(), &absolute).unwrap().is_none());
    assert!(cache.read(&series_id(), &no_reading).unwrap().is_none());
}

// ============================================================================
// Model store and service over files
// ============================================================================

#[test]
fn test_service_state_survives_restart() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(t0() + Duration::hours(100)));
    let history = generate_linear_history(48, 80, 21);
    let current = successor(history.last().unwrap(), 20.0, 20.0, 5.0, 2.0);
    let request = ForecastRequest::builder(series_id(), history)
        .current_observed(Some(current))
        .reuse_model(true)
        .build()
        .unwrap();

    let make_service = || {
        ForecastService::new(
            ForecastOptions::default(),
            FileResponseCache::new(dir.path(), Arc::clone(&clock)),
            FileModelStore::new(dir.path()),
            Arc::clone(&clock),
        )
    };

    let first = make_service().forecast(&request).unwrap();
    assert!(!first.cached);
    assert!(dir.path().join("model-test-city.json").exists());

    let mut restarted = make_service();
    let second = restarted.forecast(&request).unwrap();
    assert!(second.cached);
    assert_eq!(second.points, first.points);

    let stored = restarted.model(&series_id()).unwrap().expect("model persisted");
    assert_eq!(stored.coefficients.len(), stored.feature_order.len());
    assert_eq!(stored.trained_at, t0() + Duration::hours(100));
}

#[test]
fn test_missing_model_file_is_none() {
    let dir = TempDir::new().unwrap();
    let store = FileModelStore::new(dir.path().join("models"));
    assert!(store.load(&series_id()).unwrap().is_none());
}
