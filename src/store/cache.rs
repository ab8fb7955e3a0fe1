//! Time-boxed memoization of whole forecast responses.

use super::clock::Clock;
use super::error::StoreError;
use super::file::{entry_path, read_json, remove, write_json_atomic};
use crate::core::{ForecastRequest, ForecastResponse, SeriesId};
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// The request parameters a cached response was computed for.
///
/// A cached response is only served to a request with an equal key, so a new
/// current reading always produces a fresh point 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKey {
    pub horizon: usize,
    pub window_size: usize,
    pub delta_mode: bool,
    /// Timestamp and resolved AQI of the current reading, if any.
    pub observed: Option<(DateTime<Utc>, i64)>,
}

impl CacheKey {
    pub fn for_request(request: &ForecastRequest) -> Self {
        Self {
            horizon: request.horizon,
            window_size: request.window_size,
            delta_mode: request.delta_mode,
            observed: request
                .current_observed
                .as_ref()
                .and_then(|o| o.resolved_aqi().map(|aqi| (o.timestamp, aqi))),
        }
    }
}

/// A cached response with the key it answers, its write time and lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub written_at: DateTime<Utc>,
    pub ttl_secs: i64,
    pub response: ForecastResponse,
}

impl CacheEntry {
    /// True while the entry's age is within its TTL.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.written_at <= Duration::seconds(self.ttl_secs)
    }

    /// True if the entry is fresh at `now` and was computed for `key`.
    fn answers(&self, series_id: &SeriesId, key: &CacheKey, now: DateTime<Utc>) -> bool {
        if &self.key != key {
            debug!("{}: cached entry was computed for {:?}", series_id, self.key);
            return false;
        }
        self.is_fresh(now)
    }

    /// The stored response, marked as served from cache.
    fn into_cached(self) -> ForecastResponse {
        let mut response = self.response;
        response.cached = true;
        response
    }
}

/// Storage for the last forecast response of each series.
///
/// Reads treat stale entries and entries written for a different [`CacheKey`]
/// as absent; returned responses carry `cached = true`.
pub trait ResponseCache {
    fn read(
        &self,
        series_id: &SeriesId,
        key: &CacheKey,
    ) -> Result<Option<ForecastResponse>, StoreError>;

    fn write(
        &mut self,
        series_id: &SeriesId,
        key: &CacheKey,
        response: &ForecastResponse,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    fn invalidate(&mut self, series_id: &SeriesId) -> Result<(), StoreError>;
}

/// In-process response cache.
#[derive(Debug)]
pub struct MemoryResponseCache<C: Clock> {
    clock: C,
    entries: HashMap<SeriesId, CacheEntry>,
}

impl<C: Clock> MemoryResponseCache<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: Clock> ResponseCache for MemoryResponseCache<C> {
    fn read(
        &self,
        series_id: &SeriesId,
        key: &CacheKey,
    ) -> Result<Option<ForecastResponse>, StoreError> {
        let now = self.clock.now();
        Ok(self
            .entries
            .get(series_id)
            .filter(|e| e.answers(series_id, key, now))
            .cloned()
            .map(CacheEntry::into_cached))
    }

    fn write(
        &mut self,
        series_id: &SeriesId,
        key: &CacheKey,
        response: &ForecastResponse,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let entry = CacheEntry {
            key: key.clone(),
            written_at: self.clock.now(),
            ttl_secs: ttl.num_seconds(),
            response: response.clone(),
        };
        self.entries.insert(series_id.clone(), entry);
        Ok(())
    }

    fn invalidate(&mut self, series_id: &SeriesId) -> Result<(), StoreError> {
        self.entries.remove(series_id);
        Ok(())
    }
}

/// Response cache persisted as `forecast-<series>.json` files.
///
/// Entries that no longer parse or fail [`ForecastResponse::validate`] are
/// treated as absent.
#[derive(Debug)]
pub struct FileResponseCache<C: Clock> {
    dir: PathBuf,
    clock: C,
}

impl<C: Clock> FileResponseCache<C> {
    pub fn new(dir: impl Into<PathBuf>, clock: C) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    fn path(&self, series_id: &SeriesId) -> PathBuf {
        entry_path(&self.dir, "forecast", series_id)
    }
}

impl<C: Clock> ResponseCache for FileResponseCache<C> {
    fn read(
        &self,
        series_id: &SeriesId,
        key: &CacheKey,
    ) -> Result<Option<ForecastResponse>, StoreError> {
        let path = self.path(series_id);
        let entry: CacheEntry = match read_json(&path) {
            Ok(Some(entry)) => entry,
            Ok(None) => return Ok(None),
            Err(StoreError::Serialization(e)) => {
                warn!("discarding unreadable cache entry {}: {}", path.display(), e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if let Err(e) = entry.response.validate() {
            warn!("discarding invalid cache entry {}: {}", path.display(), e);
            return Ok(None);
        }
        if !entry.answers(series_id, key, self.clock.now()) {
            return Ok(None);
        }
        Ok(Some(entry.into_cached()))
    }

    fn write(
        &mut self,
        series_id: &SeriesId,
        key: &CacheKey,
        response: &ForecastResponse,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let entry = CacheEntry {
            key: key.clone(),
            written_at: self.clock.now(),
            ttl_secs: ttl.num_seconds(),
            response: response.clone(),
        };
        write_json_atomic(&self.path(series_id), &entry)
    }

    fn invalidate(&mut self, series_id: &SeriesId) -> Result<(), StoreError> {
        remove(&self.path(series_id))
    }
}
