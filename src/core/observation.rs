//! Hourly observations and the per-city series that holds them.

use super::aqi::aqi_from_pollutants;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single hourly air-quality record.
///
/// Pollutant and weather channels are optional; a missing channel is `None`
/// rather than zero so the feature builder can tell "absent" from "measured 0".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub aqi: Option<i64>,
    #[serde(default)]
    pub pm25: Option<f64>,
    #[serde(default)]
    pub pm10: Option<f64>,
    #[serde(default)]
    pub no2: Option<f64>,
    #[serde(default)]
    pub co: Option<f64>,
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub wind: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

impl Observation {
    /// Create an observation with only a timestamp and an AQI value.
    pub fn new(timestamp: DateTime<Utc>, aqi: Option<i64>) -> Self {
        Self {
            timestamp,
            aqi,
            pm25: None,
            pm10: None,
            no2: None,
            co: None,
            temp: None,
            wind: None,
            humidity: None,
        }
    }

    /// Set all four pollutant channels.
    pub fn with_pollutants(mut self, pm25: f64, pm10: f64, no2: f64, co: f64) -> Self {
        self.pm25 = Some(pm25);
        self.pm10 = Some(pm10);
        self.no2 = Some(no2);
        self.co = Some(co);
        self
    }

    pub fn with_temp(mut self, temp: f64) -> Self {
        self.temp = Some(temp);
        self
    }

    pub fn with_wind(mut self, wind: f64) -> Self {
        self.wind = Some(wind);
        self
    }

    pub fn with_humidity(mut self, humidity: f64) -> Self {
        self.humidity = Some(humidity);
        self
    }

    /// The reported AQI, or one derived from PM2.5/PM10 when it is missing.
    pub fn resolved_aqi(&self) -> Option<i64> {
        self.aqi.or_else(|| aqi_from_pollutants(self.pm25, self.pm10))
    }
}

/// Normalized series key (a city slug).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(String);

impl SeriesId {
    /// Slugify a free-form city name: lowercase, runs of characters outside
    /// `[a-z0-9]` collapse to a single `-`, no leading or trailing `-`.
    pub fn from_city(city: &str) -> Self {
        let mut slug = String::with_capacity(city.len());
        let mut pending_dash = false;
        for ch in city.chars().flat_map(char::to_lowercase) {
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(ch);
            } else {
                pending_dash = true;
            }
        }
        Self(slug)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeriesId {
    fn from(city: &str) -> Self {
        Self::from_city(city)
    }
}

/// Time-ordered observations for one series.
///
/// Timestamps are strictly increasing. Inserting a record whose timestamp is
/// already present replaces the earlier record (last write wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    id: SeriesId,
    observations: Vec<Observation>,
}

impl Series {
    /// Create an empty series.
    pub fn new(id: SeriesId) -> Self {
        Self {
            id,
            observations: Vec::new(),
        }
    }

    /// Build a series from records in any order.
    pub fn from_observations<I>(id: SeriesId, observations: I) -> Self
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut series = Self::new(id);
        series.extend(observations);
        series
    }

    pub fn id(&self) -> &SeriesId {
        &self.id
    }

    /// Insert a record, keeping timestamp order and deduplicating.
    pub fn insert(&mut self, observation: Observation) {
        match self
            .observations
            .binary_search_by(|o| o.timestamp.cmp(&observation.timestamp))
        {
            Ok(pos) => self.observations[pos] = observation,
            Err(pos) => self.observations.insert(pos, observation),
        }
    }

    pub fn extend<I>(&mut self, observations: I)
    where
        I: IntoIterator<Item = Observation>,
    {
        for obs in observations {
            self.insert(obs);
        }
    }

    /// The last `n` observations (all of them if the series is shorter).
    pub fn trailing_window(&self, n: usize) -> &[Observation] {
        let start = self.observations.len().saturating_sub(n);
        &self.observations[start..]
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
