//! Forecast configuration and per-call request parameters.

use super::observation::{Observation, SeriesId};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

/// Service-level configuration for the forecasting pipeline.
///
/// `horizon`, `window_size` and `delta_mode` are the defaults a
/// [`ForecastRequest`] starts from; the remaining fields tune the band,
/// blending, fallback and caching behaviour of the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastOptions {
    /// Hours to forecast (default: 24).
    pub horizon: usize,
    /// Hours of trailing history to train on (default: 72).
    pub window_size: usize,
    /// Train on hour-over-hour deltas instead of absolute AQI (default: true).
    pub delta_mode: bool,
    /// Number of predicted steps blended toward the observed value (default: 3).
    pub blend_steps: usize,
    /// Normal multiplier applied to the residual std (default: 1.96).
    pub band_multiplier: f64,
    /// Minimum band half-width when a residual std is available (default: 2).
    pub min_band_half_width: f64,
    /// Minimum half-width of the proportional fallback band (default: 5).
    pub fallback_band_floor: f64,
    /// Half-width of the fallback band as a fraction of the prediction (default: 0.1).
    pub fallback_band_ratio: f64,
    /// Amplitude of the deterministic perturbation used without a model (default: 1).
    pub fallback_jitter: f64,
    /// Lifetime of a cached response in seconds (default: 1800).
    pub cache_ttl_secs: i64,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            horizon: 24,
            window_size: 72,
            delta_mode: true,
            blend_steps: 3,
            band_multiplier: 1.96,
            min_band_half_width: 2.0,
            fallback_band_floor: 5.0,
            fallback_band_ratio: 0.1,
            fallback_jitter: 1.0,
            cache_ttl_secs: 30 * 60,
        }
    }
}

/// Errors that can occur when validating forecast options or requests.
#[derive(Debug, Error, PartialEq)]
pub enum OptionsError {
    #[error("horizon must be at least 1, got {0}")]
    InvalidHorizon(usize),
    #[error("window_size must be at least 1, got {0}")]
    InvalidWindowSize(usize),
    #[error("confidence_level must be in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),
    #[error("band_multiplier must be positive, got {0}")]
    InvalidBandMultiplier(f64),
    #[error("band widths must be non-negative")]
    InvalidBandWidth,
    #[error("fallback_jitter must be non-negative, got {0}")]
    InvalidJitter(f64),
    #[error("cache_ttl_secs must be non-negative, got {0}")]
    InvalidCacheTtl(i64),
    #[error("failed to parse options: {0}")]
    Parse(String),
}

impl ForecastOptions {
    /// Create a new builder for forecast options.
    pub fn builder() -> ForecastOptionsBuilder {
        ForecastOptionsBuilder::default()
    }

    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, OptionsError> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| OptionsError::Parse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Cache lifetime as a duration.
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs)
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.horizon < 1 {
            return Err(OptionsError::InvalidHorizon(self.horizon));
        }
        if self.window_size < 1 {
            return Err(OptionsError::InvalidWindowSize(self.window_size));
        }
        if !(self.band_multiplier > 0.0 && self.band_multiplier.is_finite()) {
            return Err(OptionsError::InvalidBandMultiplier(self.band_multiplier));
        }
        if self.min_band_half_width < 0.0
            || self.fallback_band_floor < 0.0
            || self.fallback_band_ratio < 0.0
        {
            return Err(OptionsError::InvalidBandWidth);
        }
        if self.fallback_jitter < 0.0 {
            return Err(OptionsError::InvalidJitter(self.fallback_jitter));
        }
        if self.cache_ttl_secs < 0 {
            return Err(OptionsError::InvalidCacheTtl(self.cache_ttl_secs));
        }
        Ok(())
    }
}

/// Two-sided normal quantile for a confidence level, e.g. 0.95 → 1.959964.
pub fn normal_multiplier(confidence_level: f64) -> Result<f64, OptionsError> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(OptionsError::InvalidConfidenceLevel(confidence_level));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|_| OptionsError::InvalidConfidenceLevel(confidence_level))?;
    Ok(normal.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0))
}

/// Builder for `ForecastOptions`.
#[derive(Debug, Clone, Default)]
pub struct ForecastOptionsBuilder {
    options: ForecastOptions,
    confidence_level: Option<f64>,
}

impl ForecastOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn horizon(mut self, horizon: usize) -> Self {
        self.options.horizon = horizon;
        self
    }

    pub fn window_size(mut self, window_size: usize) -> Self {
        self.options.window_size = window_size;
        self
    }

    pub fn delta_mode(mut self, delta_mode: bool) -> Self {
        self.options.delta_mode = delta_mode;
        self
    }

    pub fn blend_steps(mut self, steps: usize) -> Self {
        self.options.blend_steps = steps;
        self
    }

    /// Set the band multiplier directly.
    pub fn band_multiplier(mut self, z: f64) -> Self {
        self.options.band_multiplier = z;
        self.confidence_level = None;
        self
    }

    /// Derive the band multiplier from a two-sided normal confidence level.
    ///
    /// The default multiplier stays at the rounded 1.96 unless this is called.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = Some(level);
        self
    }

    pub fn min_band_half_width(mut self, width: f64) -> Self {
        self.options.min_band_half_width = width;
        self
    }

    pub fn fallback_band(mut self, floor: f64, ratio: f64) -> Self {
        self.options.fallback_band_floor = floor;
        self.options.fallback_band_ratio = ratio;
        self
    }

    pub fn fallback_jitter(mut self, jitter: f64) -> Self {
        self.options.fallback_jitter = jitter;
        self
    }

    pub fn cache_ttl_secs(mut self, secs: i64) -> Self {
        self.options.cache_ttl_secs = secs;
        self
    }

    /// Build the options, validating all parameters.
    pub fn build(mut self) -> Result<ForecastOptions, OptionsError> {
        if let Some(level) = self.confidence_level {
            self.options.band_multiplier = normal_multiplier(level)?;
        }
        self.options.validate()?;
        Ok(self.options)
    }

    /// Build the options without validation.
    ///
    /// An invalid confidence level leaves the multiplier unchanged.
    pub fn build_unchecked(mut self) -> ForecastOptions {
        if let Some(Ok(z)) = self.confidence_level.map(normal_multiplier) {
            self.options.band_multiplier = z;
        }
        self.options
    }
}

/// Inputs for one forecast call.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub series_id: SeriesId,
    /// Time-ordered hourly history; trimmed to `window_size` by the pipeline.
    pub history: Vec<Observation>,
    /// Authoritative current reading, if the caller could obtain one.
    pub current_observed: Option<Observation>,
    pub horizon: usize,
    pub window_size: usize,
    pub delta_mode: bool,
    /// Skip the cache read (a fresh entry is still written).
    pub force_recompute: bool,
    /// Forecast from the stored model when its feature layout still matches.
    pub reuse_model: bool,
}

impl ForecastRequest {
    /// Start a request with horizon, window and target mode from `ForecastOptions::default()`.
    pub fn builder(series_id: SeriesId, history: Vec<Observation>) -> ForecastRequestBuilder {
        ForecastRequestBuilder::new(series_id, history)
    }
}

/// Builder for `ForecastRequest`.
#[derive(Debug, Clone)]
pub struct ForecastRequestBuilder {
    request: ForecastRequest,
}

impl ForecastRequestBuilder {
    pub fn new(series_id: SeriesId, history: Vec<Observation>) -> Self {
        let defaults = ForecastOptions::default();
        Self {
            request: ForecastRequest {
                series_id,
                history,
                current_observed: None,
                horizon: defaults.horizon,
                window_size: defaults.window_size,
                delta_mode: defaults.delta_mode,
                force_recompute: false,
                reuse_model: false,
            },
        }
    }

    /// Take horizon, window and target mode from service options.
    pub fn defaults_from(mut self, options: &ForecastOptions) -> Self {
        self.request.horizon = options.horizon;
        self.request.window_size = options.window_size;
        self.request.delta_mode = options.delta_mode;
        self
    }

    pub fn current_observed(mut self, observation: Option<Observation>) -> Self {
        self.request.current_observed = observation;
        self
    }

    pub fn horizon(mut self, horizon: usize) -> Self {
        self.request.horizon = horizon;
        self
    }

    pub fn window_size(mut self, window_size: usize) -> Self {
        self.request.window_size = window_size;
        self
    }

    pub fn delta_mode(mut self, delta_mode: bool) -> Self {
        self.request.delta_mode = delta_mode;
        self
    }

    pub fn force_recompute(mut self, force: bool) -> Self {
        self.request.force_recompute = force;
        self
    }

    pub fn reuse_model(mut self, reuse: bool) -> Self {
        self.request.reuse_model = reuse;
        self
    }

    pub fn build(self) -> Result<ForecastRequest, OptionsError> {
        if self.request.horizon < 1 {
            return Err(OptionsError::InvalidHorizon(self.request.horizon));
        }
        if self.request.window_size < 1 {
            return Err(OptionsError::InvalidWindowSize(self.request.window_size));
        }
        Ok(self.request)
    }
}
