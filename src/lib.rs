//! Short-horizon AQI forecasting from hourly air-quality observations.
//!
//! Each series (a city or station) gets a small linear model fitted on a
//! trailing window of observations. The model predicts hour-over-hour AQI
//! changes from the previous AQI and the current pollutant readings, and is
//! rolled forward recursively to produce a horizon of hourly points with
//! uncertainty bands. When no model can be fitted, a deterministic naive
//! drift is used instead and the response records why.
//!
//! # Example
//!
//! ```rust,ignore
//! use aqi_forecast::prelude::*;
//!
//! let options = ForecastOptions::builder().horizon(24).build()?;
//! let clock = SystemClock;
//! let mut service = ForecastService::new(
//!     options.clone(),
//!     MemoryResponseCache::new(clock),
//!     MemoryModelStore::new(),
//!     clock,
//! );
//!
//! let request = ForecastRequest::builder(SeriesId::from_city("Delhi"), history)
//!     .defaults_from(&options)
//!     .current_observed(Some(now_reading))
//!     .build()?;
//!
//! let response = service.forecast(&request)?;
//! assert_eq!(response.points.len(), 25);
//! assert!(response.points[0].observed);
//! ```

pub mod core;
pub mod diagnostics;
pub mod features;
pub mod forecast;
pub mod inference;
pub mod service;
pub mod solvers;
pub mod store;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        AqiCategory, Degradation, ForecastMetrics, ForecastOptions, ForecastOptionsBuilder,
        ForecastPoint, ForecastRequest, ForecastRequestBuilder, ForecastResponse, LinearModel,
        Observation, OptionsError, Series, SeriesId, StrategyKind,
    };
    pub use crate::forecast::ForecastError;
    pub use crate::service::ForecastService;
    pub use crate::store::{
        Clock, FileModelStore, FileResponseCache, ManualClock, MemoryModelStore,
        MemoryResponseCache, ModelStore, ResponseCache, StoreError, SystemClock,
    };
}

pub use crate::core::{
    ForecastOptions, ForecastPoint, ForecastRequest, ForecastResponse, Observation, SeriesId,
};
pub use crate::forecast::ForecastError;
pub use crate::service::ForecastService;
