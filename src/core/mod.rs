//! Core types for air-quality forecasting.

mod aqi;
mod model;
mod observation;
mod options;
mod result;

pub use aqi::{aqi_from_pm10, aqi_from_pm25, aqi_from_pollutants, AqiCategory};
pub use model::{Feature, FeatureOrder, LinearModel, TargetMode, FEATURE_SCHEMA_VERSION};
pub use observation::{Observation, Series, SeriesId};
pub use options::{
    normal_multiplier, ForecastOptions, ForecastOptionsBuilder, ForecastRequest,
    ForecastRequestBuilder, OptionsError,
};
pub use result::{
    Degradation, ForecastMetrics, ForecastPoint, ForecastResponse, InvalidResponse, StrategyKind,
};
