//! Multi-step forecasting over a fitted model or the naive fallback.

mod recursive;
mod strategy;

pub use recursive::{Anchor, RecursiveForecaster};
pub use strategy::{FittedLinearStrategy, ForecastError, ForecastStrategy, NaiveDriftStrategy};
