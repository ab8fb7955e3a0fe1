//! Feature engineering for the hourly AQI regression.

mod builder;

pub use builder::{assemble_window, DesignMatrix, FeatureBuilder};
