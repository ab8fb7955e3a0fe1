//! Uncertainty bands and reconciliation with observed ground truth.

mod bands;
mod reconcile;

pub use bands::BandPolicy;
pub use reconcile::{blend_toward_observed, reconcile_observed};
