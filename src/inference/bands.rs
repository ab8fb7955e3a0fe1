//! Uncertainty bands around point forecasts.

use crate::core::ForecastOptions;

/// How band half-widths are derived for predicted points.
///
/// With a residual standard deviation the half-width is
/// `max(min_half_width, round(multiplier · std))`, an implicit homoskedastic
/// Gaussian assumption over the training window. Without one it falls back
/// to `max(fallback_floor, fallback_ratio · prediction)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPolicy {
    pub multiplier: f64,
    pub min_half_width: f64,
    pub fallback_floor: f64,
    pub fallback_ratio: f64,
}

impl Default for BandPolicy {
    fn default() -> Self {
        Self::from_options(&ForecastOptions::default())
    }
}

impl BandPolicy {
    pub fn from_options(options: &ForecastOptions) -> Self {
        Self {
            multiplier: options.band_multiplier,
            min_half_width: options.min_band_half_width,
            fallback_floor: options.fallback_band_floor,
            fallback_ratio: options.fallback_band_ratio,
        }
    }

    /// Half-width of the band around `prediction`.
    pub fn half_width(&self, prediction: i64, residual_std: Option<f64>) -> f64 {
        match residual_std.filter(|s| s.is_finite() && *s >= 0.0) {
            Some(std) => (self.multiplier * std).round().max(self.min_half_width),
            None => self.fallback_floor.max(self.fallback_ratio * prediction as f64),
        }
    }

    /// `(low, high)` for a non-negative prediction; `low` is clamped at 0.
    pub fn band(&self, prediction: i64, residual_std: Option<f64>) -> (i64, i64) {
        let spread = self.half_width(prediction, residual_std);
        let p = prediction as f64;
        let low = (p - spread).round().max(0.0) as i64;
        let high = (p + spread).round() as i64;
        (low.min(prediction), high.max(prediction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residual_band() {
        // round(1.96 * 4.0) = 8
        let policy = BandPolicy::default();
        assert_eq!(policy.band(62, Some(4.0)), (54, 70));
    }

    #[test]
    fn test_residual_band_floor() {
        let policy = BandPolicy::default();
        assert_eq!(policy.band(62, Some(0.1)), (60, 64));
        assert_eq!(policy.band(62, Some(0.0)), (60, 64));
    }

    #[test]
    fn test_fallback_band() {
        let policy = BandPolicy::default();
        // max(5, 6.2) = 6.2
        assert_eq!(policy.band(62, None), (56, 68));
        // max(5, 2.0) = 5
        assert_eq!(policy.band(20, None), (15, 25));
    }

    #[test]
    fn test_low_clamped_at_zero() {
        let policy = BandPolicy::default();
        assert_eq!(policy.band(3, None), (0, 8));
        assert_eq!(policy.band(0, Some(4.0)), (0, 8));
    }

    #[test]
    fn test_non_finite_std_uses_fallback() {
        let policy = BandPolicy::default();
        assert_eq!(policy.band(62, Some(f64::NAN)), policy.band(62, None));
    }
}
