//! Reconciling a raw forecast with the authoritative current reading.
//!
//! The pipeline is two explicit stages: [`reconcile_observed`] pins point 0 to
//! ground truth, then [`blend_toward_observed`] ramps the first few predicted
//! points from that value into the model's own trajectory.

use crate::core::ForecastPoint;

/// Force point 0 to the authoritative reading.
///
/// Sets `aqi == low == high == truth` and marks the point observed. With no
/// truth available the point is left as computed (still marked observed).
pub fn reconcile_observed(points: &mut [ForecastPoint], truth: Option<i64>) {
    let Some(first) = points.first_mut() else {
        return;
    };
    if let Some(aqi) = truth {
        first.aqi = aqi;
        first.low = aqi;
        first.high = aqi;
    } else {
        first.low = first.aqi;
        first.high = first.aqi;
    }
    first.observed = true;
}

/// Linearly re-weight predicted steps `1..=steps` toward the observed value.
///
/// Step `i` gets weight `w = min(1, i / steps)` on the model and `1 - w` on the
/// observed value. The band keeps its original half-width (at least 1) around
/// the blended centre. Later steps are untouched.
pub fn blend_toward_observed(points: &mut [ForecastPoint], steps: usize) {
    if steps == 0 || points.len() < 2 {
        return;
    }
    let observed = points[0].aqi as f64;
    let last = steps.min(points.len() - 1);

    for (i, point) in points.iter_mut().enumerate().take(last + 1).skip(1) {
        let w = (i as f64 / steps as f64).min(1.0);
        let blended = ((1.0 - w) * observed + w * point.aqi as f64).round() as i64;
        let spread = point.half_width().max(1);
        point.aqi = blended;
        point.low = (blended - spread).max(0).min(blended);
        point.high = blended + spread;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn points(aqis: &[(i64, i64, i64)]) -> Vec<ForecastPoint> {
        let t0 = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        aqis.iter()
            .enumerate()
            .map(|(i, &(aqi, low, high))| ForecastPoint {
                timestamp: t0 + Duration::hours(i as i64),
                aqi,
                low,
                high,
                observed: i == 0,
            })
            .collect()
    }

    #[test]
    fn test_reconcile_overrides_point_zero() {
        let mut p = points(&[(40, 40, 40), (45, 40, 50)]);
        reconcile_observed(&mut p, Some(70));
        assert_eq!((p[0].aqi, p[0].low, p[0].high), (70, 70, 70));
        assert!(p[0].observed);
        assert_eq!(p[1].aqi, 45);
    }

    #[test]
    fn test_reconcile_without_truth_keeps_value() {
        let mut p = points(&[(40, 38, 42)]);
        p[0].observed = false;
        reconcile_observed(&mut p, None);
        assert_eq!((p[0].aqi, p[0].low, p[0].high), (40, 40, 40));
        assert!(p[0].observed);
    }

    #[test]
    fn test_blend_ramps_first_three_steps() {
        let mut p = points(&[
            (100, 100, 100),
            (70, 62, 78),
            (70, 62, 78),
            (70, 62, 78),
            (70, 62, 78),
        ]);
        blend_toward_observed(&mut p, 3);

        // w = 1/3: round(66.67 + 23.33) = 90
        assert_eq!((p[1].aqi, p[1].low, p[1].high), (90, 82, 98));
        // w = 2/3: round(33.33 + 46.67) = 80
        assert_eq!((p[2].aqi, p[2].low, p[2].high), (80, 72, 88));
        // w = 1: unchanged centre
        assert_eq!((p[3].aqi, p[3].low, p[3].high), (70, 62, 78));
        assert_eq!((p[4].aqi, p[4].low, p[4].high), (70, 62, 78));
    }

    #[test]
    fn test_blend_short_horizon_and_zero_steps() {
        let mut p = points(&[(10, 10, 10), (40, 35, 45)]);
        blend_toward_observed(&mut p, 3);
        assert_eq!(p[1].aqi, 20);

        let mut q = points(&[(10, 10, 10), (40, 35, 45)]);
        blend_toward_observed(&mut q, 0);
        assert_eq!(q[1].aqi, 40);
    }
}
