//! Design-matrix construction from an hourly observation window.

use crate::core::{FeatureOrder, Observation, Series, SeriesId, TargetMode};
use faer::{Col, Mat};
use log::debug;

/// Supervised-learning view of a training window.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    /// One row per consecutive `(prev, cur)` pair, laid out as `feature_order`.
    pub x: Mat<f64>,
    /// Training target per row (delta or absolute, see `target`).
    pub y: Col<f64>,
    pub feature_order: FeatureOrder,
    pub target: TargetMode,
    /// AQI of `prev` for each row, used to integrate delta predictions.
    pub prev_aqi: Vec<f64>,
    /// AQI of `cur` for each row.
    pub actual_aqi: Vec<f64>,
}

impl DesignMatrix {
    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }

    /// Feature values of row `i`.
    pub fn row(&self, i: usize) -> Vec<f64> {
        (0..self.x.ncols()).map(|j| self.x[(i, j)]).collect()
    }
}

/// Turns an observation window into a [`DesignMatrix`].
#[derive(Debug, Clone, Copy)]
pub struct FeatureBuilder {
    target: TargetMode,
}

impl FeatureBuilder {
    pub fn new(target: TargetMode) -> Self {
        Self { target }
    }

    /// Builder for delta-mode (`true`) or absolute-mode targets.
    pub fn with_delta_mode(delta_mode: bool) -> Self {
        Self::new(TargetMode::from_delta_flag(delta_mode))
    }

    pub fn target(&self) -> TargetMode {
        self.target
    }

    /// Build `(X, y)` from a time-ordered window.
    ///
    /// Each consecutive pair `(prev, cur)` yields one row. Pairs where either
    /// side has no resolvable AQI are skipped, so a window of fewer than two
    /// usable observations produces an empty matrix.
    pub fn build(&self, window: &[Observation]) -> DesignMatrix {
        let feature_order = FeatureOrder::from_window(window);

        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(window.len().saturating_sub(1));
        let mut targets = Vec::with_capacity(rows.capacity());
        let mut prev_aqi = Vec::with_capacity(rows.capacity());
        let mut actual_aqi = Vec::with_capacity(rows.capacity());

        for pair in window.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            let (Some(p), Some(c)) = (prev.resolved_aqi(), cur.resolved_aqi()) else {
                debug!("skipping pair at {} without a resolvable AQI", cur.timestamp);
                continue;
            };
            let (p, c) = (p as f64, c as f64);
            rows.push(feature_order.row(p, cur));
            targets.push(self.target.target(p, c));
            prev_aqi.push(p);
            actual_aqi.push(c);
        }

        let n_cols = feature_order.len();
        let x = Mat::from_fn(rows.len(), n_cols, |i, j| rows[i][j]);
        let y = Col::from_fn(targets.len(), |i| targets[i]);

        DesignMatrix {
            x,
            y,
            feature_order,
            target: self.target,
            prev_aqi,
            actual_aqi,
        }
    }
}

/// Assemble a training window: the trailing `window_size` observations of
/// `history`, with `current` merged in as the newest record when present.
///
/// History is deduplicated by timestamp (last write wins) before trimming.
pub fn assemble_window(
    series_id: &SeriesId,
    history: &[Observation],
    current: Option<&Observation>,
    window_size: usize,
) -> Vec<Observation> {
    let series = Series::from_observations(series_id.clone(), history.iter().cloned());
    let mut window = Series::from_observations(
        series_id.clone(),
        series.trailing_window(window_size).iter().cloned(),
    );
    if let Some(obs) = current {
        window.insert(obs.clone());
    }
    window.observations().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(hour: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap() + Duration::hours(hour)
    }

    fn window(aqis: &[i64]) -> Vec<Observation> {
        aqis.iter()
            .enumerate()
            .map(|(h, &a)| {
                Observation::new(at(h as i64), Some(a)).with_pollutants(0.0, 0.0, 0.0, 0.0)
            })
            .collect()
    }

    #[test]
    fn test_four_observations_make_three_rows() {
        let design = FeatureBuilder::with_delta_mode(true).build(&window(&[50, 55, 60, 58]));
        assert_eq!(design.n_rows(), 3);
        assert_eq!(design.x.ncols(), 6);
        assert_eq!(design.y[0], 5.0);
        assert_eq!(design.y[1], 5.0);
        assert_eq!(design.y[2], -2.0);
        assert_eq!(design.row(2), vec![60.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(design.actual_aqi, vec![55.0, 60.0, 58.0]);
    }

    #[test]
    fn test_absolute_mode_targets() {
        let design = FeatureBuilder::with_delta_mode(false).build(&window(&[50, 55, 60]));
        assert_eq!(design.y[0], 55.0);
        assert_eq!(design.y[1], 60.0);
    }

    #[test]
    fn test_single_observation_is_empty() {
        let design = FeatureBuilder::with_delta_mode(true).build(&window(&[50]));
        assert!(design.is_empty());
        assert_eq!(design.feature_order.len(), 6);
        assert!(FeatureBuilder::with_delta_mode(true).build(&[]).is_empty());
    }

    #[test]
    fn test_pairs_without_aqi_are_skipped() {
        let mut w = window(&[50, 55, 60]);
        w[1] = Observation::new(at(1), None);
        let design = FeatureBuilder::with_delta_mode(true).build(&w);
        assert!(design.is_empty());
    }

    #[test]
    fn test_assemble_window_trims_and_appends_current() {
        let history = window(&[10, 20, 30, 40, 50]);
        let current = Observation::new(at(5), Some(61));
        let id = SeriesId::from_city("delhi");

        let w = assemble_window(&id, &history, Some(&current), 3);
        let aqis: Vec<_> = w.iter().map(|o| o.aqi).collect();
        assert_eq!(aqis, vec![Some(30), Some(40), Some(50), Some(61)]);

        // A current reading at an existing timestamp replaces that record.
        let same_hour = Observation::new(at(4), Some(52));
        let w = assemble_window(&id, &history, Some(&same_hour), 3);
        let aqis: Vec<_> = w.iter().map(|o| o.aqi).collect();
        assert_eq!(aqis, vec![Some(30), Some(40), Some(52)]);
    }
}
