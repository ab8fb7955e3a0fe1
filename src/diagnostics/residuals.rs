//! Residual statistics and accuracy metrics in AQI units.

/// Residuals `predicted - actual`.
pub fn residuals(predicted: &[f64], actual: &[f64]) -> Vec<f64> {
    predicted.iter().zip(actual).map(|(p, a)| p - a).collect()
}

/// Sample standard deviation of residuals (n − 1 denominator).
///
/// Returns `None` with fewer than two residuals or a non-finite result.
pub fn residual_std(residuals: &[f64]) -> Option<f64> {
    let n = residuals.len();
    if n < 2 {
        return None;
    }
    let mean = residuals.iter().sum::<f64>() / n as f64;
    let variance = residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = variance.sqrt();
    std.is_finite().then_some(std)
}

/// Root mean squared error.
pub fn rmse(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    let n = predicted.len().min(actual.len());
    if n == 0 {
        return None;
    }
    let mse = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).powi(2))
        .sum::<f64>()
        / n as f64;
    Some(mse.sqrt())
}

/// Mean absolute percentage error, in percent.
///
/// An actual value of exactly zero is divided by 1 instead.
pub fn mape(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    let n = predicted.len().min(actual.len());
    if n == 0 {
        return None;
    }
    let total: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| {
            let denom = if *a == 0.0 { 1.0 } else { *a };
            ((a - p) / denom).abs()
        })
        .sum();
    Some(total / n as f64 * 100.0)
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residual_std_sample_variance() {
        // Mean 0, squares sum to 10, n - 1 = 3
        let r = [1.0, -1.0, 2.0, -2.0];
        let std = residual_std(&r).expect("enough residuals");
        assert!((std - (10.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_residual_std_needs_two() {
        assert_eq!(residual_std(&[]), None);
        assert_eq!(residual_std(&[3.0]), None);
    }

    #[test]
    fn test_rmse_and_mape() {
        let predicted = [52.0, 58.0];
        let actual = [50.0, 60.0];
        assert!((rmse(&predicted, &actual).unwrap() - 2.0).abs() < 1e-12);
        // (2/50 + 2/60) / 2 * 100
        let expected = (0.04 + 2.0 / 60.0) / 2.0 * 100.0;
        assert!((mape(&predicted, &actual).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_mape_zero_actual() {
        assert!((mape(&[3.0], &[0.0]).unwrap() - 300.0).abs() < 1e-12);
        assert_eq!(mape(&[], &[]), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(2.005_1), 2.01);
    }

    #[test]
    fn test_residuals() {
        assert_eq!(residuals(&[5.0, 7.0], &[4.0, 9.0]), vec![1.0, -2.0]);
    }
}
