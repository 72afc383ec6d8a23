//! Residual-based anomaly flags.

use crate::stats;

/// Residuals `value - moving_average` where the moving average is defined.
pub fn residuals(values: &[f64], moving_average: &[Option<f64>]) -> Vec<Option<f64>> {
    values
        .iter()
        .zip(moving_average)
        .map(|(v, ma)| ma.map(|m| v - m))
        .collect()
}

/// Flag positions whose residual exceeds `threshold_std` standard deviations.
///
/// The deviation is the sample standard deviation over all defined
/// residuals. With fewer than two residuals, or a zero spread, nothing is
/// flagged. Positions without a moving average are never flagged.
pub fn detect_anomalies(
    values: &[f64],
    moving_average: &[Option<f64>],
    threshold_std: f64,
) -> Vec<bool> {
    let residuals = residuals(values, moving_average);
    let defined: Vec<f64> = residuals.iter().flatten().copied().collect();

    let sigma = match stats::sample_std_dev(&defined) {
        Some(s) if s > 0.0 && s.is_finite() => s,
        _ => return vec![false; residuals.len()],
    };

    let limit = threshold_std * sigma;
    residuals
        .iter()
        .map(|r| r.is_some_and(|r| r.abs() > limit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::centered_moving_average;

    #[test]
    fn test_residuals_follow_moving_average() {
        let r = residuals(&[1.0, 5.0, 2.0], &[None, Some(3.0), None]);
        assert_eq!(r, vec![None, Some(2.0), None]);
    }

    #[test]
    fn test_fewer_than_two_residuals_flags_nothing() {
        let flags = detect_anomalies(&[1.0, 50.0, 2.0], &[None, Some(1.0), None], 0.1);
        assert_eq!(flags, vec![false, false, false]);
    }

    #[test]
    fn test_constant_series_flags_nothing() {
        let values = vec![12.3; 50];
        let ma = centered_moving_average(&values, 7);
        for threshold in [0.0, 0.5, 2.0] {
            let flags = detect_anomalies(&values, &ma, threshold);
            assert!(flags.iter().all(|f| !f));
        }
    }

    #[test]
    fn test_single_outlier_is_flagged() {
        let mut values: Vec<f64> = (0..41).map(|i| 10.0 + 0.1 * f64::from(i)).collect();
        values[20] += 10.0;
        let ma = centered_moving_average(&values, 5);
        let flags = detect_anomalies(&values, &ma, 2.0);

        let flagged: Vec<usize> = flags
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.then_some(i))
            .collect();
        assert_eq!(flagged, vec![20]);
    }

    #[test]
    fn test_undefined_positions_never_flagged() {
        let mut values = vec![0.0; 11];
        values[0] = 100.0;
        values[5] = 1.0;
        let ma = centered_moving_average(&values, 5);
        let flags = detect_anomalies(&values, &ma, 0.5);
        assert!(!flags[0]);
        assert!(!flags[1]);
        assert!(!flags[10]);
    }
}
