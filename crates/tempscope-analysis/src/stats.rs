//! Descriptive statistics shared by the smoothing, anomaly and seasonal
//! stages.
//!
//! Standard deviations use the sample convention (n - 1 denominator)
//! throughout. Means are accumulated incrementally so that a run of equal
//! values yields exactly that value, which keeps residuals of flat
//! series at zero.

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut mean = 0.0;
    for (i, v) in values.iter().enumerate() {
        mean += (v - mean) / (i + 1) as f64;
    }
    Some(mean)
}

/// Sample standard deviation, `None` for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let mean = mean(values)?;
    let sum_sq: f64 = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum();

    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Minimum and maximum, `None` for an empty slice.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), v| (lo.min(*v), hi.max(*v))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[4.0]), Some(4.0));
        assert!((mean(&[1.0, 2.0, 3.0, 4.0]).unwrap() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_mean_of_equal_values_is_exact() {
        let values = vec![0.1; 30];
        assert_eq!(mean(&values), Some(0.1));
    }

    #[test]
    fn test_sample_std_dev() {
        assert_eq!(sample_std_dev(&[]), None);
        assert_eq!(sample_std_dev(&[5.0]), None);

        // Sample variance of [2, 4, 4, 4, 5, 5, 7, 9] is 32/7
        let std = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_std_dev_of_equal_values_is_zero() {
        assert_eq!(sample_std_dev(&[0.7; 10]), Some(0.0));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[]), None);
        assert_eq!(min_max(&[3.0, -1.5, 8.25]), Some((-1.5, 8.25)));
    }
}
