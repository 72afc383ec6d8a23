//! Centered rolling mean.

use crate::stats;

/// Index bounds `(before, after)` of a centered window of `window` values.
///
/// For odd windows the span is symmetric. For even windows the extra value
/// sits before the center, so a 30-wide window at `i` covers
/// `i - 15 ..= i + 14`.
pub fn window_span(window: usize) -> (usize, usize) {
    let after = window.saturating_sub(1) / 2;
    let before = window.saturating_sub(1) - after;
    (before, after)
}

/// Centered moving average of `values` over `window` consecutive entries.
///
/// Position `i` gets the mean of the full window around it, or `None` when
/// the window would run past either end of the series. Partial windows are
/// never averaged and no padding is applied. A zero window yields all
/// `None`.
pub fn centered_moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    if window == 0 || window > n {
        return vec![None; n];
    }

    let (before, after) = window_span(window);
    (0..n)
        .map(|i| {
            if i < before || i + after >= n {
                return None;
            }
            stats::mean(&values[i - before..=i + after])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_span() {
        assert_eq!(window_span(1), (0, 0));
        assert_eq!(window_span(3), (1, 1));
        assert_eq!(window_span(4), (2, 1));
        assert_eq!(window_span(30), (15, 14));
        assert_eq!(window_span(31), (15, 15));
    }

    #[test]
    fn test_odd_window() {
        let ma = centered_moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(ma, vec![None, Some(2.0), Some(3.0), Some(4.0), None]);
    }

    #[test]
    fn test_even_window_leans_backwards() {
        // Window 4 at i covers i-2..=i+1
        let ma = centered_moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 4);
        assert_eq!(ma, vec![None, None, Some(2.5), Some(3.5), None]);
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let values = [3.5, -1.0, 7.25];
        let ma = centered_moving_average(&values, 1);
        assert_eq!(ma, vec![Some(3.5), Some(-1.0), Some(7.25)]);
    }

    #[test]
    fn test_series_shorter_than_window() {
        let ma = centered_moving_average(&[1.0, 2.0, 3.0], 4);
        assert!(ma.iter().all(Option::is_none));
        assert_eq!(ma.len(), 3);
    }

    #[test]
    fn test_window_equal_to_length() {
        let ma = centered_moving_average(&[1.0, 2.0, 3.0], 3);
        assert_eq!(ma, vec![None, Some(2.0), None]);
    }

    #[test]
    fn test_zero_window() {
        assert_eq!(centered_moving_average(&[1.0, 2.0], 0), vec![None, None]);
        assert!(centered_moving_average(&[], 5).is_empty());
    }

    #[test]
    fn test_defined_count() {
        let values: Vec<f64> = (0..40).map(f64::from).collect();
        let ma = centered_moving_average(&values, 30);
        let defined: Vec<usize> = ma
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| i))
            .collect();
        assert_eq!(defined.first(), Some(&15));
        assert_eq!(defined.last(), Some(&25));
        assert_eq!(defined.len(), 11);
    }
}
