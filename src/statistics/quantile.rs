//! Percentiles of bootstrap draws.
//!
//! Uses the "R-7" definition (linear interpolation between order statistics),
//! the default of numpy's `percentile`, so bootstrap intervals line up with
//! those of the published analysis scripts.

/// Compute a single R-7 quantile from a mutable slice.
///
/// Selection runs in O(n) via `select_nth_unstable_by`, so the slice is
/// partially reordered as a side effect.
///
/// # Panics
///
/// Panics if `data` is empty or if `p` is outside [0, 1].
pub fn compute_quantile(data: &mut [f64], p: f64) -> f64 {
    assert!(!data.is_empty(), "Cannot compute quantile of empty slice");
    assert!(
        (0.0..=1.0).contains(&p),
        "Quantile probability must be in [0, 1]"
    );

    let n = data.len();
    if n == 1 {
        return data[0];
    }

    let h = (n - 1) as f64 * p;
    let h_floor = h.floor() as usize;
    let h_frac = h - h.floor();

    if h_floor >= n - 1 {
        let (_, &mut max, _) = data.select_nth_unstable_by(n - 1, |a, b| a.total_cmp(b));
        return max;
    }

    let (_, &mut lower, upper) = data.select_nth_unstable_by(h_floor, |a, b| a.total_cmp(b));

    if h_frac == 0.0 {
        return lower;
    }

    // Smallest element of the upper partition is the next order statistic.
    let upper_min = upper
        .iter()
        .copied()
        .min_by(|a, b| a.total_cmp(b))
        .unwrap_or(lower);

    lower + h_frac * (upper_min - lower)
}

/// Two-sided percentile interval of a distribution of draws.
///
/// `level` is the coverage (0.95 gives the 2.5th and 97.5th percentiles).
/// Returns `None` when `values` is empty.
pub fn percentile_interval(values: &[f64], level: f64) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let tail = (1.0 - level.clamp(0.0, 1.0)) / 2.0;
    let mut scratch = values.to_vec();
    let low = compute_quantile(&mut scratch, tail);
    let high = compute_quantile(&mut scratch, 1.0 - tail);
    Some((low, high))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_simple() {
        let mut data: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let median = compute_quantile(&mut data, 0.5);
        assert!((median - 5.5).abs() < 1e-10);
    }

    #[test]
    fn test_quantile_extremes() {
        let mut data = vec![3.0, 1.0, 2.0];
        assert_eq!(compute_quantile(&mut data, 0.0), 1.0);
        assert_eq!(compute_quantile(&mut data, 1.0), 3.0);
    }

    #[test]
    fn test_percentile_interval_matches_linear_interpolation() {
        // 0..=100: 2.5th percentile is 2.5, 97.5th is 97.5.
        let data: Vec<f64> = (0..=100).map(|x| x as f64).collect();
        let (low, high) = percentile_interval(&data, 0.95).unwrap();
        assert!((low - 2.5).abs() < 1e-10);
        assert!((high - 97.5).abs() < 1e-10);
    }

    #[test]
    fn test_percentile_interval_agrees_with_numpy_default() {
        // numpy.percentile(range(1, 11), [2.5, 97.5]) == [1.225, 9.775]
        let data: Vec<f64> = (1..=10).rev().map(|x| x as f64).collect();
        let (low, high) = percentile_interval(&data, 0.95).unwrap();
        assert!((low - 1.225).abs() < 1e-12);
        assert!((high - 9.775).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_interval_of_constant_draws() {
        let data = vec![1.0; 50];
        assert_eq!(percentile_interval(&data, 0.95), Some((1.0, 1.0)));
        assert_eq!(percentile_interval(&[], 0.95), None);
    }
}
