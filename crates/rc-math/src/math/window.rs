//! Windowed views over ordered series.

use super::moments::mean;

/// Mean of the trailing `min(window, n)` values.
///
/// A zero window is treated as one. Returns `None` for empty input.
pub fn tail_mean(values: &[f64], window: usize) -> Option<f64> {
    let k = window.max(1).min(values.len());
    mean(&values[values.len() - k..])
}

/// Sliding-window means, one per full window, oldest first.
///
/// A series shorter than the window yields a single mean over the whole
/// series so callers always get at least one smoothed value.
pub fn rolling_means(values: &[f64], window: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let k = window.max(1);
    if values.len() < k {
        return mean(values).into_iter().collect();
    }
    values
        .windows(k)
        .map(|w| w.iter().sum::<f64>() / k as f64)
        .collect()
}

/// Split a series by index into `(first, second)` halves.
///
/// The first half takes `ceil(n / 2)` elements, so an odd-length series
/// puts its middle point in the first half.
pub fn split_halves(values: &[f64]) -> (&[f64], &[f64]) {
    let mid = values.len().div_ceil(2);
    values.split_at(mid)
}
