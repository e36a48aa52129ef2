//! First differences and average step size.

/// Consecutive first differences: `values[i] - values[i - 1]`.
///
/// Returns an empty vector for fewer than two values.
pub fn first_differences(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Mean of the first differences, i.e. the average change per step.
///
/// This telescopes to `(last - first) / (n - 1)`, but is computed from the
/// differences so accumulated rounding matches a step-by-step reading.
/// Returns 0 for fewer than two values.
pub fn mean_first_difference(values: &[f64]) -> f64 {
    let diffs = first_differences(values);
    if diffs.is_empty() {
        return 0.0;
    }
    diffs.iter().sum::<f64>() / diffs.len() as f64
}
