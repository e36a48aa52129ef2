//! Sample moments over plain `f64` slices.
//!
//! Variance is the population variance (divide by n). Callers that need
//! the unbiased estimator should scale by `n / (n - 1)` themselves.

use serde::{Deserialize, Serialize};

/// Arithmetic mean. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance. Returns `None` for empty input.
pub fn population_variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let sum_sq = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    Some(sum_sq / values.len() as f64)
}

/// Population standard deviation. Returns `None` for empty input.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    population_variance(values).map(f64::sqrt)
}

/// Coefficient of variation: `std_dev / mean`.
///
/// Defined as 0 when the mean is exactly zero, so an all-zero series has
/// no measured dispersion rather than an undefined one. Returns `None` for
/// empty input.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if m == 0.0 {
        return Some(0.0);
    }
    let sd = std_dev(values)?;
    Some(sd / m)
}

/// Moment summary for a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    pub n: usize,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub cv: f64,
}

impl Moments {
    /// Summarize a series in one pass over the helpers above.
    pub fn of(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let variance = population_variance(values)?;
        let std_dev = variance.sqrt();
        let cv = if mean == 0.0 { 0.0 } else { std_dev / mean };
        Some(Self {
            n: values.len(),
            mean,
            variance,
            std_dev,
            cv,
        })
    }
}
