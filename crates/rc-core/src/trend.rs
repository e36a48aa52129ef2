//! Trend estimation over a bucketed series.
//!
//! The estimate compares the mean of the first half of the series against
//! the mean of the second half, projects one step ahead from the trailing
//! rolling average, and derives a confidence from the coefficient of
//! variation.
//!
//! The projection is a heuristic (rolling average times a fixed
//! multiplier), not a statistical forecast.
//!
//! # Example
//!
//! ```rust
//! use rc_common::TrendDirection;
//! use rc_config::TrendPolicy;
//! use rc_core::trend::estimate_trend;
//!
//! let result = estimate_trend("cyber", &[2.0, 3.0, 2.0, 3.0, 8.0], &TrendPolicy::default());
//! assert_eq!(result.direction, TrendDirection::Increasing);
//! ```

use rc_common::{TrendDirection, TrendResult};
use rc_config::TrendPolicy;
use rc_math::{clamp_range, mean, split_halves, tail_mean, Moments};

/// Estimate the trend of an ordered series.
///
/// Never fails. Series with fewer than two usable points, or with no
/// non-zero values, come back as `stable` at the insufficient-data
/// confidence. Non-finite values are skipped.
pub fn estimate_trend(category: &str, series: &[f64], policy: &TrendPolicy) -> TrendResult {
    let values: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();

    if values.len() < 2 || values.iter().all(|v| *v == 0.0) {
        return insufficient(category, &values, policy);
    }

    let (first, second) = split_halves(&values);
    let first_mean = mean(first).unwrap_or(0.0);
    let second_mean = mean(second).unwrap_or(first_mean);
    let change = relative_change(first_mean, second_mean);
    let direction = classify_change(change, policy.change_threshold);

    let rolling_average = tail_mean(&values, policy.rolling_window).unwrap_or(0.0);
    let predicted_next = rolling_average * multiplier(direction, policy);

    let cv = Moments::of(&values).map_or(0.0, |m| m.cv);
    let confidence = clamp_range(
        1.0 - cv,
        policy.confidence_floor,
        policy.confidence_ceiling,
    );

    TrendResult {
        category: category.to_string(),
        direction,
        magnitude: (change * 100.0).abs(),
        rolling_average,
        predicted_next,
        confidence,
        samples: values.len(),
    }
}

fn insufficient(category: &str, values: &[f64], policy: &TrendPolicy) -> TrendResult {
    let last = values.last().copied().unwrap_or(0.0);
    TrendResult {
        category: category.to_string(),
        direction: TrendDirection::Stable,
        magnitude: 0.0,
        rolling_average: last,
        predicted_next: last,
        confidence: policy.insufficient_data_confidence,
        samples: values.len(),
    }
}

/// `(second - first) / first`, defined as 0 when `first` is 0.
pub fn relative_change(first: f64, second: f64) -> f64 {
    if first == 0.0 {
        0.0
    } else {
        (second - first) / first
    }
}

/// Map a relative change onto a direction. Both comparisons are strict.
pub fn classify_change(change: f64, threshold: f64) -> TrendDirection {
    if change > threshold {
        TrendDirection::Increasing
    } else if change < -threshold {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

/// Projection multiplier for a direction.
pub fn multiplier(direction: TrendDirection, policy: &TrendPolicy) -> f64 {
    match direction {
        TrendDirection::Increasing => policy.increasing_multiplier,
        TrendDirection::Decreasing => policy.decreasing_multiplier,
        TrendDirection::Stable => 1.0,
    }
}
