//! Threshold-breach projection.
//!
//! Extrapolates the mean step-to-step change of a series linearly until it
//! meets a threshold. The result is a day count (capped at the policy
//! horizon) and a coarse likelihood bucket derived from that count.

use rc_common::series::validate_series;
use rc_common::{BreachPrediction, Error, ProbabilityBucket, Result, SeriesId};
use rc_config::BreachPolicy;
use rc_math::{ceil_capped, mean_first_difference};

/// Project when `series` will reach `threshold`.
///
/// Each step of the series is read as one day.
///
/// # Errors
///
/// Fails on a negative or non-finite threshold and on non-finite series
/// values. An empty series is not an error: it yields an unbounded,
/// low-likelihood prediction with `samples == 0`.
pub fn estimate_breach(
    series_id: impl Into<SeriesId>,
    series: &[f64],
    threshold: f64,
    policy: &BreachPolicy,
) -> Result<BreachPrediction> {
    let series_id = series_id.into();

    if !threshold.is_finite() {
        return Err(Error::InvalidInput(format!(
            "threshold for series {} is not a finite number",
            series_id
        )));
    }
    if threshold < 0.0 {
        return Err(Error::NegativeThreshold {
            series_id: series_id.to_string(),
            threshold,
        });
    }
    validate_series(series_id.as_str(), series)?;

    let Some(&current) = series.last() else {
        return Ok(BreachPrediction {
            series_id,
            current_value: 0.0,
            threshold,
            change_rate: 0.0,
            days_to_breach: None,
            probability_bucket: ProbabilityBucket::Low,
            samples: 0,
        });
    };

    let change_rate = mean_first_difference(series);
    let days_to_breach = if current >= threshold {
        Some(0)
    } else if change_rate <= 0.0 {
        None
    } else {
        Some(ceil_capped(
            (threshold - current) / change_rate,
            policy.max_horizon_days,
        ))
    };

    Ok(BreachPrediction {
        series_id,
        current_value: current,
        threshold,
        change_rate,
        days_to_breach,
        probability_bucket: bucket_for_days(days_to_breach, policy),
        samples: series.len(),
    })
}

/// Likelihood bucket for a days-to-breach value. Cutoffs are inclusive.
pub fn bucket_for_days(days: Option<u32>, policy: &BreachPolicy) -> ProbabilityBucket {
    match days {
        None => ProbabilityBucket::Low,
        Some(d) if d <= policy.critical_within_days => ProbabilityBucket::Critical,
        Some(d) if d <= policy.high_within_days => ProbabilityBucket::High,
        Some(d) if d <= policy.medium_within_days => ProbabilityBucket::Medium,
        Some(_) => ProbabilityBucket::Low,
    }
}
