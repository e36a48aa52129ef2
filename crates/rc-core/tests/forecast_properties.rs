//! Property-based tests for the estimators and the scoring model.

use proptest::prelude::*;
use rc_common::{ProbabilityBucket, ScoreScale, TimeSeriesPoint, TrendDirection};
use rc_config::{BreachPolicy, ScoringPolicy, TrendPolicy};
use rc_core::aggregate::{aggregate, Accumulate, Bucketing};
use rc_core::breach::{bucket_for_days, estimate_breach};
use rc_core::scoring::{score, score_categories, RiskInputs};
use rc_core::trend::estimate_trend;

use chrono::{Duration, TimeZone, Utc};

fn finite_series(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..1_000.0, 0..max_len)
}

/// Signed series: all-negative, mixed around zero, or with a sprinkling of
/// exact zeros.
fn signed_series(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop_oneof![
        prop::collection::vec(-1_000.0f64..-0.001, 0..max_len),
        prop::collection::vec(-1_000.0f64..1_000.0, 0..max_len),
        prop::collection::vec(prop_oneof![Just(0.0f64), -50.0f64..50.0], 0..max_len),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn short_series_are_stable_at_insufficient_confidence(v in prop::collection::vec(-1e6f64..1e6, 0..2)) {
        let policy = TrendPolicy::default();
        let t = estimate_trend("cyber", &v, &policy);
        prop_assert_eq!(t.direction, TrendDirection::Stable);
        prop_assert_eq!(t.confidence, policy.insufficient_data_confidence);
        prop_assert_eq!(t.magnitude, 0.0);
        prop_assert_eq!(t.samples, v.len());
    }

    #[test]
    fn all_zero_series_are_stable(n in 0usize..50) {
        let t = estimate_trend("cyber", &vec![0.0; n], &TrendPolicy::default());
        prop_assert_eq!(t.direction, TrendDirection::Stable);
        prop_assert_eq!(t.predicted_next, 0.0);
    }

    #[test]
    fn trend_confidence_stays_in_band(v in finite_series(64)) {
        let policy = TrendPolicy::default();
        let t = estimate_trend("ops", &v, &policy);
        prop_assert!(t.confidence >= policy.confidence_floor.min(policy.insufficient_data_confidence));
        prop_assert!(t.confidence <= policy.confidence_ceiling.max(policy.insufficient_data_confidence));
        prop_assert!(t.magnitude >= 0.0);
        prop_assert!(t.rolling_average.is_finite());
        prop_assert!(t.predicted_next.is_finite());
    }

    #[test]
    fn signed_trend_confidence_stays_in_band(v in signed_series(64)) {
        let policy = TrendPolicy::default();
        let t = estimate_trend("ops", &v, &policy);
        prop_assert!(t.confidence >= 0.1 && t.confidence <= 0.9, "confidence {}", t.confidence);
        prop_assert!(t.magnitude >= 0.0);
        prop_assert!(t.predicted_next.is_finite());
    }

    #[test]
    fn rolling_average_is_mean_of_trailing_window(v in signed_series(64)) {
        prop_assume!(!v.is_empty());
        let t = estimate_trend("kri", &v, &TrendPolicy::default());
        let tail = &v[v.len() - v.len().min(3)..];
        let expected = tail.iter().sum::<f64>() / tail.len() as f64;
        prop_assert_eq!(t.rolling_average, expected);
    }

    #[test]
    fn trend_is_deterministic(v in finite_series(64)) {
        let policy = TrendPolicy::default();
        prop_assert_eq!(estimate_trend("x", &v, &policy), estimate_trend("x", &v, &policy));
    }

    #[test]
    fn scaling_preserves_direction(v in prop::collection::vec(1.0f64..1_000.0, 2..40), k in 1.0f64..100.0) {
        let policy = TrendPolicy::default();
        let scaled: Vec<f64> = v.iter().map(|x| x * k).collect();
        let a = estimate_trend("x", &v, &policy);
        let b = estimate_trend("x", &scaled, &policy);
        prop_assert_eq!(a.direction, b.direction);
        prop_assert!((a.magnitude - b.magnitude).abs() < 1e-6);
    }

    #[test]
    fn at_or_over_threshold_is_zero_days(v in prop::collection::vec(0.0f64..1_000.0, 1..40), margin in 0.0f64..100.0) {
        let last = *v.last().unwrap();
        let threshold = (last - margin).max(0.0);
        let p = estimate_breach("kri", &v, threshold, &BreachPolicy::default()).unwrap();
        prop_assert_eq!(p.days_to_breach, Some(0));
        prop_assert_eq!(p.probability_bucket, ProbabilityBucket::Critical);
    }

    #[test]
    fn flat_or_falling_below_threshold_never_breaches(start in 0.0f64..500.0, step in 0.0f64..10.0, n in 2usize..30) {
        let v: Vec<f64> = (0..n).map(|i| start - step * i as f64).collect();
        let threshold = start + 1.0;
        let p = estimate_breach("kri", &v, threshold, &BreachPolicy::default()).unwrap();
        prop_assert_eq!(p.days_to_breach, None);
        prop_assert_eq!(p.probability_bucket, ProbabilityBucket::Low);
    }

    #[test]
    fn breach_days_respect_horizon(v in prop::collection::vec(0.0f64..1_000.0, 2..40), threshold in 0.0f64..1e9) {
        let policy = BreachPolicy::default();
        let p = estimate_breach("kri", &v, threshold, &policy).unwrap();
        if let Some(days) = p.days_to_breach {
            prop_assert!(days <= policy.max_horizon_days);
        }
        prop_assert_eq!(p.probability_bucket, bucket_for_days(p.days_to_breach, &policy));
    }

    #[test]
    fn buckets_are_monotone_in_days(a in 0u32..400, b in 0u32..400) {
        let policy = BreachPolicy::default();
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(bucket_for_days(Some(near), &policy) >= bucket_for_days(Some(far), &policy));
    }

    #[test]
    fn risk_index_stays_on_scale(
        incidents in 0u32..10_000,
        pct in 0.0f64..=100.0,
        vendors in 0u32..10_000,
        kris in 0u32..10_000,
    ) {
        let s = score(
            &RiskInputs {
                incident_count: incidents,
                control_effectiveness_pct: pct,
                high_risk_vendor_count: vendors,
                kri_breach_count: kris,
            },
            &ScoringPolicy::default(),
        )
        .unwrap();
        prop_assert!(ScoreScale::RiskIndex.contains(s.overall_score));
    }

    #[test]
    fn more_incidents_never_lower_the_index(a in 0u32..100, b in 0u32..100, pct in 0.0f64..=100.0) {
        let policy = ScoringPolicy::default();
        let at = |n: u32| {
            score(
                &RiskInputs {
                    incident_count: n,
                    control_effectiveness_pct: pct,
                    high_risk_vendor_count: 0,
                    kri_breach_count: 0,
                },
                &policy,
            )
            .unwrap()
            .overall_score
        };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(at(lo) <= at(hi));
    }

    #[test]
    fn effectiveness_outside_percent_is_rejected(pct in prop_oneof![-1e6f64..-0.001, 100.001f64..1e6]) {
        let r = score(
            &RiskInputs {
                incident_count: 0,
                control_effectiveness_pct: pct,
                high_risk_vendor_count: 0,
                kri_breach_count: 0,
            },
            &ScoringPolicy::default(),
        );
        prop_assert!(r.is_err());
    }

    #[test]
    fn category_scores_stay_on_percent_scale(values in prop::collection::vec(0.0f64..50.0, 0..40)) {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let categories = ["cyber", "Financial", "ops", "unknown"];
        let rows: Vec<TimeSeriesPoint> = values
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(base + Duration::hours(i as i64), *v, categories[i % categories.len()]))
            .collect();
        let s = score_categories(&rows, &ScoringPolicy::default());
        prop_assert!(ScoreScale::Percent.contains(s.overall_score));
        for value in s.component_scores.values() {
            prop_assert!(ScoreScale::Percent.contains(*value));
        }
    }

    #[test]
    fn aggregation_preserves_totals(values in prop::collection::vec(0.0f64..100.0, 0..60)) {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let rows: Vec<TimeSeriesPoint> = values
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(base + Duration::hours(7 * i as i64), *v, "cyber"))
            .collect();
        let total: f64 = values.iter().sum();
        let bucketed = aggregate(&rows, Bucketing::Day, Accumulate::Sum);
        let summed: f64 = bucketed.values().flat_map(|b| b.iter()).sum();
        prop_assert!((total - summed).abs() < 1e-6);
    }
}
