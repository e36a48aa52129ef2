//! Request-level forecast pipeline.
//!
//! One [`ForecastRequest`] carries an organization's rows for a window plus
//! the knobs for that request. [`ForecastEngine`] validates it, aggregates
//! rows into per-category series, runs the estimators, and assembles a
//! [`ForecastReport`]. The engine holds no mutable state; an injected
//! [`ForecastCache`] is the only thing shared across requests.

use chrono::{DateTime, Utc};
use rc_common::series::validate_points;
use rc_common::{
    BreachPrediction, CompositeRiskScore, Error, OrgId, ProbabilityBucket, Result,
    TimeSeriesPoint, TrendResult,
};
use rc_config::Policy;
use rc_math::rolling_means;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};

use crate::aggregate::{bucket_rows, bucket_rows_dense, sort_points, Accumulate, Bucketing};
use crate::breach::estimate_breach;
use crate::cache::{CacheKey, ForecastCache, MemoryForecastCache};
use crate::logging::{event_names, Stage};
use crate::scoring::{category_matches, score, score_categories, RiskInputs};
use crate::trend::estimate_trend;

/// Inclusive time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window, rejecting `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidWindow {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts <= self.end
    }
}

/// Everything needed to forecast one organization over one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub org_id: OrgId,
    /// Rows outside the window are ignored. Required for dense bucketing.
    pub window: Option<TimeWindow>,
    pub bucketing: Bucketing,
    /// Zero-fill buckets with no rows.
    pub dense: bool,
    pub accumulate: Accumulate,
    pub rows: Vec<TimeSeriesPoint>,
    /// Breach thresholds keyed by category tag.
    pub thresholds: BTreeMap<String, f64>,
    pub risk_inputs: Option<RiskInputs>,
}

impl ForecastRequest {
    pub fn new(org_id: impl Into<OrgId>, rows: Vec<TimeSeriesPoint>) -> Self {
        Self {
            org_id: org_id.into(),
            window: None,
            bucketing: Bucketing::default(),
            dense: false,
            accumulate: Accumulate::default(),
            rows,
            thresholds: BTreeMap::new(),
            risk_inputs: None,
        }
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_bucketing(mut self, bucketing: Bucketing) -> Self {
        self.bucketing = bucketing;
        self
    }

    pub fn dense(mut self, dense: bool) -> Self {
        self.dense = dense;
        self
    }

    pub fn with_accumulate(mut self, accumulate: Accumulate) -> Self {
        self.accumulate = accumulate;
        self
    }

    pub fn with_threshold(mut self, category: impl Into<String>, threshold: f64) -> Self {
        self.thresholds.insert(category.into(), threshold);
        self
    }

    pub fn with_risk_inputs(mut self, inputs: RiskInputs) -> Self {
        self.risk_inputs = Some(inputs);
        self
    }

    /// Cache key for this request, if it is cacheable (has a window).
    ///
    /// Rows are not part of the key: within a window, the data accessor is
    /// assumed to return the same rows until the entry expires.
    pub fn cache_key(&self) -> Option<CacheKey> {
        let window = self.window?;
        let thresholds = self
            .thresholds
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",");
        let inputs = self
            .risk_inputs
            .as_ref()
            .map(|i| {
                format!(
                    "{}/{}/{}/{}",
                    i.incident_count,
                    i.control_effectiveness_pct,
                    i.high_risk_vendor_count,
                    i.kri_breach_count
                )
            })
            .unwrap_or_default();
        Some(CacheKey {
            org_id: self.org_id.clone(),
            window_start: window.start,
            window_end: window.end,
            scope: format!(
                "{}|{}|{:?}|{}|{}",
                self.bucketing, self.dense, self.accumulate, thresholds, inputs
            ),
        })
    }
}

/// Per-category output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryForecast {
    pub category: String,
    /// Bucket keys, ascending; parallel to `series`.
    pub buckets: Vec<String>,
    pub series: Vec<f64>,
    /// Sliding means over `series` using the policy's rolling window.
    pub smoothed: Vec<f64>,
    pub trend: TrendResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breach: Option<BreachPrediction>,
}

/// Full output of one forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub org_id: OrgId,
    pub window: Option<TimeWindow>,
    pub bucketing: Bucketing,
    pub categories: Vec<CategoryForecast>,
    /// `[0, 100]` resilience per configured category.
    pub category_scores: CompositeRiskScore,
    /// `[1, 10]` risk index, when risk inputs were supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<CompositeRiskScore>,
    /// Rows that contributed after window filtering.
    pub row_count: usize,
}

impl ForecastReport {
    /// All breach predictions in category order.
    pub fn breaches(&self) -> impl Iterator<Item = &BreachPrediction> {
        self.categories.iter().filter_map(|c| c.breach.as_ref())
    }

    /// Highest breach bucket in the report.
    pub fn worst_breach(&self) -> Option<ProbabilityBucket> {
        self.breaches().map(|b| b.probability_bucket).max()
    }

    pub fn category(&self, name: &str) -> Option<&CategoryForecast> {
        self.categories.iter().find(|c| c.category == name)
    }
}

/// Composes aggregation, estimation, and scoring under one policy.
#[derive(Clone)]
pub struct ForecastEngine {
    policy: Policy,
    cache: Option<Arc<dyn ForecastCache>>,
}

impl ForecastEngine {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ForecastCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attach an in-memory cache using the policy's TTL. A zero TTL leaves
    /// the engine uncached.
    pub fn with_memory_cache(self) -> Self {
        let cache = MemoryForecastCache::new(self.policy.cache.ttl_seconds);
        if !cache.is_enabled() {
            return self;
        }
        self.with_cache(Arc::new(cache))
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Run the pipeline for `request` at the current time.
    pub fn forecast(&self, request: &ForecastRequest) -> Result<ForecastReport> {
        self.forecast_at(request, Utc::now())
    }

    /// Run the pipeline with an explicit clock for cache expiry.
    ///
    /// # Errors
    ///
    /// Fails fast on non-finite row values, invalid thresholds, out-of-range
    /// risk inputs, an inverted window, or dense bucketing without a window.
    pub fn forecast_at(
        &self,
        request: &ForecastRequest,
        now: DateTime<Utc>,
    ) -> Result<ForecastReport> {
        self.validate(request)?;

        let key = request.cache_key();
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(report) = cache.get(key, now) {
                debug!(
                    target: event_names::CACHE_HIT,
                    stage = %Stage::Cache,
                    org_id = %request.org_id,
                    "forecast served from cache"
                );
                return Ok(report);
            }
        }

        let report = self.compute(request)?;

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.put(key, report.clone(), now);
            debug!(
                target: event_names::CACHE_STORED,
                stage = %Stage::Cache,
                org_id = %request.org_id,
                "forecast cached"
            );
        }
        Ok(report)
    }

    fn validate(&self, request: &ForecastRequest) -> Result<()> {
        validate_points(&request.rows)?;
        if let Some(window) = &request.window {
            TimeWindow::new(window.start, window.end)?;
        } else if request.dense {
            return Err(Error::InvalidInput(
                "dense bucketing requires a time window".to_string(),
            ));
        }
        for (category, threshold) in &request.thresholds {
            if !threshold.is_finite() {
                return Err(Error::InvalidInput(format!(
                    "threshold for {} is not a finite number",
                    category
                )));
            }
            if *threshold < 0.0 {
                return Err(Error::NegativeThreshold {
                    series_id: category.clone(),
                    threshold: *threshold,
                });
            }
        }
        if let Some(inputs) = &request.risk_inputs {
            score(inputs, &self.policy.scoring)?;
        }
        Ok(())
    }

    fn compute(&self, request: &ForecastRequest) -> Result<ForecastReport> {
        let org = request.org_id.as_str();

        let mut rows: Vec<TimeSeriesPoint> = match &request.window {
            Some(window) => request
                .rows
                .iter()
                .filter(|row| window.contains(&row.timestamp))
                .cloned()
                .collect(),
            None => request.rows.clone(),
        };
        sort_points(&mut rows);

        let bucketed = match (&request.window, request.dense) {
            (Some(window), true) => bucket_rows_dense(
                &rows,
                request.bucketing,
                &window.start,
                &window.end,
                request.accumulate,
            )?,
            _ => bucket_rows(&rows, |ts| request.bucketing.key(ts), request.accumulate),
        };
        debug!(
            target: event_names::AGGREGATE_FINISHED,
            stage = %Stage::Aggregate,
            org_id = org,
            rows = rows.len(),
            categories = bucketed.len(),
            bucketing = %request.bucketing,
            "rows aggregated"
        );

        let observed: Vec<&String> = bucketed.keys().collect();
        let thresholds = resolve_thresholds(&request.thresholds, &observed);
        let names: BTreeSet<&String> = bucketed.keys().chain(thresholds.keys()).collect();
        let mut categories = Vec::with_capacity(names.len());
        for name in names {
            let (buckets, series): (Vec<String>, Vec<f64>) = bucketed
                .get(name)
                .map(|b| b.iter().map(|(k, v)| (k.clone(), *v)).unzip())
                .unwrap_or_default();

            let trend = estimate_trend(name, &series, &self.policy.trend);
            if trend.samples < 2 {
                debug!(
                    target: event_names::TREND_DEGRADED,
                    stage = %Stage::Trend,
                    org_id = org,
                    category = name.as_str(),
                    samples = trend.samples,
                    "insufficient data for trend"
                );
            } else {
                debug!(
                    target: event_names::TREND_ESTIMATED,
                    stage = %Stage::Trend,
                    org_id = org,
                    category = name.as_str(),
                    direction = %trend.direction,
                    confidence = trend.confidence,
                    "trend estimated"
                );
            }

            let breach = match thresholds.get(name) {
                Some(threshold) => {
                    let prediction =
                        estimate_breach(name.as_str(), &series, *threshold, &self.policy.breach)?;
                    if prediction.probability_bucket == ProbabilityBucket::Critical {
                        info!(
                            target: event_names::BREACH_IMMINENT,
                            stage = %Stage::Breach,
                            org_id = org,
                            category = name.as_str(),
                            days_to_breach = ?prediction.days_to_breach,
                            "threshold breach imminent"
                        );
                    } else {
                        debug!(
                            target: event_names::BREACH_ESTIMATED,
                            stage = %Stage::Breach,
                            org_id = org,
                            category = name.as_str(),
                            bucket = %prediction.probability_bucket,
                            "breach projected"
                        );
                    }
                    Some(prediction)
                }
                None => None,
            };

            categories.push(CategoryForecast {
                category: name.clone(),
                smoothed: rolling_means(&series, self.policy.trend.rolling_window),
                buckets,
                series,
                trend,
                breach,
            });
        }

        let category_scores = score_categories(&rows, &self.policy.scoring);
        let composite = request
            .risk_inputs
            .as_ref()
            .map(|inputs| score(inputs, &self.policy.scoring))
            .transpose()?;
        debug!(
            target: event_names::SCORE_COMPUTED,
            stage = %Stage::Score,
            org_id = org,
            category_overall = category_scores.overall_score,
            risk_index = ?composite.as_ref().map(|c| c.overall_score),
            "scores computed"
        );

        info!(
            target: event_names::FORECAST_FINISHED,
            stage = %Stage::Report,
            org_id = org,
            categories = categories.len(),
            "forecast complete"
        );

        Ok(ForecastReport {
            org_id: request.org_id.clone(),
            window: request.window,
            bucketing: request.bucketing,
            categories,
            category_scores,
            composite,
            row_count: rows.len(),
        })
    }
}

/// Attach each threshold to the observed categories it names, matching the
/// way category scoring does (case-insensitive, aliases resolved). A key
/// that is itself an observed category keeps that category's threshold.
/// Thresholds naming nothing observed stay under their own key.
fn resolve_thresholds(
    thresholds: &BTreeMap<String, f64>,
    observed: &[&String],
) -> BTreeMap<String, f64> {
    let mut resolved = BTreeMap::new();
    for (key, threshold) in thresholds {
        let mut matched = false;
        for category in observed.iter().filter(|c| category_matches(key, c)) {
            matched = true;
            if *category == key || !thresholds.contains_key(category.as_str()) {
                resolved.insert((*category).clone(), *threshold);
            }
        }
        if !matched {
            resolved.insert(key.clone(), *threshold);
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rc_common::TrendDirection;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 9, 0, 0).unwrap()
    }

    fn kri_rows(values: &[f64], category: &str) -> Vec<TimeSeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(day(i as u32 + 1), *v, category))
            .collect()
    }

    fn engine() -> ForecastEngine {
        ForecastEngine::new(Policy::default())
    }

    #[test]
    fn daily_kri_forecast() {
        let request = ForecastRequest::new(
            "org-1",
            kri_rows(&[85.0, 87.0, 89.0, 91.0, 93.0, 95.0], "cyber"),
        )
        .with_bucketing(Bucketing::Day)
        .with_threshold("cyber", 100.0);

        let report = engine().forecast(&request).unwrap();
        let cyber = report.category("cyber").unwrap();
        assert_eq!(cyber.series.len(), 6);
        assert_eq!(cyber.buckets[0], "2024-01-01");
        // halves average 87 and 93: a 6.9% rise stays under the 10% threshold
        assert_eq!(cyber.trend.direction, TrendDirection::Stable);
        let breach = cyber.breach.as_ref().unwrap();
        assert_eq!(breach.days_to_breach, Some(3));
        assert_eq!(report.worst_breach(), Some(ProbabilityBucket::Critical));
        assert_eq!(report.row_count, 6);
    }

    #[test]
    fn rows_arrive_unsorted() {
        let mut rows = kri_rows(&[1.0, 2.0, 3.0, 4.0], "ops");
        rows.reverse();
        let request = ForecastRequest::new("org-1", rows).with_bucketing(Bucketing::Day);
        let report = engine().forecast(&request).unwrap();
        assert_eq!(report.category("ops").unwrap().series, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn threshold_without_rows_is_degraded() {
        let request = ForecastRequest::new("org-1", Vec::new()).with_threshold("financial", 5.0);
        let report = engine().forecast(&request).unwrap();
        let fin = report.category("financial").unwrap();
        assert_eq!(fin.trend.confidence, 0.3);
        assert_eq!(fin.breach.as_ref().unwrap().samples, 0);
        assert_eq!(fin.breach.as_ref().unwrap().days_to_breach, None);
    }

    #[test]
    fn window_filters_and_dense_fills() {
        let rows = kri_rows(&[1.0, 1.0, 1.0, 1.0, 1.0], "cyber");
        let window = TimeWindow::new(day(2), day(8)).unwrap();
        let request = ForecastRequest::new("org-1", rows)
            .with_bucketing(Bucketing::Day)
            .with_window(window)
            .dense(true);
        let report = engine().forecast(&request).unwrap();
        let cyber = report.category("cyber").unwrap();
        assert_eq!(cyber.series, vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(report.row_count, 4);
    }

    #[test]
    fn dense_without_window_is_rejected() {
        let request = ForecastRequest::new("org-1", Vec::new()).dense(true);
        assert!(matches!(
            engine().forecast(&request),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn non_finite_rows_fail_fast() {
        let request = ForecastRequest::new("org-1", kri_rows(&[1.0, f64::NAN], "cyber"));
        assert!(matches!(
            engine().forecast(&request),
            Err(Error::NonFiniteValue { index: 1, .. })
        ));
    }

    #[test]
    fn negative_threshold_fails_fast() {
        let request =
            ForecastRequest::new("org-1", kri_rows(&[1.0], "cyber")).with_threshold("cyber", -2.0);
        assert!(matches!(
            engine().forecast(&request),
            Err(Error::NegativeThreshold { .. })
        ));
    }

    #[test]
    fn composite_included_when_inputs_given() {
        let request = ForecastRequest::new("org-1", Vec::new()).with_risk_inputs(RiskInputs {
            incident_count: 0,
            control_effectiveness_pct: 100.0,
            high_risk_vendor_count: 0,
            kri_breach_count: 0,
        });
        let report = engine().forecast(&request).unwrap();
        assert_eq!(report.composite.unwrap().overall_score, 1.0);
        assert_eq!(report.category_scores.overall_score, 100.0);
    }

    #[test]
    fn cache_serves_repeat_requests() {
        let cache = Arc::new(MemoryForecastCache::new(60));
        let engine = engine().with_cache(cache.clone());
        let window = TimeWindow::new(day(1), day(10)).unwrap();
        let first = ForecastRequest::new("org-1", kri_rows(&[1.0, 2.0], "cyber"))
            .with_window(window);
        let t0 = Utc::now();
        let a = engine.forecast_at(&first, t0).unwrap();
        assert_eq!(cache.len(), 1);

        // Same key, different rows: served from cache until expiry.
        let second = ForecastRequest::new("org-1", kri_rows(&[9.0, 9.0, 9.0], "cyber"))
            .with_window(window);
        let b = engine.forecast_at(&second, t0 + Duration::seconds(30)).unwrap();
        assert_eq!(a, b);

        let c = engine.forecast_at(&second, t0 + Duration::seconds(61)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn memory_cache_uses_policy_ttl() {
        let mut policy = Policy::default();
        policy.cache.ttl_seconds = 5;
        let engine = ForecastEngine::new(policy).with_memory_cache();
        let window = TimeWindow::new(day(1), day(10)).unwrap();
        let t0 = Utc::now();
        let first = ForecastRequest::new("org-1", kri_rows(&[1.0, 2.0], "cyber")).with_window(window);
        let second =
            ForecastRequest::new("org-1", kri_rows(&[7.0, 7.0], "cyber")).with_window(window);
        let a = engine.forecast_at(&first, t0).unwrap();
        assert_eq!(engine.forecast_at(&second, t0 + Duration::seconds(4)).unwrap(), a);
        assert_ne!(engine.forecast_at(&second, t0 + Duration::seconds(5)).unwrap(), a);
    }

    #[test]
    fn zero_ttl_policy_leaves_engine_uncached() {
        let mut policy = Policy::default();
        policy.cache.ttl_seconds = 0;
        let engine = ForecastEngine::new(policy).with_memory_cache();
        assert!(engine.cache.is_none());
    }

    #[test]
    fn thresholds_resolve_case_and_alias() {
        let mut rows = kri_rows(&[85.0, 90.0, 95.0], "cyber");
        rows.extend(kri_rows(&[10.0, 11.0, 12.0], "ops"));
        let request = ForecastRequest::new("org-1", rows)
            .with_bucketing(Bucketing::Day)
            .with_threshold("Cyber", 100.0)
            .with_threshold("operational", 50.0);

        let report = engine().forecast(&request).unwrap();
        let names: Vec<&str> = report.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["cyber", "ops"]);

        let cyber = report.category("cyber").unwrap().breach.as_ref().unwrap();
        assert_eq!(cyber.threshold, 100.0);
        assert_eq!(cyber.samples, 3);
        let ops = report.category("ops").unwrap().breach.as_ref().unwrap();
        assert_eq!(ops.threshold, 50.0);
    }

    #[test]
    fn exact_threshold_key_wins_over_alias() {
        let thresholds: BTreeMap<String, f64> =
            [("cyber".to_string(), 10.0), ("Security".to_string(), 20.0)]
                .into_iter()
                .collect();
        let cyber = "cyber".to_string();
        let resolved = resolve_thresholds(&thresholds, &[&cyber]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.get("cyber"), Some(&10.0));

        let unmatched = resolve_thresholds(&thresholds, &[]);
        assert_eq!(unmatched.len(), 2);
    }

    #[test]
    fn windowless_requests_are_not_cached() {
        let cache = Arc::new(MemoryForecastCache::new(60));
        let engine = engine().with_cache(cache.clone());
        engine
            .forecast(&ForecastRequest::new("org-1", kri_rows(&[1.0], "cyber")))
            .unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn forecast_is_idempotent() {
        let request = ForecastRequest::new("org-1", kri_rows(&[3.0, 1.0, 4.0, 1.0, 5.0], "cyber"))
            .with_threshold("cyber", 10.0);
        assert_eq!(
            engine().forecast(&request).unwrap(),
            engine().forecast(&request).unwrap()
        );
    }
}
