//! Display-agnostic insight records.
//!
//! Insights reshape a [`ForecastReport`] into flat records a presentation
//! layer can render however it likes. No prose is generated here: each
//! record carries a machine label, a severity, and the number behind it.
//!
//! Low-confidence insights are kept and flagged `suppressed`, so a
//! consumer can tell "nothing to report" apart from "not enough data".

use rc_common::{ProbabilityBucket, TrendDirection};
use rc_config::InsightPolicy;
use serde::{Deserialize, Serialize};

use crate::engine::ForecastReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Trend,
    Breach,
    CategoryScore,
    CompositeScore,
}

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSeverity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl InsightSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightSeverity::Info => "info",
            InsightSeverity::Low => "low",
            InsightSeverity::Medium => "medium",
            InsightSeverity::High => "high",
            InsightSeverity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for InsightSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ProbabilityBucket> for InsightSeverity {
    fn from(bucket: ProbabilityBucket) -> Self {
        match bucket {
            ProbabilityBucket::Low => InsightSeverity::Low,
            ProbabilityBucket::Medium => InsightSeverity::Medium,
            ProbabilityBucket::High => InsightSeverity::High,
            ProbabilityBucket::Critical => InsightSeverity::Critical,
        }
    }
}

/// One insight record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    /// Category the insight concerns; `None` for organization-wide scores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Stable dotted label, e.g. `trend.increasing` or `breach.critical`.
    pub label: String,
    pub severity: InsightSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// The number behind the insight: trend magnitude in percent, days to
    /// breach, or a score. `None` for an unbounded breach horizon.
    pub metric: Option<f64>,
    pub suppressed: bool,
}

/// Build insights for a report, most severe first.
///
/// Within one severity, records keep report order: trends and breaches per
/// category, then category scores, then the composite index.
pub fn build_insights(report: &ForecastReport, policy: &InsightPolicy) -> Vec<Insight> {
    let mut insights = Vec::new();

    for forecast in &report.categories {
        let trend = &forecast.trend;
        if trend.direction != TrendDirection::Stable || policy.include_stable_trends {
            insights.push(Insight {
                kind: InsightKind::Trend,
                category: Some(forecast.category.clone()),
                label: format!("trend.{}", trend.direction),
                severity: trend_severity(trend.direction, trend.magnitude),
                confidence: Some(trend.confidence),
                metric: Some(trend.magnitude),
                suppressed: trend.samples < 2 || trend.confidence < policy.min_confidence,
            });
        }

        if let Some(breach) = &forecast.breach {
            insights.push(Insight {
                kind: InsightKind::Breach,
                category: Some(forecast.category.clone()),
                label: format!("breach.{}", breach.probability_bucket),
                severity: breach.probability_bucket.into(),
                confidence: None,
                metric: breach.days_to_breach.map(f64::from),
                // A single point can still show the threshold already met.
                suppressed: breach.samples == 0 || (breach.samples < 2 && !breach.is_breached()),
            });
        }
    }

    for (category, value) in &report.category_scores.component_scores {
        if *value >= 100.0 {
            continue;
        }
        insights.push(Insight {
            kind: InsightKind::CategoryScore,
            category: Some(category.clone()),
            label: "score.category".to_string(),
            severity: category_severity(*value),
            confidence: None,
            metric: Some(*value),
            suppressed: false,
        });
    }

    if let Some(composite) = &report.composite {
        insights.push(Insight {
            kind: InsightKind::CompositeScore,
            category: None,
            label: "score.risk_index".to_string(),
            severity: risk_index_severity(composite.overall_score),
            confidence: None,
            metric: Some(composite.overall_score),
            suppressed: false,
        });
    }

    insights.sort_by(|a, b| b.severity.cmp(&a.severity));
    insights
}

fn trend_severity(direction: TrendDirection, magnitude: f64) -> InsightSeverity {
    match direction {
        TrendDirection::Increasing if magnitude >= 50.0 => InsightSeverity::High,
        TrendDirection::Increasing if magnitude >= 25.0 => InsightSeverity::Medium,
        TrendDirection::Increasing => InsightSeverity::Low,
        TrendDirection::Decreasing | TrendDirection::Stable => InsightSeverity::Info,
    }
}

/// Severity of a `[0, 100]` resilience score; lower scores are worse.
fn category_severity(score: f64) -> InsightSeverity {
    if score < 25.0 {
        InsightSeverity::High
    } else if score < 50.0 {
        InsightSeverity::Medium
    } else if score < 75.0 {
        InsightSeverity::Low
    } else {
        InsightSeverity::Info
    }
}

/// Severity of a `[1, 10]` risk index.
fn risk_index_severity(index: f64) -> InsightSeverity {
    if index >= 8.0 {
        InsightSeverity::Critical
    } else if index >= 6.0 {
        InsightSeverity::High
    } else if index >= 4.0 {
        InsightSeverity::Medium
    } else if index >= 2.0 {
        InsightSeverity::Low
    } else {
        InsightSeverity::Info
    }
}
