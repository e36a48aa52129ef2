//! Records produced by the estimators.
//!
//! These are plain values handed to the downstream consumer for storage and
//! display. Fields are `skip_serializing_if` only where absence carries
//! meaning (an unbounded breach horizon serializes as `null`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::id::SeriesId;

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Trend direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trend estimate for one category's bucketed series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub category: String,
    pub direction: TrendDirection,
    /// Absolute relative change between the two halves, in percent.
    pub magnitude: f64,
    /// Mean of the trailing window.
    pub rolling_average: f64,
    /// Heuristic one-step projection. Not a statistical forecast.
    pub predicted_next: f64,
    /// In `[0.1, 0.9]`; sits at the insufficient-data value for degraded results.
    pub confidence: f64,
    /// Number of points the estimate was computed from.
    pub samples: usize,
}

// ---------------------------------------------------------------------------
// Breach
// ---------------------------------------------------------------------------

/// Coarse likelihood bucket derived from days-to-breach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityBucket {
    Low,
    Medium,
    High,
    Critical,
}

impl ProbabilityBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbabilityBucket::Low => "low",
            ProbabilityBucket::Medium => "medium",
            ProbabilityBucket::High => "high",
            ProbabilityBucket::Critical => "critical",
        }
    }
}

impl fmt::Display for ProbabilityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold-breach projection for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachPrediction {
    pub series_id: SeriesId,
    pub current_value: f64,
    pub threshold: f64,
    /// Mean change per step across the series.
    pub change_rate: f64,
    /// `None` when the series never reaches the threshold on its current
    /// trajectory. Otherwise capped at the configured horizon.
    pub days_to_breach: Option<u32>,
    pub probability_bucket: ProbabilityBucket,
    pub samples: usize,
}

impl BreachPrediction {
    /// Whether the threshold is already met or exceeded.
    pub fn is_breached(&self) -> bool {
        self.days_to_breach == Some(0)
    }
}

// ---------------------------------------------------------------------------
// Composite score
// ---------------------------------------------------------------------------

/// Range a composite score is expressed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
    /// Overall risk index in `[1, 10]`; higher is riskier.
    RiskIndex,
    /// Category resilience in `[0, 100]`; higher is healthier.
    Percent,
}

impl ScoreScale {
    /// Inclusive `(min, max)` bounds of the scale.
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            ScoreScale::RiskIndex => (1.0, 10.0),
            ScoreScale::Percent => (0.0, 100.0),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        let (lo, hi) = self.bounds();
        (lo..=hi).contains(&value)
    }
}

/// Combined score with its per-component breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeRiskScore {
    pub overall_score: f64,
    pub scale: ScoreScale,
    pub component_scores: BTreeMap<String, f64>,
}
