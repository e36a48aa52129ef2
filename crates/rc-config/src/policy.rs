//! Forecast policy types.
//!
//! Every numeric constant the estimators use lives here so deployments can
//! tune cutoffs without code changes. Sections missing from a policy file
//! fall back to their defaults.

use rc_common::RiskCategory;
use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Complete forecast policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub schema_version: String,

    #[serde(default)]
    pub policy_id: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub trend: TrendPolicy,

    #[serde(default)]
    pub breach: BreachPolicy,

    #[serde(default)]
    pub scoring: ScoringPolicy,

    #[serde(default)]
    pub insights: InsightPolicy,

    #[serde(default)]
    pub cache: CachePolicy,

    #[serde(default)]
    pub notes: Option<String>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            policy_id: Some("builtin-default".to_string()),
            description: Some("Built-in forecast policy".to_string()),
            trend: TrendPolicy::default(),
            breach: BreachPolicy::default(),
            scoring: ScoringPolicy::default(),
            insights: InsightPolicy::default(),
            cache: CachePolicy::default(),
            notes: None,
        }
    }
}

impl Policy {
    /// Load policy from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_json(&content)
    }

    /// Parse policy from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Serialize to pretty JSON, e.g. for `config show`.
    pub fn to_json_pretty(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ValidationError::ParseError(format!("Serialization failed: {}", e)))
    }
}

/// Trend estimator constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendPolicy {
    /// Relative half-over-half change beyond which a trend is directional.
    pub change_threshold: f64,
    /// Trailing window for the rolling average.
    pub rolling_window: usize,
    /// Projection multiplier applied to increasing series.
    pub increasing_multiplier: f64,
    /// Projection multiplier applied to decreasing series.
    pub decreasing_multiplier: f64,
    /// Lower clamp for trend confidence; may not go below 0.1.
    pub confidence_floor: f64,
    /// Upper clamp for trend confidence; may not exceed 0.9.
    pub confidence_ceiling: f64,
    /// Confidence reported when there is too little data to estimate.
    pub insufficient_data_confidence: f64,
}

impl Default for TrendPolicy {
    fn default() -> Self {
        Self {
            change_threshold: 0.10,
            rolling_window: 3,
            increasing_multiplier: 1.1,
            decreasing_multiplier: 0.9,
            confidence_floor: 0.1,
            confidence_ceiling: 0.9,
            insufficient_data_confidence: 0.3,
        }
    }
}

/// Breach estimator constants.
///
/// A projection of `d` days falls in the first bucket whose cutoff is `>= d`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreachPolicy {
    /// Longest projection reported; longer ones are capped here.
    pub max_horizon_days: u32,
    pub critical_within_days: u32,
    pub high_within_days: u32,
    pub medium_within_days: u32,
}

impl Default for BreachPolicy {
    fn default() -> Self {
        Self {
            max_horizon_days: 365,
            critical_within_days: 7,
            high_within_days: 30,
            medium_within_days: 60,
        }
    }
}

/// Composite scorer weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Risk index with no incidents, full control effectiveness, no vendors.
    pub base_score: f64,
    pub incident_weight: f64,
    pub incident_cap: f64,
    /// Added in full when control effectiveness is 0 %, scaled linearly above.
    pub control_gap_weight: f64,
    pub vendor_weight: f64,
    pub vendor_cap: f64,
    pub kri_breach_weight: f64,
    pub kri_breach_cap: f64,
    /// Points removed from a category's 100-point score per unit of event value.
    pub category_unit_penalty: f64,
    /// Categories reported by the category scorer, in order.
    pub categories: Vec<String>,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            base_score: 1.0,
            incident_weight: 0.5,
            incident_cap: 4.0,
            control_gap_weight: 3.0,
            vendor_weight: 0.5,
            vendor_cap: 2.0,
            kri_breach_weight: 0.25,
            kri_breach_cap: 1.0,
            category_unit_penalty: 5.0,
            categories: RiskCategory::all()
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
        }
    }
}

/// Insight record shaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightPolicy {
    /// Insights below this confidence are marked suppressed.
    pub min_confidence: f64,
    /// Whether stable trends produce insight records at all.
    pub include_stable_trends: bool,
}

impl Default for InsightPolicy {
    fn default() -> Self {
        Self {
            min_confidence: 0.35,
            include_stable_trends: false,
        }
    }
}

/// Forecast result caching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    /// Time-to-live for cached reports, at most one week. Zero disables
    /// caching.
    pub ttl_seconds: u64,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self { ttl_seconds: 900 }
    }
}
