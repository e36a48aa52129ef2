//! Policy presets for common deployment postures.
//!
//! Provides pre-built policies for:
//! - Balanced: the built-in defaults
//! - Sensitive: earlier trend and breach alerts, heavier incident weighting
//! - Relaxed: fewer alerts for noisy, high-volume event logs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::policy::{BreachPolicy, InsightPolicy, Policy, ScoringPolicy, TrendPolicy};
use crate::validate::ValidationError;

/// Available policy presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    Balanced,
    Sensitive,
    Relaxed,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[
        PresetName::Balanced,
        PresetName::Sensitive,
        PresetName::Relaxed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Balanced => "balanced",
            PresetName::Sensitive => "sensitive",
            PresetName::Relaxed => "relaxed",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "balanced" | "default" => Some(PresetName::Balanced),
            "sensitive" | "strict" | "early-warning" => Some(PresetName::Sensitive),
            "relaxed" | "quiet" | "lenient" => Some(PresetName::Relaxed),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Balanced => "Built-in defaults: ±10% trend cutoff, 7/30/60-day breach buckets",
            PresetName::Sensitive => {
                "Earlier alerts: ±5% trend cutoff, 14/45/90-day breach buckets, heavier incident weight"
            }
            PresetName::Relaxed => {
                "Fewer alerts: ±20% trend cutoff, 3/14/30-day breach buckets, for noisy logs"
            }
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| ValidationError::UnknownPreset(s.to_string()))
    }
}

/// Build the policy for a preset.
pub fn get_preset(name: PresetName) -> Policy {
    match name {
        PresetName::Balanced => Policy {
            policy_id: Some("preset-balanced".to_string()),
            ..Policy::default()
        },
        PresetName::Sensitive => Policy {
            policy_id: Some("preset-sensitive".to_string()),
            description: Some(name.description().to_string()),
            trend: TrendPolicy {
                change_threshold: 0.05,
                ..TrendPolicy::default()
            },
            breach: BreachPolicy {
                critical_within_days: 14,
                high_within_days: 45,
                medium_within_days: 90,
                ..BreachPolicy::default()
            },
            scoring: ScoringPolicy {
                incident_weight: 0.75,
                category_unit_penalty: 8.0,
                ..ScoringPolicy::default()
            },
            insights: InsightPolicy {
                include_stable_trends: true,
                ..InsightPolicy::default()
            },
            ..Policy::default()
        },
        PresetName::Relaxed => Policy {
            policy_id: Some("preset-relaxed".to_string()),
            description: Some(name.description().to_string()),
            trend: TrendPolicy {
                change_threshold: 0.20,
                ..TrendPolicy::default()
            },
            breach: BreachPolicy {
                critical_within_days: 3,
                high_within_days: 14,
                medium_within_days: 30,
                ..BreachPolicy::default()
            },
            scoring: ScoringPolicy {
                incident_weight: 0.25,
                category_unit_penalty: 2.5,
                ..ScoringPolicy::default()
            },
            insights: InsightPolicy {
                min_confidence: 0.5,
                ..InsightPolicy::default()
            },
            ..Policy::default()
        },
    }
}

/// Preset listing entry for `config presets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: PresetName,
    pub description: String,
}

/// List all presets with descriptions.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|name| PresetInfo {
            name: *name,
            description: name.description().to_string(),
        })
        .collect()
}
