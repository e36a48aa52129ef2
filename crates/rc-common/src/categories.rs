//! Risk category taxonomy.
//!
//! Category tags on incoming rows are free-form strings. The standard
//! categories below are the ones the composite scorer reports on by default;
//! [`RiskCategory::parse`] maps common aliases onto them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard risk categories used for sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    /// Process failures, outages, human error.
    Operational,
    /// Security incidents and breaches.
    Cyber,
    /// Regulatory and policy violations.
    Compliance,
    /// Losses, fraud, credit and market events.
    Financial,
    /// Brand and public-perception events.
    Reputational,
}

impl RiskCategory {
    /// All categories in reporting order.
    pub fn all() -> &'static [RiskCategory] {
        &[
            RiskCategory::Operational,
            RiskCategory::Cyber,
            RiskCategory::Compliance,
            RiskCategory::Financial,
            RiskCategory::Reputational,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Operational => "operational",
            RiskCategory::Cyber => "cyber",
            RiskCategory::Compliance => "compliance",
            RiskCategory::Financial => "financial",
            RiskCategory::Reputational => "reputational",
        }
    }

    /// Parse a category tag, case-insensitively, accepting common aliases.
    pub fn parse(tag: &str) -> Option<RiskCategory> {
        match tag.trim().to_lowercase().as_str() {
            "operational" | "operations" | "ops" => Some(RiskCategory::Operational),
            "cyber" | "security" | "infosec" | "it_security" => Some(RiskCategory::Cyber),
            "compliance" | "regulatory" | "legal" => Some(RiskCategory::Compliance),
            "financial" | "finance" | "credit" | "market" => Some(RiskCategory::Financial),
            "reputational" | "reputation" | "brand" => Some(RiskCategory::Reputational),
            _ => None,
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskCategory::parse(s).ok_or_else(|| format!("unknown risk category: {}", s))
    }
}
