//! Policy snapshots for reproducible output.
//!
//! A snapshot records exactly which constants produced a forecast, so a
//! stored insight can be traced back to the policy that generated it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::policy::Policy;
use crate::resolve::PolicyPath;

/// A frozen snapshot of the effective policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Policy identifier, if the policy declares one.
    #[serde(default)]
    pub policy_id: Option<String>,

    /// SHA-256 of the policy file content as read from disk.
    #[serde(default)]
    pub file_hash: Option<String>,

    /// Path the policy was loaded from.
    #[serde(default)]
    pub policy_path: Option<String>,

    /// Source of the policy.
    pub policy_source: String,

    /// SHA-256 of the effective policy's canonical JSON. Equal hashes mean
    /// equal constants, whatever file formatting they came from.
    pub effective_hash: String,

    /// Key constants for quick reference.
    pub summary: PolicySummary,
}

/// Summary of key policy values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySummary {
    pub trend_change_threshold: f64,
    pub rolling_window: usize,
    pub max_horizon_days: u32,
    /// Critical / high / medium cutoffs in days.
    pub breach_cutoffs: [u32; 3],
    pub category_count: usize,
    pub cache_ttl_seconds: u64,
}

impl ConfigSnapshot {
    /// Create a snapshot of a loaded policy.
    pub fn new(policy: &Policy, path: &PolicyPath, raw_json: Option<&str>) -> Self {
        let canonical = serde_json::to_string(policy).unwrap_or_default();

        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: policy.schema_version.clone(),
            policy_id: policy.policy_id.clone(),
            file_hash: raw_json.map(hash_content),
            policy_path: path.path.as_ref().map(|p| p.display().to_string()),
            policy_source: path.source.to_string(),
            effective_hash: hash_content(&canonical),
            summary: PolicySummary {
                trend_change_threshold: policy.trend.change_threshold,
                rolling_window: policy.trend.rolling_window,
                max_horizon_days: policy.breach.max_horizon_days,
                breach_cutoffs: [
                    policy.breach.critical_within_days,
                    policy.breach.high_within_days,
                    policy.breach.medium_within_days,
                ],
                category_count: policy.scoring.categories.len(),
                cache_ttl_seconds: policy.cache.ttl_seconds,
            },
        }
    }

    /// Whether two snapshots describe the same effective constants.
    pub fn same_policy(&self, other: &ConfigSnapshot) -> bool {
        self.effective_hash == other.effective_hash
    }
}

/// Hex-encoded SHA-256 of a string.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
