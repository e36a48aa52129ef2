//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::policy::{BreachPolicy, CachePolicy, InsightPolicy, Policy, ScoringPolicy, TrendPolicy};

/// Trend confidence never leaves this band, whatever the policy says.
pub const CONFIDENCE_BAND: (f64, f64) = (0.1, 0.9);

/// Longest accepted cache lifetime: one week.
pub const MAX_CACHE_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
            ValidationError::UnknownPreset(_) => 67,
        }
    }
}

impl From<ValidationError> for rc_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::IoError(msg) => rc_common::Error::Config(msg),
            other => rc_common::Error::InvalidPolicy(other.to_string()),
        }
    }
}

/// Validate a policy semantically.
pub fn validate_policy(policy: &Policy) -> ValidationResult<()> {
    if policy.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: policy.schema_version.clone(),
        });
    }

    validate_trend(&policy.trend)?;
    validate_breach(&policy.breach)?;
    validate_scoring(&policy.scoring)?;
    validate_insights(&policy.insights)?;
    validate_cache(&policy.cache)?;

    Ok(())
}

fn validate_trend(trend: &TrendPolicy) -> ValidationResult<()> {
    require_finite_non_negative("trend.change_threshold", trend.change_threshold)?;

    if trend.rolling_window == 0 {
        return Err(ValidationError::InvalidValue {
            field: "trend.rolling_window".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    require_unit_interval("trend.confidence_floor", trend.confidence_floor)?;
    require_unit_interval("trend.confidence_ceiling", trend.confidence_ceiling)?;
    require_unit_interval(
        "trend.insufficient_data_confidence",
        trend.insufficient_data_confidence,
    )?;

    if trend.confidence_floor > trend.confidence_ceiling {
        return Err(ValidationError::SemanticError(format!(
            "trend.confidence_floor ({}) exceeds trend.confidence_ceiling ({})",
            trend.confidence_floor, trend.confidence_ceiling
        )));
    }

    let (lowest, highest) = CONFIDENCE_BAND;
    if trend.confidence_floor < lowest {
        return Err(ValidationError::InvalidValue {
            field: "trend.confidence_floor".to_string(),
            message: format!("Must be at least {}, got {}", lowest, trend.confidence_floor),
        });
    }
    if trend.confidence_ceiling > highest {
        return Err(ValidationError::InvalidValue {
            field: "trend.confidence_ceiling".to_string(),
            message: format!("Must be at most {}, got {}", highest, trend.confidence_ceiling),
        });
    }
    if !(lowest..=highest).contains(&trend.insufficient_data_confidence) {
        return Err(ValidationError::InvalidValue {
            field: "trend.insufficient_data_confidence".to_string(),
            message: format!(
                "Must be within [{}, {}], got {}",
                lowest, highest, trend.insufficient_data_confidence
            ),
        });
    }

    if !trend.increasing_multiplier.is_finite() || trend.increasing_multiplier < 1.0 {
        return Err(ValidationError::InvalidValue {
            field: "trend.increasing_multiplier".to_string(),
            message: format!("Must be >= 1, got {}", trend.increasing_multiplier),
        });
    }

    if !trend.decreasing_multiplier.is_finite()
        || trend.decreasing_multiplier <= 0.0
        || trend.decreasing_multiplier > 1.0
    {
        return Err(ValidationError::InvalidValue {
            field: "trend.decreasing_multiplier".to_string(),
            message: format!("Must be in (0, 1], got {}", trend.decreasing_multiplier),
        });
    }

    Ok(())
}

fn validate_breach(breach: &BreachPolicy) -> ValidationResult<()> {
    if breach.max_horizon_days == 0 {
        return Err(ValidationError::InvalidValue {
            field: "breach.max_horizon_days".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    // Cutoffs must be ordered or later buckets are unreachable.
    if !(breach.critical_within_days <= breach.high_within_days
        && breach.high_within_days <= breach.medium_within_days)
    {
        return Err(ValidationError::SemanticError(format!(
            "breach cutoffs must be ordered critical <= high <= medium, got {} / {} / {}",
            breach.critical_within_days, breach.high_within_days, breach.medium_within_days
        )));
    }

    if breach.medium_within_days > breach.max_horizon_days {
        return Err(ValidationError::SemanticError(format!(
            "breach.medium_within_days ({}) exceeds breach.max_horizon_days ({})",
            breach.medium_within_days, breach.max_horizon_days
        )));
    }

    Ok(())
}

fn validate_scoring(scoring: &ScoringPolicy) -> ValidationResult<()> {
    if !scoring.base_score.is_finite() || !(1.0..=10.0).contains(&scoring.base_score) {
        return Err(ValidationError::InvalidValue {
            field: "scoring.base_score".to_string(),
            message: format!("Must be in [1, 10], got {}", scoring.base_score),
        });
    }

    for (field, value) in [
        ("scoring.incident_weight", scoring.incident_weight),
        ("scoring.incident_cap", scoring.incident_cap),
        ("scoring.control_gap_weight", scoring.control_gap_weight),
        ("scoring.vendor_weight", scoring.vendor_weight),
        ("scoring.vendor_cap", scoring.vendor_cap),
        ("scoring.kri_breach_weight", scoring.kri_breach_weight),
        ("scoring.kri_breach_cap", scoring.kri_breach_cap),
        ("scoring.category_unit_penalty", scoring.category_unit_penalty),
    ] {
        require_finite_non_negative(field, value)?;
    }

    if scoring.categories.is_empty() {
        return Err(ValidationError::SemanticError(
            "scoring.categories must name at least one category".to_string(),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for category in &scoring.categories {
        let key = category.trim().to_lowercase();
        if key.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "scoring.categories".to_string(),
                message: "Category names must not be blank".to_string(),
            });
        }
        if !seen.insert(key) {
            return Err(ValidationError::InvalidValue {
                field: "scoring.categories".to_string(),
                message: format!("Duplicate category '{}'", category),
            });
        }
    }

    Ok(())
}

fn validate_insights(insights: &InsightPolicy) -> ValidationResult<()> {
    require_unit_interval("insights.min_confidence", insights.min_confidence)
}

fn validate_cache(cache: &CachePolicy) -> ValidationResult<()> {
    if cache.ttl_seconds > MAX_CACHE_TTL_SECONDS {
        return Err(ValidationError::InvalidValue {
            field: "cache.ttl_seconds".to_string(),
            message: format!(
                "Must be at most {} (one week), got {}",
                MAX_CACHE_TTL_SECONDS, cache.ttl_seconds
            ),
        });
    }
    Ok(())
}

fn require_unit_interval(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be in [0, 1], got {}", value),
        });
    }
    Ok(())
}

fn require_finite_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be a finite non-negative number, got {}", value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        assert!(validate_policy(&Policy::default()).is_ok());
    }

    #[test]
    fn version_mismatch_rejected() {
        let policy = Policy {
            schema_version: "0.9.0".to_string(),
            ..Policy::default()
        };
        assert!(matches!(
            validate_policy(&policy),
            Err(ValidationError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn unordered_breach_cutoffs_rejected() {
        let mut policy = Policy::default();
        policy.breach.critical_within_days = 40;
        let err = validate_policy(&policy).unwrap_err();
        assert!(matches!(err, ValidationError::SemanticError(_)));
    }

    #[test]
    fn cutoff_beyond_horizon_rejected() {
        let mut policy = Policy::default();
        policy.breach.max_horizon_days = 30;
        assert!(validate_policy(&policy).is_err());
    }

    #[test]
    fn inverted_confidence_band_rejected() {
        let mut policy = Policy::default();
        policy.trend.confidence_floor = 0.95;
        assert!(matches!(
            validate_policy(&policy),
            Err(ValidationError::SemanticError(_))
        ));
    }

    #[test]
    fn confidence_band_cannot_reach_certainty() {
        let mut policy = Policy::default();
        policy.trend.confidence_floor = 0.0;
        match validate_policy(&policy) {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "trend.confidence_floor")
            }
            other => panic!("unexpected: {:?}", other),
        }

        let mut policy = Policy::default();
        policy.trend.confidence_ceiling = 1.0;
        match validate_policy(&policy) {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "trend.confidence_ceiling")
            }
            other => panic!("unexpected: {:?}", other),
        }

        let mut policy = Policy::default();
        policy.trend.confidence_floor = 0.3;
        policy.trend.confidence_ceiling = 0.7;
        assert!(validate_policy(&policy).is_ok());
    }

    #[test]
    fn oversized_cache_ttl_rejected() {
        let mut policy = Policy::default();
        policy.cache.ttl_seconds = 10_000_000_000_000_000;
        match validate_policy(&policy) {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "cache.ttl_seconds")
            }
            other => panic!("unexpected: {:?}", other),
        }

        policy.cache.ttl_seconds = MAX_CACHE_TTL_SECONDS;
        assert!(validate_policy(&policy).is_ok());
        policy.cache.ttl_seconds = 0;
        assert!(validate_policy(&policy).is_ok());
    }

    #[test]
    fn negative_weight_rejected() {
        let mut policy = Policy::default();
        policy.scoring.vendor_weight = -0.5;
        match validate_policy(&policy) {
            Err(ValidationError::InvalidValue { field, .. }) => {
                assert_eq!(field, "scoring.vendor_weight")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn duplicate_categories_rejected() {
        let mut policy = Policy::default();
        policy.scoring.categories = vec!["cyber".to_string(), "Cyber".to_string()];
        assert!(validate_policy(&policy).is_err());
    }

    #[test]
    fn zero_window_rejected() {
        let mut policy = Policy::default();
        policy.trend.rolling_window = 0;
        assert!(validate_policy(&policy).is_err());
    }

    #[test]
    fn converts_into_common_error() {
        let err: rc_common::Error = ValidationError::UnknownPreset("x".to_string()).into();
        assert!(matches!(err, rc_common::Error::InvalidPolicy(_)));
    }
}
