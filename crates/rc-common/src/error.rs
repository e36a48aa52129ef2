//! Error types for Riskcast.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! Sparse data is never an error: estimators degrade to documented
//! defaults instead. Errors here mean the caller handed over something
//! that cannot be interpreted (a non-finite value, a negative threshold)
//! or the surrounding configuration/I/O failed.
//!
//! # Agent-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 12,
//!   "category": "input",
//!   "message": "negative threshold -5 for series kri-17",
//!   "recoverable": false,
//!   "suggested_action": "fix_input",
//!   "context": { "series_id": "kri-17", "threshold": -5.0 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for Riskcast operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Caller supplied data that cannot be interpreted.
    Input,
    /// Policy file or preset errors.
    Config,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Suggested actions for agents to take in response to errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Correct the request payload and resubmit.
    FixInput,
    /// Run the policy check command.
    RunCheck,
    /// Reset configuration to defaults.
    ResetConfig,
    /// Retry the operation.
    Retry,
    /// Manual intervention required.
    ManualIntervention,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::FixInput => write!(f, "fix_input"),
            SuggestedAction::RunCheck => write!(f, "run_check"),
            SuggestedAction::ResetConfig => write!(f, "reset_config"),
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
        }
    }
}

/// Unified error type for Riskcast.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("non-finite value at index {index} of series {series_id}")]
    NonFiniteValue { series_id: String, index: usize },

    #[error("negative threshold {threshold} for series {series_id}")]
    NegativeThreshold { series_id: String, threshold: f64 },

    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid window: start {start} is after end {end}")]
    InvalidWindow { start: String, end: String },

    // Configuration errors (20-29)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Input errors
    /// - 20-29: Configuration errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidInput(_) => 10,
            Error::NonFiniteValue { .. } => 11,
            Error::NegativeThreshold { .. } => 12,
            Error::OutOfRange { .. } => 13,
            Error::InvalidWindow { .. } => 14,
            Error::Config(_) => 20,
            Error::InvalidPolicy(_) => 21,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidInput(_)
            | Error::NonFiniteValue { .. }
            | Error::NegativeThreshold { .. }
            | Error::OutOfRange { .. }
            | Error::InvalidWindow { .. } => ErrorCategory::Input,

            Error::Config(_) | Error::InvalidPolicy(_) => ErrorCategory::Config,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable without a code change.
    ///
    /// Input errors point at a caller bug and are not retried.
    pub fn is_recoverable(&self) -> bool {
        match self.category() {
            ErrorCategory::Input => false,
            ErrorCategory::Config => true,
            ErrorCategory::Io => true,
        }
    }

    /// Returns the suggested action for agents.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::InvalidInput(_)
            | Error::NonFiniteValue { .. }
            | Error::NegativeThreshold { .. }
            | Error::OutOfRange { .. }
            | Error::InvalidWindow { .. } => SuggestedAction::FixInput,

            Error::Config(_) => SuggestedAction::RunCheck,
            Error::InvalidPolicy(_) => SuggestedAction::ResetConfig,

            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::ManualIntervention,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "Check the request payload against the documented row format.",
            Error::NonFiniteValue { .. } => {
                "Series values must be finite numbers. Drop NaN/Infinity rows upstream."
            }
            Error::NegativeThreshold { .. } => {
                "Breach thresholds must be zero or positive. Check the KRI threshold definition."
            }
            Error::OutOfRange { .. } => "Pass a value inside the documented range.",
            Error::InvalidWindow { .. } => "The window start must not be after the window end.",
            Error::Config(_) => "Run 'rc-core check' to validate the effective policy.",
            Error::InvalidPolicy(_) => {
                "Run 'rc-core check --policy <file>' to locate the problem, or fall back to a preset."
            }
            Error::Io(_) => "Check that the file exists and is readable. Retry the operation.",
            Error::Json(_) => "Invalid JSON. Check syntax with 'jq . <file>'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "Invalid Input",
            Error::NonFiniteValue { .. } => "Non-Finite Series Value",
            Error::NegativeThreshold { .. } => "Negative Threshold",
            Error::OutOfRange { .. } => "Value Out Of Range",
            Error::InvalidWindow { .. } => "Invalid Time Window",
            Error::Config(_) => "Configuration Error",
            Error::InvalidPolicy(_) => "Invalid Policy",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }

    /// Format for human consumption: headline, reason, fix.
    pub fn format_human(&self) -> String {
        format!(
            "✗ {}\n  Reason: {}\n  Fix: {}",
            self.headline(),
            self,
            self.remediation()
        )
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Suggested action for agents.
    pub suggested_action: SuggestedAction,

    /// Additional structured context (e.g., series id, field name).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::NonFiniteValue { series_id, index } => {
                context.insert("series_id".to_string(), serde_json::json!(series_id));
                context.insert("index".to_string(), serde_json::json!(index));
            }
            Error::NegativeThreshold {
                series_id,
                threshold,
            } => {
                context.insert("series_id".to_string(), serde_json::json!(series_id));
                context.insert("threshold".to_string(), serde_json::json!(threshold));
            }
            Error::OutOfRange { field, value, .. } => {
                context.insert("field".to_string(), serde_json::json!(field));
                context.insert("value".to_string(), serde_json::json!(value));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}
