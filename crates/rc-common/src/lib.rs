//! Riskcast common types, IDs, and errors.
//!
//! This crate provides foundational types shared by the forecasting crates:
//! - Time-series input rows and the records the estimators produce
//! - Risk category taxonomy
//! - Organization, series, and run identifiers
//! - Common error types
//! - Output format specifications

pub mod categories;
pub mod error;
pub mod id;
pub mod output;
pub mod records;
pub mod series;

pub use categories::RiskCategory;
pub use error::{Error, Result};
pub use id::{OrgId, RunId, SeriesId};
pub use output::OutputFormat;
pub use records::{
    BreachPrediction, CompositeRiskScore, ProbabilityBucket, ScoreScale, TrendDirection,
    TrendResult,
};
pub use series::TimeSeriesPoint;

/// Schema version stamped on serialized forecast output.
pub const SCHEMA_VERSION: &str = "1.0.0";
