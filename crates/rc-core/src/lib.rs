//! Riskcast Core Library
//!
//! This library provides the forecasting core:
//! - Bucketed aggregation of raw event/KRI rows
//! - Trend estimation with heuristic one-step projection
//! - Threshold-breach projection
//! - Composite risk scoring
//! - A request-level engine with an injectable result cache
//! - Display-agnostic insight records
//!
//! Every estimator is a pure function of its inputs. The binary entry
//! point is in `main.rs`.

pub mod aggregate;
pub mod breach;
pub mod cache;
pub mod engine;
pub mod exit_codes;
pub mod insight;
pub mod logging;
pub mod output;
pub mod scoring;
pub mod trend;

pub use aggregate::{aggregate, aggregate_by, aggregate_dense, Accumulate, Bucketing};
pub use breach::estimate_breach;
pub use cache::{CacheKey, ForecastCache, MemoryForecastCache};
pub use engine::{ForecastEngine, ForecastReport, ForecastRequest, TimeWindow};
pub use insight::{build_insights, Insight, InsightKind, InsightSeverity};
pub use scoring::{score, score_categories, RiskInputs};
pub use trend::estimate_trend;
