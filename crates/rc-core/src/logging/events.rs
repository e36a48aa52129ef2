//! Structured event vocabulary.
//!
//! Every event carries a stable name (used as the tracing target) and the
//! pipeline stage it belongs to, so JSONL consumers can filter without
//! parsing messages.

use serde::{Deserialize, Serialize};

/// Stages of the forecast pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup, policy resolution.
    Init,
    /// Reading rows and request inputs.
    Load,
    /// Bucketing rows into per-category series.
    Aggregate,
    /// Trend estimation.
    Trend,
    /// Threshold-breach projection.
    Breach,
    /// Composite and category scoring.
    Score,
    /// Cache lookups and stores.
    Cache,
    /// Rendering output.
    Report,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Aggregate => "aggregate",
            Stage::Trend => "trend",
            Stage::Breach => "breach",
            Stage::Score => "score",
            Stage::Cache => "cache",
            Stage::Report => "report",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard event names.
pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_ERROR: &str = "config.error";

    pub const INPUT_LOADED: &str = "input.loaded";

    pub const AGGREGATE_FINISHED: &str = "aggregate.finished";

    pub const TREND_ESTIMATED: &str = "trend.estimated";
    pub const TREND_DEGRADED: &str = "trend.degraded";

    pub const BREACH_ESTIMATED: &str = "breach.estimated";
    pub const BREACH_IMMINENT: &str = "breach.imminent";

    pub const SCORE_COMPUTED: &str = "score.computed";

    pub const CACHE_HIT: &str = "cache.hit";
    pub const CACHE_STORED: &str = "cache.stored";

    pub const FORECAST_FINISHED: &str = "forecast.finished";

    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Correlation identifiers attached to every event of one invocation.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    /// Organization the run is scoped to, once known.
    pub org_id: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            org_id: None,
        }
    }

    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }
}
