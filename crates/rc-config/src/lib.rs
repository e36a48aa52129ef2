//! Riskcast forecast policy loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for policy.json (every tunable constant the
//!   estimators use: trend cutoff, multipliers, breach buckets, score weights)
//! - Built-in presets
//! - Policy resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation
//! - Policy snapshots for reproducible output

pub mod load;
pub mod policy;
pub mod preset;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use load::{load_policy, LoadedPolicy};
pub use policy::{BreachPolicy, CachePolicy, InsightPolicy, Policy, ScoringPolicy, TrendPolicy};
pub use preset::{get_preset, PresetName};
pub use resolve::{resolve_policy, ConfigSource, PolicyPath};
pub use snapshot::ConfigSnapshot;
pub use validate::{
    validate_policy, ValidationError, ValidationResult, CONFIDENCE_BAND, MAX_CACHE_TTL_SECONDS,
};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
