//! Time-series input rows.
//!
//! Rows arrive from the data accessor already filtered to one organization
//! and one time window. Ordering is not guaranteed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One observation: an incident, a KRI log entry, or a control test result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// ISO-8601 timestamp of the observation.
    pub timestamp: DateTime<Utc>,
    /// Observed value (1.0 for a plain event, a measured level for a KRI).
    pub value: f64,
    /// Category tag, e.g. `operational` or `cyber`.
    pub category: String,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64, category: impl Into<String>) -> Self {
        Self {
            timestamp,
            value,
            category: category.into(),
        }
    }

    /// Parse a JSON array of rows.
    pub fn parse_rows(json: &str) -> Result<Vec<TimeSeriesPoint>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Reject any row whose value is not a finite number.
pub fn validate_points(points: &[TimeSeriesPoint]) -> Result<()> {
    for (index, point) in points.iter().enumerate() {
        if !point.value.is_finite() {
            return Err(Error::NonFiniteValue {
                series_id: point.category.clone(),
                index,
            });
        }
    }
    Ok(())
}

/// Reject a numeric series containing a non-finite value.
pub fn validate_series(series_id: &str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(Error::NonFiniteValue {
            series_id: series_id.to_string(),
            index,
        }),
        None => Ok(()),
    }
}
