//! Forecast result caching.
//!
//! The engine never owns a global cache. Callers that want reuse across
//! requests inject an implementation of [`ForecastCache`]; the in-memory
//! [`MemoryForecastCache`] is provided for single-process use.

use chrono::{DateTime, Duration, Utc};
use rc_common::OrgId;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::engine::ForecastReport;

/// Identity of a cached forecast: organization, window, and the request
/// parameters that shape the report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub org_id: OrgId,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    /// Bucketing, thresholds, and other request parameters, flattened.
    pub scope: String,
}

/// Storage for computed forecast reports.
pub trait ForecastCache: Send + Sync {
    /// Return a live entry for `key`, if any.
    fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<ForecastReport>;

    /// Store `report` under `key`, replacing any previous entry.
    fn put(&self, key: CacheKey, report: ForecastReport, now: DateTime<Utc>);
}

struct Entry {
    report: ForecastReport,
    stored_at: DateTime<Utc>,
}

/// Entries kept by [`MemoryForecastCache::new`] before the oldest is evicted.
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

// Largest second count `Duration::seconds` accepts.
const MAX_TTL_SECONDS: u64 = (i64::MAX / 1_000) as u64;

/// In-memory cache with a fixed time-to-live and a bounded entry count.
///
/// Every `put` drops expired entries first, so the map never holds more
/// than the keys written within one TTL (and never more than the cap).
pub struct MemoryForecastCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl MemoryForecastCache {
    /// A TTL of zero gives a cache that stores nothing.
    pub fn new(ttl_seconds: u64) -> Self {
        Self::with_max_entries(ttl_seconds, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(ttl_seconds: u64, max_entries: usize) -> Self {
        Self {
            ttl: Duration::seconds(ttl_seconds.min(MAX_TTL_SECONDS) as i64),
            max_entries,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `put` stores anything at all.
    pub fn is_enabled(&self) -> bool {
        self.ttl > Duration::zero() && self.max_entries > 0
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries that have outlived the TTL. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, entry| !is_expired(entry, ttl, now));
        before - entries.len()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

fn is_expired(entry: &Entry, ttl: Duration, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(entry.stored_at) >= ttl
}

impl ForecastCache for MemoryForecastCache {
    fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<ForecastReport> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if !is_expired(entry, self.ttl, now) => Some(entry.report.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: CacheKey, report: ForecastReport, now: DateTime<Utc>) {
        if !self.is_enabled() {
            return;
        }
        // A poisoned lock only costs a cache miss later.
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        let ttl = self.ttl;
        entries.retain(|_, entry| !is_expired(entry, ttl, now));

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            Entry {
                report,
                stored_at: now,
            },
        );
    }
}
