//! Bucketed aggregation of raw rows.
//!
//! Rows are grouped by bucket key (day, ISO week, month, or a caller
//! supplied function), then by category. Per-category series come back
//! ordered by bucket key ascending.
//!
//! Missing buckets are NOT back-filled: a category with events in weeks 1
//! and 5 yields a two-point series. Callers that want zeros for quiet
//! buckets must ask for it via [`aggregate_dense`]; sparse series can make
//! a trend look steeper than it is, and which reading is right depends on
//! whether "no rows" means "nothing happened" or "nothing was recorded".

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use rc_common::{Error, Result, TimeSeriesPoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket key → accumulated value for one category.
pub type BucketedSeries = BTreeMap<String, f64>;

/// Standard bucket granularities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucketing {
    /// `2024-01-15`
    Day,
    /// `2024-W03` (ISO-8601 week-numbering year)
    #[default]
    IsoWeek,
    /// `2024-01`
    Month,
}

impl Bucketing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucketing::Day => "day",
            Bucketing::IsoWeek => "iso_week",
            Bucketing::Month => "month",
        }
    }

    /// Bucket key for a timestamp. Keys sort lexicographically in time order.
    pub fn key(&self, ts: &DateTime<Utc>) -> String {
        self.key_for_date(ts.date_naive())
    }

    fn key_for_date(&self, date: NaiveDate) -> String {
        match self {
            Bucketing::Day => date.format("%Y-%m-%d").to_string(),
            Bucketing::IsoWeek => {
                let week = date.iso_week();
                format!("{:04}-W{:02}", week.year(), week.week())
            }
            Bucketing::Month => date.format("%Y-%m").to_string(),
        }
    }

    /// First day of the bucket containing `date`.
    fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Bucketing::Day => date,
            Bucketing::IsoWeek => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
            Bucketing::Month => date.with_day(1).unwrap_or(date),
        }
    }

    fn next_start(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Bucketing::Day => start.succ_opt(),
            Bucketing::IsoWeek => start.checked_add_signed(Duration::days(7)),
            Bucketing::Month => start.checked_add_months(Months::new(1)),
        }
    }

    /// Every bucket key from the bucket containing `start` through the one
    /// containing `end`, in order. Empty when `start > end`.
    pub fn keys_between(&self, start: &DateTime<Utc>, end: &DateTime<Utc>) -> Vec<String> {
        let end_date = end.date_naive();
        let mut cursor = Some(self.bucket_start(start.date_naive()));
        let mut keys = Vec::new();
        while let Some(day) = cursor {
            if day > end_date {
                break;
            }
            keys.push(self.key_for_date(day));
            cursor = self.next_start(day);
        }
        keys
    }
}

impl std::fmt::Display for Bucketing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How rows fold into a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accumulate {
    /// Sum row values.
    #[default]
    Sum,
    /// Count rows, ignoring their values.
    Count,
}

impl Accumulate {
    fn contribution(&self, row: &TimeSeriesPoint) -> f64 {
        match self {
            Accumulate::Sum => row.value,
            Accumulate::Count => 1.0,
        }
    }
}

/// Order rows by timestamp, oldest first. Ties keep their input order.
pub fn sort_points(rows: &mut [TimeSeriesPoint]) {
    rows.sort_by_key(|row| row.timestamp);
}

/// Group rows into per-category bucketed series.
pub fn bucket_rows<F>(
    rows: &[TimeSeriesPoint],
    bucket_fn: F,
    accumulate: Accumulate,
) -> BTreeMap<String, BucketedSeries>
where
    F: Fn(&DateTime<Utc>) -> String,
{
    let mut by_category: BTreeMap<String, BucketedSeries> = BTreeMap::new();
    for row in rows {
        let key = bucket_fn(&row.timestamp);
        *by_category
            .entry(row.category.clone())
            .or_default()
            .entry(key)
            .or_insert(0.0) += accumulate.contribution(row);
    }
    by_category
}

/// Like [`bucket_rows`], but every category gets every bucket in
/// `[start, end]`, zero-filled. Rows outside the window are ignored.
pub fn bucket_rows_dense(
    rows: &[TimeSeriesPoint],
    bucketing: Bucketing,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    accumulate: Accumulate,
) -> Result<BTreeMap<String, BucketedSeries>> {
    if start > end {
        return Err(Error::InvalidWindow {
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        });
    }

    let in_window: Vec<TimeSeriesPoint> = rows
        .iter()
        .filter(|row| row.timestamp >= *start && row.timestamp <= *end)
        .cloned()
        .collect();

    let keys = bucketing.keys_between(start, end);
    let mut by_category = bucket_rows(&in_window, |ts| bucketing.key(ts), accumulate);
    for series in by_category.values_mut() {
        for key in &keys {
            series.entry(key.clone()).or_insert(0.0);
        }
    }
    Ok(by_category)
}

/// Flatten bucketed series into value vectors ordered by bucket key.
pub fn to_series(bucketed: BTreeMap<String, BucketedSeries>) -> BTreeMap<String, Vec<f64>> {
    bucketed
        .into_iter()
        .map(|(category, buckets)| (category, buckets.into_values().collect()))
        .collect()
}

/// Aggregate rows with a caller-supplied bucket function.
pub fn aggregate_by<F>(
    rows: &[TimeSeriesPoint],
    bucket_fn: F,
    accumulate: Accumulate,
) -> BTreeMap<String, Vec<f64>>
where
    F: Fn(&DateTime<Utc>) -> String,
{
    to_series(bucket_rows(rows, bucket_fn, accumulate))
}

/// Aggregate rows with a standard bucketing.
pub fn aggregate(
    rows: &[TimeSeriesPoint],
    bucketing: Bucketing,
    accumulate: Accumulate,
) -> BTreeMap<String, Vec<f64>> {
    aggregate_by(rows, |ts| bucketing.key(ts), accumulate)
}

/// Aggregate rows into zero-filled series covering `[start, end]`.
pub fn aggregate_dense(
    rows: &[TimeSeriesPoint],
    bucketing: Bucketing,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    accumulate: Accumulate,
) -> Result<BTreeMap<String, Vec<f64>>> {
    Ok(to_series(bucket_rows_dense(
        rows, bucketing, start, end, accumulate,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn row(y: i32, m: u32, d: u32, value: f64, category: &str) -> TimeSeriesPoint {
        TimeSeriesPoint::new(at(y, m, d), value, category)
    }

    #[test]
    fn keys_are_zero_padded() {
        assert_eq!(Bucketing::Day.key(&at(2024, 3, 5)), "2024-03-05");
        assert_eq!(Bucketing::IsoWeek.key(&at(2024, 1, 3)), "2024-W01");
        assert_eq!(Bucketing::Month.key(&at(2024, 3, 5)), "2024-03");
    }

    #[test]
    fn iso_week_uses_week_year() {
        // 2024-12-30 is a Monday belonging to ISO week 1 of 2025.
        assert_eq!(Bucketing::IsoWeek.key(&at(2024, 12, 30)), "2025-W01");
        // 2021-01-03 is a Sunday in ISO week 53 of 2020.
        assert_eq!(Bucketing::IsoWeek.key(&at(2021, 1, 3)), "2020-W53");
    }

    #[test]
    fn aggregate_orders_by_bucket_not_input() {
        let rows = vec![
            row(2024, 3, 20, 1.0, "cyber"),
            row(2024, 1, 10, 2.0, "cyber"),
            row(2024, 2, 14, 4.0, "cyber"),
            row(2024, 1, 25, 3.0, "cyber"),
        ];
        let out = aggregate(&rows, Bucketing::Month, Accumulate::Sum);
        assert_eq!(out["cyber"], vec![5.0, 4.0, 1.0]);
    }

    #[test]
    fn aggregate_separates_categories() {
        let rows = vec![
            row(2024, 1, 1, 1.0, "cyber"),
            row(2024, 1, 1, 1.0, "operational"),
            row(2024, 1, 2, 1.0, "operational"),
        ];
        let out = aggregate(&rows, Bucketing::Day, Accumulate::Count);
        assert_eq!(out["cyber"], vec![1.0]);
        assert_eq!(out["operational"], vec![1.0, 1.0]);
    }

    #[test]
    fn count_ignores_values() {
        let rows = vec![
            row(2024, 1, 1, 7.5, "financial"),
            row(2024, 1, 1, 2.5, "financial"),
        ];
        assert_eq!(
            aggregate(&rows, Bucketing::Day, Accumulate::Count)["financial"],
            vec![2.0]
        );
        assert_eq!(
            aggregate(&rows, Bucketing::Day, Accumulate::Sum)["financial"],
            vec![10.0]
        );
    }

    #[test]
    fn sparse_buckets_are_not_filled() {
        let rows = vec![row(2024, 1, 1, 1.0, "cyber"), row(2024, 1, 5, 1.0, "cyber")];
        assert_eq!(
            aggregate(&rows, Bucketing::Day, Accumulate::Count)["cyber"].len(),
            2
        );
    }

    #[test]
    fn dense_fills_quiet_buckets() {
        let rows = vec![row(2024, 1, 1, 1.0, "cyber"), row(2024, 1, 5, 2.0, "cyber")];
        let out = aggregate_dense(
            &rows,
            Bucketing::Day,
            &Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            &Utc.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap(),
            Accumulate::Sum,
        )
        .unwrap();
        assert_eq!(out["cyber"], vec![1.0, 0.0, 0.0, 0.0, 2.0, 0.0]);
    }

    #[test]
    fn dense_drops_rows_outside_window() {
        let rows = vec![row(2023, 12, 1, 9.0, "cyber"), row(2024, 1, 2, 1.0, "cyber")];
        let out = aggregate_dense(
            &rows,
            Bucketing::Month,
            &at(2024, 1, 1),
            &at(2024, 2, 28),
            Accumulate::Sum,
        )
        .unwrap();
        assert_eq!(out["cyber"], vec![1.0, 0.0]);
    }

    #[test]
    fn dense_rejects_inverted_window() {
        let err = aggregate_dense(
            &[],
            Bucketing::Day,
            &at(2024, 2, 1),
            &at(2024, 1, 1),
            Accumulate::Sum,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidWindow { .. }));
    }

    #[test]
    fn keys_between_weeks_span_year_end() {
        let keys = Bucketing::IsoWeek.keys_between(&at(2024, 12, 20), &at(2025, 1, 8));
        assert_eq!(keys, vec!["2024-W51", "2024-W52", "2025-W01", "2025-W02"]);
    }

    #[test]
    fn keys_between_months() {
        let keys = Bucketing::Month.keys_between(&at(2024, 11, 15), &at(2025, 2, 1));
        assert_eq!(keys, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
    }

    #[test]
    fn custom_bucket_fn() {
        let rows = vec![row(2024, 1, 1, 1.0, "cyber"), row(2024, 7, 1, 1.0, "cyber")];
        let by_half = aggregate_by(
            &rows,
            |ts| format!("{}-H{}", ts.year(), if ts.month() <= 6 { 1 } else { 2 }),
            Accumulate::Count,
        );
        assert_eq!(by_half["cyber"], vec![1.0, 1.0]);
    }

    #[test]
    fn sort_points_orders_by_time() {
        let mut rows = vec![row(2024, 3, 1, 1.0, "a"), row(2024, 1, 1, 2.0, "a")];
        sort_points(&mut rows);
        assert_eq!(rows[0].value, 2.0);
    }
}
