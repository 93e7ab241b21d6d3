use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::SourceId;

/// Bucketing granularity of a time series.
///
/// Daily is the only granularity the sources can all deliver; the hourly and
/// weekly variants of earlier iterations were never backed by real data and
/// are gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
}

/// One calendar day's mention count for a single source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub date: NaiveDate,
    pub count: u64,
}

/// A date-complete daily series for one source and one topic.
///
/// Invariant: `buckets` covers every day of the queried range inclusive,
/// sorted ascending, one bucket per day, no gaps. Days the source reported
/// nothing for carry an explicit zero. The invariant holds by construction:
/// the only way to build a series is [`TimeSeries::from_day_counts`], which
/// gap-fills over the full range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub source: SourceId,
    pub topic: String,
    pub granularity: Granularity,
    buckets: Vec<TimeBucket>,
}

impl TimeSeries {
    /// Materializes a date-complete series from raw per-day counts.
    ///
    /// Every day in `[start, end]` gets a bucket; days absent from `counts`
    /// get zero. Counts for days outside the range are ignored — callers
    /// discard out-of-window events, they never shift them.
    #[must_use]
    pub fn from_day_counts(
        source: SourceId,
        topic: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        counts: &BTreeMap<NaiveDate, u64>,
    ) -> Self {
        let buckets = days_inclusive(start, end)
            .map(|date| TimeBucket {
                date,
                count: counts.get(&date).copied().unwrap_or(0),
            })
            .collect();
        Self {
            source,
            topic: topic.into(),
            granularity: Granularity::Day,
            buckets,
        }
    }

    #[must_use]
    pub fn buckets(&self) -> &[TimeBucket] {
        &self.buckets
    }

    /// Sum of all bucket counts in this series.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

/// Iterator over every day of `[start, end]` inclusive, ascending.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Number of days in `[start, end]` inclusive. Zero if the range is inverted.
#[must_use]
pub fn day_count(start: NaiveDate, end: NaiveDate) -> usize {
    usize::try_from((end - start).num_days() + 1).unwrap_or(0)
}

/// One merged day across all contributing sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub mentions: u64,
}

/// The merged outcome of one aggregation query.
///
/// `daily_stats` always spans the full requested range with one entry per
/// day, ascending. Sources that failed are listed in `sources_failed`
/// (keyed by the id string as requested, since unknown ids never parsed into
/// a [`SourceId`]) with a human-readable reason; their absence does not
/// affect the date skeleton. All containers iterate in a fixed order so
/// identical inputs produce byte-identical output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub topic: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_mentions: u64,
    pub daily_stats: Vec<DailyStat>,
    pub per_source_totals: BTreeMap<SourceId, u64>,
    pub sources_used: BTreeSet<SourceId>,
    pub sources_failed: BTreeMap<String, String>,
}

/// One completed search, as recorded in the history store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub topic: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub sources_used: BTreeSet<SourceId>,
    pub total_mentions: u64,
    pub searched_at: DateTime<Utc>,
}
