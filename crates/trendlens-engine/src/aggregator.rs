//! Pure merge of per-source daily series into one date-complete summary.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use trendlens_core::{days_inclusive, DailyStat, SourceId, TimeSeries};

/// The merged numbers, before request-level metadata is attached.
#[derive(Debug)]
pub(crate) struct Merged {
    pub total_mentions: u64,
    pub daily_stats: Vec<DailyStat>,
    pub per_source_totals: BTreeMap<SourceId, u64>,
}

/// Sums the given series day-by-day over `[start, end]`.
///
/// Every input series is date-complete on its own, so an absent source
/// simply contributes nothing; the output skeleton always spans the full
/// range with one entry per day, ascending, zeros included. With no input
/// series at all the result is a valid all-zero skeleton. Only ordered
/// containers are touched, so identical inputs give identical output.
pub(crate) fn merge(series: &[TimeSeries], start: NaiveDate, end: NaiveDate) -> Merged {
    let mut by_day: BTreeMap<NaiveDate, u64> =
        days_inclusive(start, end).map(|d| (d, 0)).collect();
    let mut per_source_totals: BTreeMap<SourceId, u64> = BTreeMap::new();

    for s in series {
        let mut source_total = 0;
        for bucket in s.buckets() {
            if let Some(day_total) = by_day.get_mut(&bucket.date) {
                *day_total += bucket.count;
            }
            source_total += bucket.count;
        }
        *per_source_totals.entry(s.source).or_insert(0) += source_total;
    }

    let daily_stats: Vec<DailyStat> = by_day
        .into_iter()
        .map(|(date, mentions)| DailyStat { date, mentions })
        .collect();
    let total_mentions = daily_stats.iter().map(|d| d.mentions).sum();

    Merged {
        total_mentions,
        daily_stats,
        per_source_totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendlens_core::day_count;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn series(source: SourceId, days: &[(&str, u64)], start: &str, end: &str) -> TimeSeries {
        let counts: BTreeMap<NaiveDate, u64> =
            days.iter().map(|(day, n)| (d(day), *n)).collect();
        TimeSeries::from_day_counts(source, "topic", d(start), d(end), &counts)
    }

    #[test]
    fn two_sources_sum_per_day() {
        let a = series(
            SourceId::NewsApi,
            &[("2024-11-20", 10), ("2024-11-21", 20)],
            "2024-11-20",
            "2024-11-21",
        );
        let b = series(
            SourceId::Wikipedia,
            &[("2024-11-20", 100), ("2024-11-21", 200)],
            "2024-11-20",
            "2024-11-21",
        );

        let merged = merge(&[a, b], d("2024-11-20"), d("2024-11-21"));

        assert_eq!(merged.daily_stats.len(), 2);
        assert_eq!(merged.daily_stats[0].mentions, 110);
        assert_eq!(merged.daily_stats[1].mentions, 220);
        assert_eq!(merged.total_mentions, 330);
        assert_eq!(merged.per_source_totals[&SourceId::NewsApi], 30);
        assert_eq!(merged.per_source_totals[&SourceId::Wikipedia], 300);
    }

    #[test]
    fn single_source_single_day() {
        let a = series(SourceId::NewsApi, &[("2024-11-20", 10)], "2024-11-20", "2024-11-20");
        let merged = merge(&[a], d("2024-11-20"), d("2024-11-20"));
        assert_eq!(merged.daily_stats.len(), 1);
        assert_eq!(merged.daily_stats[0].mentions, 10);
        assert_eq!(merged.total_mentions, 10);
    }

    #[test]
    fn no_series_yields_zero_skeleton() {
        let merged = merge(&[], d("2024-11-01"), d("2024-11-07"));
        assert_eq!(merged.daily_stats.len(), 7);
        assert!(merged.daily_stats.iter().all(|s| s.mentions == 0));
        assert_eq!(merged.total_mentions, 0);
        assert!(merged.per_source_totals.is_empty());
    }

    #[test]
    fn skeleton_is_complete_and_strictly_ascending() {
        let a = series(SourceId::Reddit, &[("2024-02-28", 1)], "2024-02-27", "2024-03-02");
        let merged = merge(&[a], d("2024-02-27"), d("2024-03-02"));
        assert_eq!(
            merged.daily_stats.len(),
            day_count(d("2024-02-27"), d("2024-03-02"))
        );
        for pair in merged.daily_stats.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn totals_identities_hold() {
        let a = series(
            SourceId::NewsApi,
            &[("2024-11-20", 3), ("2024-11-22", 4)],
            "2024-11-20",
            "2024-11-22",
        );
        let b = series(SourceId::Reddit, &[("2024-11-21", 5)], "2024-11-20", "2024-11-22");
        let merged = merge(&[a, b], d("2024-11-20"), d("2024-11-22"));

        let daily_sum: u64 = merged.daily_stats.iter().map(|s| s.mentions).sum();
        let source_sum: u64 = merged.per_source_totals.values().sum();
        assert_eq!(merged.total_mentions, daily_sum);
        assert_eq!(merged.total_mentions, source_sum);
    }
}
