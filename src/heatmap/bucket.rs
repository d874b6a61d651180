use crate::error::{GhmapError, Result};
use crate::model::{DayBucket, PeriodBucket};
use crate::util::parse_day_key;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Split the aggregated date range into exactly `n` contiguous windows and
/// sum each day's totals into its window.
///
/// The window length is `span_days / n + 1` days (an n-way equal split of the
/// inclusive day count, remainder handling pushed to the tail), so a
/// single-day span lands entirely in window 0 and the remaining windows stay
/// zero. The final window always ends on the last aggregated date.
pub fn bucketize(days: &BTreeMap<String, DayBucket>, n: usize) -> Result<Vec<PeriodBucket>> {
    if n == 0 {
        return Err(GhmapError::InvalidBucketCount(n));
    }
    if days.is_empty() {
        return Err(GhmapError::EmptyDataset);
    }

    let dates = days
        .keys()
        .map(|key| parse_day_key(key))
        .collect::<Result<Vec<NaiveDate>>>()?;
    let first = dates[0];
    let last = dates[dates.len() - 1];

    let span_days = (last - first).num_days();
    let stride = span_days / n as i64 + 1;

    let boundaries: Vec<NaiveDate> = (0..=n)
        .map(|i| first + Duration::days(i as i64 * stride))
        .collect();

    let mut buckets: Vec<PeriodBucket> = (0..n)
        .map(|i| {
            let start = boundaries[i];
            let end = (boundaries[i + 1] - Duration::days(1)).min(last).max(start);
            PeriodBucket {
                start,
                end,
                total_events: 0,
                total_size: 0,
            }
        })
        .collect();

    for (key, day) in days {
        let date = parse_day_key(key)?;
        let index = window_index(&boundaries, date);
        buckets[index].total_events += day.total_events;
        buckets[index].total_size += day.total_size;
    }

    Ok(buckets)
}

/// First window `[boundary[i], boundary[i+1])` containing `date`. A date at
/// or past the final boundary falls into the last window.
fn window_index(boundaries: &[NaiveDate], date: NaiveDate) -> usize {
    let n = boundaries.len() - 1;
    for i in 0..n {
        if date >= boundaries[i] && date < boundaries[i + 1] {
            return i;
        }
    }
    n - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::aggregate_days;
    use crate::model::{Event, EventKind};
    use chrono::{DateTime, Utc};

    fn event(ts: &str, kind: EventKind, size: u64) -> Event {
        Event {
            timestamp: DateTime::parse_from_rfc3339(ts)
                .unwrap()
                .with_timezone(&Utc),
            language: "Python".to_string(),
            kind,
            size,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ten_day_days() -> BTreeMap<String, DayBucket> {
        aggregate_days(&[
            event("2024-01-01T08:00:00Z", EventKind::Commit, 1),
            event("2024-01-01T09:00:00Z", EventKind::Commit, 2),
            event("2024-01-01T10:00:00Z", EventKind::Commit, 3),
            event("2024-01-05T10:00:00Z", EventKind::PullRequest, 4),
            event("2024-01-10T10:00:00Z", EventKind::Commit, 5),
            event("2024-01-10T11:00:00Z", EventKind::Commit, 6),
        ])
    }

    #[test]
    fn splits_ten_days_into_two_even_windows() {
        let buckets = bucketize(&ten_day_days(), 2).unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].start, date("2024-01-01"));
        assert_eq!(buckets[0].end, date("2024-01-05"));
        assert_eq!(buckets[1].start, date("2024-01-06"));
        assert_eq!(buckets[1].end, date("2024-01-10"));
        assert_eq!(buckets[0].total_events, 4);
        assert_eq!(buckets[1].total_events, 2);
    }

    #[test]
    fn bucketing_conserves_totals() {
        let days = ten_day_days();
        for n in [1, 2, 3, 7, 10, 25] {
            let buckets = bucketize(&days, n).unwrap();
            let bucket_events: u64 = buckets.iter().map(|b| b.total_events).sum();
            let bucket_size: u64 = buckets.iter().map(|b| b.total_size).sum();
            let day_events: u64 = days.values().map(|d| d.total_events).sum();
            let day_size: u64 = days.values().map(|d| d.total_size).sum();
            assert_eq!(bucket_events, day_events, "n={n}");
            assert_eq!(bucket_size, day_size, "n={n}");
        }
    }

    #[test]
    fn always_returns_exactly_n_buckets() {
        let days = ten_day_days();
        for n in [1, 2, 9, 10, 11, 100] {
            assert_eq!(bucketize(&days, n).unwrap().len(), n);
        }
    }

    #[test]
    fn single_day_span_lands_in_the_first_bucket() {
        let days = aggregate_days(&[
            event("2024-06-15T08:00:00Z", EventKind::Commit, 10),
            event("2024-06-15T20:00:00Z", EventKind::PullRequest, 5),
        ]);

        let buckets = bucketize(&days, 10).unwrap();
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[0].total_events, 2);
        assert_eq!(buckets[0].total_size, 15);
        assert_eq!(buckets[0].start, date("2024-06-15"));
        assert_eq!(buckets[0].end, date("2024-06-15"));
        assert!(buckets[1..].iter().all(|b| b.total_events == 0));
    }

    #[test]
    fn windows_cover_the_span_without_gaps_or_overlaps() {
        let days = aggregate_days(&[
            event("2024-03-01T08:00:00Z", EventKind::Commit, 1),
            event("2024-03-30T08:00:00Z", EventKind::Commit, 1),
        ]);

        let buckets = bucketize(&days, 3).unwrap();
        assert_eq!(buckets[0].start, date("2024-03-01"));
        assert_eq!(buckets[buckets.len() - 1].end, date("2024-03-30"));
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].end + Duration::days(1), pair[1].start);
        }
    }

    #[test]
    fn empty_day_map_is_an_error() {
        let days: BTreeMap<String, DayBucket> = BTreeMap::new();
        assert!(matches!(
            bucketize(&days, 10).unwrap_err(),
            GhmapError::EmptyDataset
        ));
    }

    #[test]
    fn zero_buckets_is_an_error() {
        assert!(matches!(
            bucketize(&ten_day_days(), 0).unwrap_err(),
            GhmapError::InvalidBucketCount(0)
        ));
    }

    #[test]
    fn span_shorter_than_bucket_count_still_fills_from_the_front() {
        let days = aggregate_days(&[
            event("2024-01-01T08:00:00Z", EventKind::Commit, 1),
            event("2024-01-02T08:00:00Z", EventKind::Commit, 1),
            event("2024-01-03T08:00:00Z", EventKind::Commit, 1),
        ]);

        let buckets = bucketize(&days, 10).unwrap();
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[0].total_events, 1);
        assert_eq!(buckets[1].total_events, 1);
        assert_eq!(buckets[2].total_events, 1);
        assert!(buckets[3..].iter().all(|b| b.total_events == 0));
    }
}
