use crate::model::{DayBucket, DayInsight, Event, EventKind};
use crate::util::day_key;
use std::collections::BTreeMap;

/// Group events by calendar day. Single pass, order-independent; an empty
/// input yields an empty map.
pub fn aggregate_days(events: &[Event]) -> BTreeMap<String, DayBucket> {
    let mut days: BTreeMap<String, DayBucket> = BTreeMap::new();

    for event in events {
        days.entry(day_key(&event.timestamp))
            .or_default()
            .add(event);
    }

    // A bucket whose breakdowns disagree with its total is an aggregation bug.
    debug_assert!(days.values().all(DayBucket::invariants_hold));

    days
}

/// Derived attributes per day: the dominant language and whether any pull
/// requests landed.
pub fn day_insights(days: &BTreeMap<String, DayBucket>) -> BTreeMap<String, DayInsight> {
    days.iter()
        .map(|(date, bucket)| {
            (
                date.clone(),
                DayInsight {
                    top_language: bucket.top_language().unwrap_or("Unknown").to_string(),
                    significant_prs: bucket
                        .by_kind
                        .get(&EventKind::PullRequest)
                        .copied()
                        .unwrap_or(0)
                        > 0,
                },
            )
        })
        .collect()
}
