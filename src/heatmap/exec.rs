use crate::cache::Cache;
use crate::cli::CommonArgs;
use crate::github::GitHubClient;
use crate::util::resolve_range;
use anyhow::Context;

use super::{aggregate_days, bucketize, day_insights, fetch_events, output_heatmap, output_json, output_ndjson};

pub fn exec(common: CommonArgs, json: bool, ndjson: bool, buckets: usize) -> anyhow::Result<()> {
    let client = GitHubClient::new(&common.token).context("Failed to build GitHub client")?;
    let mut cache = Cache::new(common.cache.as_deref()).context("Failed to initialize cache")?;

    let range = resolve_range(common.since.as_deref(), common.until.as_deref())
        .context("Failed to resolve date range")?;

    // Spinner only when rendering for a terminal; JSON/NDJSON output stays clean.
    let events = fetch_events(
        &client,
        &mut cache,
        &common.user,
        &range,
        common.refresh,
        !json && !ndjson,
    )?;

    let days = aggregate_days(&events);
    let insights = day_insights(&days);
    let series = bucketize(&days, buckets).context("Failed to derive period series")?;

    if json {
        output_json(&days, &insights, &series, &common)?;
    } else if ndjson {
        output_ndjson(&days, &insights)?;
    } else {
        output_heatmap(&series, &days, &common)?;
    }

    Ok(())
}
