use crate::cache::Cache;
use crate::cli::CommonArgs;
use crate::github::GitHubClient;
use crate::heatmap::fetch_events;
use crate::model::{Event, EventKind, ExportOutput, SCHEMA_VERSION};
use crate::util::{day_key, resolve_range};
use anyhow::Context;
use chrono::Utc;
use std::collections::HashSet;

pub fn exec(common: CommonArgs, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let client = GitHubClient::new(&common.token).context("Failed to build GitHub client")?;
    let mut cache = Cache::new(common.cache.as_deref()).context("Failed to initialize cache")?;

    let range = resolve_range(common.since.as_deref(), common.until.as_deref())
        .context("Failed to resolve date range")?;

    let mut events = fetch_events(
        &client,
        &mut cache,
        &common.user,
        &range,
        common.refresh,
        !json && !ndjson,
    )?;
    events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    if json {
        output_json(&events, &common)?;
    } else if ndjson {
        output_ndjson(&events)?;
    } else {
        output_summary(&events);
    }

    Ok(())
}

fn output_json(events: &[Event], common: &CommonArgs) -> anyhow::Result<()> {
    let output = ExportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        username: common.user.clone(),
        since: common.since.clone(),
        until: common.until.clone(),
        events: events.to_vec(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_ndjson(events: &[Event]) -> anyhow::Result<()> {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

fn output_summary(events: &[Event]) {
    use console::style;

    println!("{}", style("Export Summary").bold());
    println!("{}", "─".repeat(50));

    let total = events.len();
    let commits = events.iter().filter(|e| e.kind == EventKind::Commit).count();
    let pull_requests = events
        .iter()
        .filter(|e| e.kind == EventKind::PullRequest)
        .count();
    let total_size: u64 = events.iter().map(|e| e.size).sum();
    let languages: HashSet<_> = events.iter().map(|e| e.language.as_str()).collect();

    println!("Total events:     {}", style(total).cyan());
    println!("Commits:          {}", style(commits).cyan());
    println!("Pull requests:    {}", style(pull_requests).cyan());
    println!("Lines changed:    {}", style(total_size).green());
    println!("Unique languages: {}", style(languages.len()).yellow());

    if let (Some(first), Some(last)) = (events.first(), events.last()) {
        println!(
            "Date range: {} to {}",
            style(day_key(&first.timestamp)).dim(),
            style(day_key(&last.timestamp)).dim()
        );
    }

    println!("\nUse --json or --ndjson flags to export the raw data.");
}
