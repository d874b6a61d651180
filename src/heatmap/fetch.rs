use crate::cache::Cache;
use crate::github::GitHubClient;
use crate::model::{DateRange, Event, EventKind};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};

use super::normalize_events;

/// Events for `username` within `range`, served from the cache when a
/// snapshot exists. A refresh (or a cache miss) fetches commits and pull
/// requests from the API, normalizes them, and replaces the stored snapshot.
pub fn fetch_events(
    client: &GitHubClient,
    cache: &mut Cache,
    username: &str,
    range: &DateRange,
    refresh: bool,
    progress: bool,
) -> anyhow::Result<Vec<Event>> {
    if !refresh {
        if let Some(events) = cache
            .get_events(username, range)
            .context("Failed to read cached events")?
        {
            log::debug!("Using {} cached events for {username}", events.len());
            return Ok(events);
        }
    }

    let pb = if progress {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Fetching contributions for {username}..."));

    let commits = client
        .fetch_commits(username)
        .context("Failed to fetch commits")?;
    pb.set_message(format!("Fetching pull requests for {username}..."));
    let pull_requests = client
        .fetch_pull_requests(username)
        .context("Failed to fetch pull requests")?;
    pb.finish_and_clear();

    let mut events = normalize_events(&commits, EventKind::Commit);
    events.extend(normalize_events(&pull_requests, EventKind::PullRequest));
    log::info!(
        "Normalized {} events from {} commits and {} pull requests",
        events.len(),
        commits.len(),
        pull_requests.len()
    );

    cache
        .store_events(username, &events)
        .context("Failed to store events in cache")?;

    Ok(events
        .into_iter()
        .filter(|event| range.contains(&event.timestamp))
        .collect())
}
