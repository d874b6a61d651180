use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub const SCHEMA_VERSION: u32 = 1;

/// Contribution kind. Assigned from the fetch call that produced the raw
/// record, never inferred from record content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Commit,
    PullRequest,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Commit => "commit",
            EventKind::PullRequest => "pull_request",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "commit" => Some(EventKind::Commit),
            "pull_request" => Some(EventKind::PullRequest),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized contribution record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub language: String,
    pub kind: EventKind,
    pub size: u64,
}

/// Aggregated totals for one calendar date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    pub total_events: u64,
    pub by_language: HashMap<String, u64>,
    pub by_kind: HashMap<EventKind, u64>,
    pub total_size: u64,
}

impl DayBucket {
    pub fn add(&mut self, event: &Event) {
        self.total_events += 1;
        *self.by_language.entry(event.language.clone()).or_insert(0) += 1;
        *self.by_kind.entry(event.kind).or_insert(0) += 1;
        self.total_size += event.size;
    }

    /// `total_events` must equal both breakdown sums.
    pub fn invariants_hold(&self) -> bool {
        self.total_events == self.by_kind.values().sum::<u64>()
            && self.total_events == self.by_language.values().sum::<u64>()
    }

    /// Most-used language of the day. Ties break to the lexicographically
    /// smallest name so the result is deterministic.
    pub fn top_language(&self) -> Option<&str> {
        self.by_language
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(lang, _)| lang.as_str())
    }
}

/// Derived per-day attributes, kept separate from the raw counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayInsight {
    pub top_language: String,
    pub significant_prs: bool,
}

/// One window of the fixed-cardinality period series. `start` and `end` are
/// both inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_events: u64,
    pub total_size: u64,
}

/// GitHub user profile fields surfaced by the `profile` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub avatar_url: String,
    pub years_on_github: i32,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoStats {
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub watchers: u64,
    pub issues_closed: u64,
}

impl RepoStats {
    /// Weighted popularity score, rounded to two decimals.
    pub fn score(&self) -> f64 {
        let score = self.stars as f64 * 0.4 + self.forks as f64 * 0.3
            + self.watchers as f64 * 0.2
            - self.open_issues as f64 * 0.1
            + self.issues_closed as f64 * 0.2;
        (score * 100.0).round() / 100.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoReport {
    pub repo_name: String,
    pub score: f64,
    pub details: RepoStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub username: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub days: BTreeMap<String, DayBucket>,
    pub insights: BTreeMap<String, DayInsight>,
    pub buckets: Vec<PeriodBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub username: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub profile: UserProfile,
    pub repository: RepoReport,
}

#[derive(Debug, Clone)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new() -> Self {
        Self { since: None, until: None }
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if timestamp < &since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp > &until {
                return false;
            }
        }
        true
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::new()
    }
}
