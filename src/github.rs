use crate::error::{GhmapError, Result};
use crate::model::{RepoReport, RepoStats, UserProfile};
use chrono::{DateTime, Datelike, Utc};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("ghmap/", env!("CARGO_PKG_VERSION"));

/// Repositories ordered by last update, each carrying its primary language
/// and the default branch's recent commit history.
const COMMITS_QUERY: &str = r#"
    query($username: String!) {
        user(login: $username) {
            repositories(first: 100, orderBy: {field: UPDATED_AT, direction: DESC}) {
                nodes {
                    name
                    primaryLanguage {
                        name
                    }
                    defaultBranchRef {
                        target {
                            ... on Commit {
                                history(first: 100) {
                                    nodes {
                                        committedDate
                                        additions
                                        deletions
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
"#;

const PULL_REQUESTS_QUERY: &str = r#"
    query($username: String!) {
        user(login: $username) {
            pullRequests(first: 100, orderBy: {field: CREATED_AT, direction: DESC}) {
                nodes {
                    createdAt
                    additions
                    deletions
                    repository {
                        primaryLanguage {
                            name
                        }
                    }
                }
            }
        }
    }
"#;

pub struct GitHubClient {
    http: Client,
    api_base: String,
    token: String,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_base: API_BASE.to_string(),
            token: token.to_string(),
        })
    }

    fn get(&self, path: &str) -> Result<Value> {
        let response = self
            .http
            .get(format!("{}{}", self.api_base, path))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(GhmapError::Api(format!(
                "GET {path} failed with status {status}: {body}"
            )));
        }

        Ok(response.json()?)
    }

    fn graphql(&self, query: &str, variables: Value) -> Result<Value> {
        let response = self
            .http
            .post(format!("{}/graphql", self.api_base))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .json(&json!({ "query": query, "variables": variables }))
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(GhmapError::Api(format!(
                "GraphQL request failed with status {status}: {body}"
            )));
        }

        let payload: Value = response.json()?;
        if let Some(errors) = payload.get("errors") {
            if !errors.is_null() {
                return Err(GhmapError::Api(format!("GraphQL errors: {errors}")));
            }
        }

        payload
            .get("data")
            .cloned()
            .ok_or_else(|| GhmapError::Api("GraphQL response has no data".to_string()))
    }

    /// Raw commit records across the user's recently updated repositories.
    /// Each record carries the owning repository's primary language when the
    /// repository declares one.
    pub fn fetch_commits(&self, username: &str) -> Result<Vec<Value>> {
        let data = self.graphql(COMMITS_QUERY, json!({ "username": username }))?;
        Ok(commit_records(&data))
    }

    /// Raw pull-request records for the user.
    pub fn fetch_pull_requests(&self, username: &str) -> Result<Vec<Value>> {
        let data = self.graphql(PULL_REQUESTS_QUERY, json!({ "username": username }))?;
        Ok(pull_request_records(&data))
    }

    pub fn fetch_user(&self, username: &str) -> Result<UserProfile> {
        let user = self.get(&format!("/users/{username}"))?;

        let created_at_str = user
            .get("created_at")
            .and_then(Value::as_str)
            .ok_or_else(|| GhmapError::Api("User payload missing created_at".to_string()))?;
        let created_at = DateTime::parse_from_rfc3339(created_at_str)
            .map_err(|e| GhmapError::Parse(format!("Invalid created_at '{created_at_str}': {e}")))?
            .with_timezone(&Utc);

        Ok(UserProfile {
            username: user
                .get("login")
                .and_then(Value::as_str)
                .unwrap_or(username)
                .to_string(),
            avatar_url: user
                .get("avatar_url")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            years_on_github: years_between(created_at, Utc::now()),
            public_repos: user.get("public_repos").and_then(Value::as_u64).unwrap_or(0),
            followers: user.get("followers").and_then(Value::as_u64).unwrap_or(0),
            following: user.get("following").and_then(Value::as_u64).unwrap_or(0),
            bio: user.get("bio").and_then(Value::as_str).map(str::to_string),
        })
    }

    /// Score the user's most recently updated repository.
    pub fn fetch_top_repo(&self, username: &str) -> Result<RepoReport> {
        let repos = self.get(&format!("/users/{username}/repos?sort=updated&per_page=1"))?;

        let repo = repos
            .as_array()
            .and_then(|arr| arr.first())
            .ok_or_else(|| GhmapError::Api(format!("No public repositories for {username}")))?;

        let details = RepoStats {
            stars: repo.get("stargazers_count").and_then(Value::as_u64).unwrap_or(0),
            forks: repo.get("forks_count").and_then(Value::as_u64).unwrap_or(0),
            open_issues: repo.get("open_issues_count").and_then(Value::as_u64).unwrap_or(0),
            watchers: repo.get("watchers_count").and_then(Value::as_u64).unwrap_or(0),
            // Not part of the standard repo payload; present only on some
            // GitHub Enterprise responses.
            issues_closed: repo.get("closed_issues_count").and_then(Value::as_u64).unwrap_or(0),
        };

        Ok(RepoReport {
            repo_name: repo
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            score: details.score(),
            details,
        })
    }
}

/// Flatten the repositories response into per-commit records, stamping each
/// with its repository's primary language.
fn commit_records(data: &Value) -> Vec<Value> {
    let repos = data
        .pointer("/user/repositories/nodes")
        .and_then(Value::as_array);

    let mut records = Vec::new();
    for repo in repos.into_iter().flatten() {
        let language = repo
            .pointer("/primaryLanguage/name")
            .and_then(Value::as_str);

        let commits = repo
            .pointer("/defaultBranchRef/target/history/nodes")
            .and_then(Value::as_array);

        for commit in commits.into_iter().flatten() {
            let mut record = commit.clone();
            if let (Some(obj), Some(lang)) = (record.as_object_mut(), language) {
                obj.insert("language".to_string(), Value::String(lang.to_string()));
            }
            records.push(record);
        }
    }
    records
}

fn pull_request_records(data: &Value) -> Vec<Value> {
    data.pointer("/user/pullRequests/nodes")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn years_between(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i32 {
    now.year() - created_at.year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_records_flatten_repos_and_stamp_language() {
        let data = json!({
            "user": {
                "repositories": {
                    "nodes": [
                        {
                            "name": "rusty",
                            "primaryLanguage": { "name": "Rust" },
                            "defaultBranchRef": {
                                "target": {
                                    "history": {
                                        "nodes": [
                                            { "committedDate": "2024-01-01T10:00:00Z", "additions": 3, "deletions": 1 },
                                            { "committedDate": "2024-01-02T10:00:00Z", "additions": 0, "deletions": 0 }
                                        ]
                                    }
                                }
                            }
                        },
                        {
                            "name": "empty",
                            "primaryLanguage": null,
                            "defaultBranchRef": null
                        }
                    ]
                }
            }
        });

        let records = commit_records(&data);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["language"], "Rust");
        assert_eq!(records[1]["committedDate"], "2024-01-02T10:00:00Z");
    }

    #[test]
    fn commit_records_omit_language_when_repo_declares_none() {
        let data = json!({
            "user": {
                "repositories": {
                    "nodes": [{
                        "name": "mystery",
                        "primaryLanguage": null,
                        "defaultBranchRef": {
                            "target": {
                                "history": {
                                    "nodes": [
                                        { "committedDate": "2024-01-01T10:00:00Z", "additions": 1, "deletions": 0 }
                                    ]
                                }
                            }
                        }
                    }]
                }
            }
        });

        let records = commit_records(&data);
        assert_eq!(records.len(), 1);
        assert!(records[0].get("language").is_none());
    }

    #[test]
    fn pull_request_records_pass_nodes_through() {
        let data = json!({
            "user": {
                "pullRequests": {
                    "nodes": [
                        {
                            "createdAt": "2024-01-05T09:00:00Z",
                            "additions": 10,
                            "deletions": 2,
                            "repository": { "primaryLanguage": { "name": "Go" } }
                        }
                    ]
                }
            }
        });

        let records = pull_request_records(&data);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["additions"], 10);
    }

    #[test]
    fn pull_request_records_tolerate_missing_user() {
        assert!(pull_request_records(&json!({ "user": null })).is_empty());
    }

    #[test]
    fn years_between_uses_calendar_years() {
        let created = DateTime::parse_from_rfc3339("2018-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let now = DateTime::parse_from_rfc3339("2024-02-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(years_between(created, now), 6);
    }
}
