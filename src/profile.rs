use crate::cli::CommonArgs;
use crate::github::GitHubClient;
use crate::model::{ProfileOutput, SCHEMA_VERSION};
use anyhow::Context;
use chrono::Utc;
use console::style;

pub fn exec(common: CommonArgs, json: bool) -> anyhow::Result<()> {
    let client = GitHubClient::new(&common.token).context("Failed to build GitHub client")?;

    let profile = client
        .fetch_user(&common.user)
        .context("Failed to fetch user profile")?;
    let repository = client
        .fetch_top_repo(&common.user)
        .context("Failed to fetch repository stats")?;

    let output = ProfileOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        profile,
        repository,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        output_summary(&output);
    }

    Ok(())
}

fn output_summary(output: &ProfileOutput) {
    let profile = &output.profile;
    let repo = &output.repository;

    println!("{}", style(&profile.username).bold());
    if let Some(bio) = &profile.bio {
        println!("{}", style(bio).dim());
    }
    println!("{}", "─".repeat(50));

    println!("Years on GitHub: {}", style(profile.years_on_github).cyan());
    println!("Public repos:    {}", style(profile.public_repos).cyan());
    println!("Followers:       {}", style(profile.followers).cyan());
    println!("Following:       {}", style(profile.following).cyan());

    println!("\n{} {}", style("Latest repository:").bold(), repo.repo_name);
    println!("Score:        {}", style(repo.score).yellow());
    println!("Stars:        {}", style(repo.details.stars).green());
    println!("Forks:        {}", style(repo.details.forks).green());
    println!("Watchers:     {}", style(repo.details.watchers).green());
    println!("Open issues:  {}", style(repo.details.open_issues).red());

    println!("\nUse --json to export the raw data.");
}
