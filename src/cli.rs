use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ghmap")]
#[command(about = "GitHub profile analysis tool for contribution heatmaps and activity summaries")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, help = "GitHub username to analyze")]
    pub user: String,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, help = "GitHub API token")]
    pub token: String,

    #[arg(long, help = "Path to cache directory")]
    pub cache: Option<PathBuf>,

    #[arg(long, help = "Bypass the cache and refetch from the API")]
    pub refresh: bool,

    #[arg(long, help = "Start of the date range (RFC3339, YYYY-MM-DD, or e.g. '2 weeks ago')")]
    pub since: Option<String>,

    #[arg(long, help = "End of the date range (RFC3339, YYYY-MM-DD, or e.g. '2 weeks ago')")]
    pub until: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    Heatmap {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON, one line per day")]
        ndjson: bool,

        #[arg(long, help = "Number of period buckets", default_value_t = crate::heatmap::DEFAULT_BUCKETS)]
        buckets: usize,
    },
    Profile {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    Export {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON, one line per event")]
        ndjson: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Heatmap { json, ndjson, buckets } => {
                crate::heatmap::exec(self.common, json, ndjson, buckets)
            }
            Commands::Profile { json } => crate::profile::exec(self.common, json),
            Commands::Export { json, ndjson } => crate::export::exec(self.common, json, ndjson),
        }
    }
}
