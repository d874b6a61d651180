use thiserror::Error;

pub type Result<T> = std::result::Result<T, GhmapError>;

#[derive(Error, Debug)]
pub enum GhmapError {
    #[error("Malformed event: {0}")]
    MalformedEvent(String),
    #[error("No contribution data to bucketize")]
    EmptyDataset,
    #[error("Bucket count must be at least 1, got {0}")]
    InvalidBucketCount(usize),
    #[error("GitHub API error: {0}")]
    Api(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
