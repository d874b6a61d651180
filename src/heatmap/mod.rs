pub mod aggregate;
pub mod bucket;
pub mod exec;
pub mod fetch;
pub mod normalize;
pub mod output;

pub use aggregate::{aggregate_days, day_insights};
pub use bucket::bucketize;
pub use exec::exec;
pub use fetch::fetch_events;
pub use normalize::{normalize_events, normalize_record};
pub use output::{output_heatmap, output_json, output_ndjson};

pub const DEFAULT_BUCKETS: usize = 10;
