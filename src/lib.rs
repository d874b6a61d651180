pub mod cache;
pub mod cli;
pub mod error;
pub mod export;
pub mod github;
pub mod heatmap;
pub mod model;
pub mod profile;
pub mod util;
