//! lt-results: raw export records, aggregated run types and the tiered cache.

pub mod hash;
pub mod raw;
pub mod series;
pub mod store;
pub mod types;

pub use hash::fingerprint_bytes;
pub use raw::{parse_export_str, read_export_json};
pub use series::SeriesStore;
pub use store::{CacheStore, CacheTier};
pub use types::*;

use std::path::PathBuf;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot encoding error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("Required input not found: {}", .path.display())]
    MissingInput { path: PathBuf },

    #[error("Malformed record in run {run} ({module} / {name}): {reason}")]
    MalformedRecord {
        run: String,
        module: String,
        name: String,
        reason: String,
    },

    #[error("Series {metric}: x has {x_len} points but y has {y_len}")]
    SeriesShape {
        metric: String,
        x_len: usize,
        y_len: usize,
    },

    #[error("Invalid series name: {0}")]
    InvalidSeriesName(String),
}
