//! Error types for the lt-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// and gives frontends one error to report.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Aggregation failed: {0}")]
    Aggregate(String),

    #[error("Failed to start export tool {program}: {source}")]
    ExportToolSpawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Export tool exited with {}", .code.map(|c| c.to_string()).unwrap_or_else(|| "a signal".to_string()))]
    ExportTool { code: Option<i32> },

    #[error("Export tool did not finish within {timeout_s} s")]
    ExportToolTimeout { timeout_s: u64 },

    #[error("No export inputs matched {pattern} in {}", .dir.display())]
    NoExportInputs { pattern: String, dir: PathBuf },

    #[error("No vector or scalar results available in {}", .dir.display())]
    NoResults { dir: PathBuf },

    #[error("Run not found: numNodes = {0}")]
    RunNotFound(u32),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Process exit code a frontend should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::ExportTool { code: Some(code) } if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// Result type for lt-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<lt_config::ConfigError> for AppError {
    fn from(err: lt_config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<lt_config::ValidationError> for AppError {
    fn from(err: lt_config::ValidationError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<lt_results::ResultsError> for AppError {
    fn from(err: lt_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}

impl From<lt_aggregate::AggregateError> for AppError {
    fn from(err: lt_aggregate::AggregateError) -> Self {
        AppError::Aggregate(err.to_string())
    }
}
