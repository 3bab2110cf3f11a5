// src/error.rs
// =============================================================================
// Library error type.
//
// Only setup problems end up here: bad configuration, a missing docs tree, a
// strategy this build can't run. Problems with individual files or links are
// never errors at this level - they are logged or turned into outcomes.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("docs path does not exist: {}", .0.display())]
    DocsPathMissing(PathBuf),

    #[error("no base URL configured (set base_url in the config file or pass --base-url)")]
    MissingBaseUrl,

    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(f64),

    #[error("worker count must be at least 1")]
    InvalidWorkers,

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The requested dispatch strategy was not compiled into this build.
    #[error("the {0} dispatch strategy is not available in this build")]
    StrategyUnavailable(&'static str),

    #[error("cannot locate the worker executable: {0}")]
    WorkerExecutable(#[source] std::io::Error),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("failed to start thread pool: {0}")]
    ThreadPool(#[source] rayon::ThreadPoolBuildError),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("invalid worker settings: {0}")]
    WorkerSettings(#[source] serde_json::Error),
}

impl CheckError {
    /// True for "this build/environment can't do that" failures, which the
    /// CLI reports with exit code 1 instead of 2.
    pub fn is_precondition(&self) -> bool {
        matches!(self, CheckError::StrategyUnavailable(_))
    }
}
