// src/config.rs
// =============================================================================
// Configuration for a link check run.
//
// Values come from three layers, lowest priority first:
// 1. Built-in defaults (CheckConfig::default)
// 2. A TOML file (--config, or ./doclinks.toml when present)
// 3. Command-line flags (ConfigOverrides, filled in by main.rs)
//
// The HTTP settings live in their own [http] table because they travel on
// their own: process-pool workers receive them (plus the skip list) as JSON.
// =============================================================================

use crate::checker::ProbeSettings;
use crate::dispatch::Strategy;
use crate::error::CheckError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// File name picked up from the working directory when --config is not given.
pub const DEFAULT_CONFIG_FILE: &str = "doclinks.toml";

/// Status codes that make the HTTP client retry a request.
pub const DEFAULT_RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Settings for the HTTP client used to probe links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds (fractions allowed).
    pub timeout_secs: f64,
    /// Extra attempts after the first one for retryable failures.
    pub retry_attempts: u32,
    /// Exponential backoff factor in seconds.
    pub backoff_factor: f64,
    /// Response statuses that are retried.
    pub retry_statuses: Vec<u16>,
    pub user_agent: String,
    pub max_redirects: usize,
    /// When true no HTTP client is built; every non-skipped link fails.
    pub offline: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10.0,
            retry_attempts: 3,
            backoff_factor: 1.0,
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
            user_agent: concat!("doclinks/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 10,
            offline: false,
        }
    }
}

impl HttpConfig {
    /// The request timeout as a Duration, rejecting zero, negative and
    /// non-finite values.
    pub fn timeout(&self) -> Result<Duration, CheckError> {
        if self.timeout_secs.is_nan() || self.timeout_secs <= 0.0 {
            return Err(CheckError::InvalidTimeout(self.timeout_secs));
        }
        Duration::try_from_secs_f64(self.timeout_secs)
            .map_err(|_| CheckError::InvalidTimeout(self.timeout_secs))
    }
}

/// Full configuration of a link check run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Root of the documentation tree to scan.
    pub docs_path: PathBuf,
    /// Base URL that relative markdown links are joined onto. Required.
    pub base_url: Option<String>,
    /// Markup file extension, without the dot.
    pub extension: String,
    /// Pool size / concurrency limit for dispatch.
    pub workers: usize,
    pub strategy: Strategy,
    /// Hosts that are never probed (reported as skipped).
    pub skip_domains: Vec<String>,
    pub http: HttpConfig,
    /// Program launched for process-pool workers. Defaults to the running
    /// executable; never read from the config file.
    #[serde(skip)]
    pub worker_program: Option<PathBuf>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            docs_path: PathBuf::from("docs"),
            base_url: None,
            extension: "md".to_string(),
            workers: 10,
            strategy: Strategy::default(),
            skip_domains: vec![
                "localhost".to_string(),
                "127.0.0.1".to_string(),
                "0.0.0.0".to_string(),
            ],
            http: HttpConfig::default(),
            worker_program: None,
        }
    }
}

/// Command-line values that win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub docs_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub workers: Option<usize>,
    pub timeout_secs: Option<f64>,
    pub strategy: Option<Strategy>,
    pub offline: bool,
}

impl CheckConfig {
    /// Loads the config file layer.
    ///
    /// An explicit path must exist. Without one, `./doclinks.toml` is used if
    /// it exists, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CheckError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let data = fs::read_to_string(&path).map_err(|source| CheckError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let cfg = Self::from_toml_str(&data, &path)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(cfg)
    }

    /// Parses TOML text; `origin` is only used in error messages.
    pub fn from_toml_str(data: &str, origin: &Path) -> Result<Self, CheckError> {
        toml::from_str(data).map_err(|source| CheckError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(docs_path) = overrides.docs_path {
            self.docs_path = docs_path;
        }
        if let Some(base_url) = overrides.base_url {
            self.base_url = Some(base_url);
        }
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.http.timeout_secs = timeout_secs;
        }
        if let Some(strategy) = overrides.strategy {
            self.strategy = strategy;
        }
        if overrides.offline {
            self.http.offline = true;
        }
    }

    /// Checks everything that doesn't need the filesystem. Returns the parsed
    /// base URL since every caller needs it next.
    pub fn validate(&self) -> Result<Url, CheckError> {
        if self.workers == 0 {
            return Err(CheckError::InvalidWorkers);
        }
        self.http.timeout()?;
        let raw = self.base_url.as_deref().ok_or(CheckError::MissingBaseUrl)?;
        Url::parse(raw).map_err(|source| CheckError::InvalidBaseUrl {
            url: raw.to_string(),
            source,
        })
    }

    /// The part of the config a validator needs, in a form that can be sent
    /// to a worker process.
    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            http: self.http.clone(),
            skip_domains: self.skip_domains.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = CheckConfig::default();
        assert_eq!(cfg.docs_path, PathBuf::from("docs"));
        assert_eq!(cfg.extension, "md");
        assert_eq!(cfg.workers, 10);
        assert_eq!(cfg.strategy, Strategy::Thread);
        assert_eq!(cfg.skip_domains, vec!["localhost", "127.0.0.1", "0.0.0.0"]);
        assert_eq!(cfg.http.retry_attempts, 3);
        assert_eq!(cfg.http.retry_statuses, vec![429, 500, 502, 503, 504]);
        assert!(cfg.base_url.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
            base_url = "https://example.com/docs/"
            workers = 4
            strategy = "async"

            [http]
            timeout_secs = 2.5
            offline = true
        "#;
        let cfg = CheckConfig::from_toml_str(toml, Path::new("test.toml")).unwrap();
        assert_eq!(cfg.base_url.as_deref(), Some("https://example.com/docs/"));
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.strategy, Strategy::Cooperative);
        assert_eq!(cfg.http.timeout_secs, 2.5);
        assert!(cfg.http.offline);
        assert_eq!(cfg.http.retry_attempts, 3);
        assert_eq!(cfg.extension, "md");
    }

    #[test]
    fn test_bad_toml_reports_path() {
        let err = CheckConfig::from_toml_str("workers = \"many\"", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, CheckError::ConfigParse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = CheckConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, CheckError::ConfigRead { .. }));
    }

    #[test]
    fn test_overrides_win() {
        let mut cfg = CheckConfig::default();
        cfg.apply(ConfigOverrides {
            docs_path: Some(PathBuf::from("site/docs")),
            base_url: Some("https://example.org/".to_string()),
            workers: Some(3),
            timeout_secs: Some(0.5),
            strategy: Some(Strategy::Process),
            offline: true,
        });
        assert_eq!(cfg.docs_path, PathBuf::from("site/docs"));
        assert_eq!(cfg.base_url.as_deref(), Some("https://example.org/"));
        assert_eq!(cfg.workers, 3);
        assert_eq!(cfg.http.timeout_secs, 0.5);
        assert_eq!(cfg.strategy, Strategy::Process);
        assert!(cfg.http.offline);
    }

    #[test]
    fn test_validate() {
        let mut cfg = CheckConfig::default();
        assert!(matches!(cfg.validate(), Err(CheckError::MissingBaseUrl)));

        cfg.base_url = Some("not a url".to_string());
        assert!(matches!(cfg.validate(), Err(CheckError::InvalidBaseUrl { .. })));

        cfg.base_url = Some("https://example.com/docs/".to_string());
        let base = cfg.validate().unwrap();
        assert_eq!(base.as_str(), "https://example.com/docs/");

        cfg.workers = 0;
        assert!(matches!(cfg.validate(), Err(CheckError::InvalidWorkers)));

        cfg.workers = 1;
        cfg.http.timeout_secs = 0.0;
        assert!(matches!(cfg.validate(), Err(CheckError::InvalidTimeout(_))));
        cfg.http.timeout_secs = f64::NAN;
        assert!(matches!(cfg.validate(), Err(CheckError::InvalidTimeout(_))));
    }
}
