// src/checker/validate.rs
// =============================================================================
// This module turns one link target into one ValidationOutcome.
//
// Order of decisions:
// 1. Is the host on the skip list (localhost and friends)? -> skipped
// 2. Is there an HTTP client at all?                       -> broken if not
// 3. Probe it: status < 400 is valid, anything else is broken
// 4. Any transport error becomes a broken outcome with the error text
//
// validate() never returns an error and never panics on bad input: every
// target gets exactly one outcome.
// =============================================================================

use super::http::{build_prober, Prober};
use crate::config::HttpConfig;
use crate::error::CheckError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use url::Url;

/// Marker placed in `error_message` for targets that were not probed.
pub const SKIPPED: &str = "skipped";

// The result of validating a single target
//
// Serializable because process-pool workers send these back to the parent
// as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub target: String,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub elapsed_seconds: f64,
}

impl ValidationOutcome {
    pub fn skipped(target: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            target: target.into(),
            valid: true,
            status_code: None,
            error_message: Some(SKIPPED.to_string()),
            elapsed_seconds: elapsed.as_secs_f64(),
        }
    }

    pub fn failed(target: impl Into<String>, error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            target: target.into(),
            valid: false,
            status_code: None,
            error_message: Some(error.into()),
            elapsed_seconds: elapsed.as_secs_f64(),
        }
    }

    pub fn with_status(target: impl Into<String>, status: u16, elapsed: Duration) -> Self {
        Self {
            target: target.into(),
            valid: status < 400,
            status_code: Some(status),
            error_message: None,
            elapsed_seconds: elapsed.as_secs_f64(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.error_message
            .as_deref()
            .map(|msg| msg.contains(SKIPPED))
            .unwrap_or(false)
    }
}

/// Everything needed to rebuild a Validator somewhere else (a worker process).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeSettings {
    pub http: HttpConfig,
    pub skip_domains: Vec<String>,
}

pub struct Validator {
    prober: Box<dyn Prober>,
    skip_domains: Vec<String>,
    timeout: Duration,
}

impl Validator {
    pub fn new(prober: Box<dyn Prober>, skip_domains: Vec<String>, timeout: Duration) -> Self {
        let skip_domains = skip_domains
            .into_iter()
            .map(|d| d.trim().to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self {
            prober,
            skip_domains,
            timeout,
        }
    }

    pub fn from_settings(settings: &ProbeSettings) -> Result<Self, CheckError> {
        let timeout = settings.http.timeout()?;
        let prober = build_prober(&settings.http)?;
        Ok(Self::new(prober, settings.skip_domains.clone(), timeout))
    }

    pub fn validate(&self, target: &str) -> ValidationOutcome {
        let started = Instant::now();

        if self.is_skipped(target) {
            return ValidationOutcome::skipped(target, started.elapsed());
        }

        if !self.prober.is_available() {
            return ValidationOutcome::failed(target, "HTTP client not available", started.elapsed());
        }

        match self.prober.probe(target, self.timeout) {
            Ok(response) => {
                if response.used_get_fallback {
                    tracing::debug!("{} rejected HEAD, answered GET with {}", target, response.status);
                }
                ValidationOutcome::with_status(target, response.status, started.elapsed())
            }
            Err(e) => {
                tracing::debug!("probe failed for {}: {}", target, e);
                ValidationOutcome::failed(target, e.to_string(), started.elapsed())
            }
        }
    }

    // Host-based match when the target parses as a URL: exact host or any
    // subdomain of a skip entry. Targets that don't parse fall back to a
    // substring check so "localhost" mentions still get caught.
    pub fn is_skipped(&self, target: &str) -> bool {
        match Url::parse(target) {
            Ok(url) => match url.host_str() {
                Some(host) => {
                    let host = host.trim_start_matches('[').trim_end_matches(']').to_ascii_lowercase();
                    self.skip_domains.iter().any(|skip| {
                        host == *skip || host.strip_suffix(skip.as_str()).map_or(false, |rest| rest.ends_with('.'))
                    })
                }
                None => false,
            },
            Err(_) => {
                let lowered = target.to_ascii_lowercase();
                self.skip_domains.iter().any(|skip| lowered.contains(skip.as_str()))
            }
        }
    }
}
