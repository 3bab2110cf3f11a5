// src/checker/retry.rs
// =============================================================================
// Bounded retry with exponential backoff for probe requests.
// =============================================================================

use crate::config::HttpConfig;
use std::time::Duration;

/// Longest sleep between two attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts allowed after the first one.
    pub retries: u32,
    /// Seconds; 0 disables sleeping entirely.
    pub backoff_factor: f64,
    pub statuses: Vec<u16>,
}

impl RetryPolicy {
    pub fn from_config(http: &HttpConfig) -> Self {
        Self {
            retries: http.retry_attempts,
            backoff_factor: http.backoff_factor.max(0.0),
            statuses: http.retry_statuses.clone(),
        }
    }

    pub fn retries_status(&self, status: u16) -> bool {
        self.statuses.contains(&status)
    }

    /// Delay before the next attempt, given how many attempts in a row have
    /// failed so far (1-based).
    ///
    /// The first retry goes out immediately; after that the delay doubles:
    /// factor * 2^(failures - 1), capped at two minutes.
    pub fn backoff(&self, failures: u32) -> Duration {
        if failures <= 1 || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let exp = failures.saturating_sub(1).min(16) as i32;
        let secs = self.backoff_factor * 2f64.powi(exp);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF)
    }

    /// Runs `attempt` until it succeeds, fails in a way `is_retryable` rejects,
    /// or the retry budget is spent. The last result is returned either way.
    pub fn run<T, E>(
        &self,
        mut attempt: impl FnMut() -> Result<T, E>,
        is_retryable: impl Fn(&Result<T, E>) -> bool,
        sleep: impl Fn(Duration),
    ) -> Result<T, E> {
        let mut failures = 0u32;
        loop {
            let result = attempt();
            if failures >= self.retries || !is_retryable(&result) {
                return result;
            }
            failures += 1;
            let delay = self.backoff(failures);
            tracing::debug!("retry {}/{} after {:?}", failures, self.retries, delay);
            if !delay.is_zero() {
                sleep(delay);
            }
        }
    }
}
