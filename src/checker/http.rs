// src/checker/http.rs
// =============================================================================
// This module answers one question per URL: what status does it return?
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Falls back to GET when the server answers 405 Method Not Allowed
// - Retries throttled / failing requests with exponential backoff
// - Follows redirects, so the final status is what gets reported
//
// The HTTP client sits behind the Prober trait. There are two probers:
// - HttpProber: the real thing, built on reqwest's blocking client
// - UnavailableProber: used in offline mode; every probe fails
// The choice is made once, when the validator is built.
//
// Why a *blocking* client?
// - All three dispatch strategies call the same probe function
// - Thread and process pools want a plain function call
// - The async strategy moves each call onto tokio's blocking pool
// =============================================================================

use super::retry::RetryPolicy;
use crate::config::HttpConfig;
use crate::error::CheckError;
use reqwest::blocking::{Client, Response};
use reqwest::{Method, StatusCode};
use std::time::Duration;
use thiserror::Error;

// Why a probe failed to produce a status code
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("HTTP client not available")]
    Unavailable,

    // reqwest's message already names the URL and the cause
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

// The part of the response we care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    /// Final status code (after redirects, after the GET fallback)
    pub status: u16,
    /// True when HEAD was refused with 405 and a GET was sent instead
    pub used_get_fallback: bool,
}

// Capability interface for "can we reach this URL?"
//
// Send + Sync because one prober is shared by every worker thread.
pub trait Prober: Send + Sync {
    fn is_available(&self) -> bool;
    fn probe(&self, url: &str, timeout: Duration) -> Result<ProbeResponse, ProbeError>;
}

// Prober backed by a real HTTP client
pub struct HttpProber {
    client: Client,
    retry: RetryPolicy,
}

impl HttpProber {
    pub fn new(http: &HttpConfig) -> Result<Self, CheckError> {
        let client = Client::builder()
            .user_agent(http.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(http.max_redirects))
            .build()
            .map_err(CheckError::HttpClient)?;

        Ok(Self {
            client,
            retry: RetryPolicy::from_config(http),
        })
    }

    // Sends one request, retrying per the policy
    //
    // Retried: statuses in the retry set, connection failures, timeouts.
    // When retries run out on a status, that last response is returned
    // so the caller still sees a status code.
    fn send(&self, method: Method, url: &str, timeout: Duration) -> Result<Response, reqwest::Error> {
        self.retry.run(
            || {
                self.client
                    .request(method.clone(), url)
                    .timeout(timeout)
                    .send()
            },
            |result| match result {
                Ok(response) => self.retry.retries_status(response.status().as_u16()),
                Err(e) => e.is_connect() || e.is_timeout(),
            },
            std::thread::sleep,
        )
    }
}

impl Prober for HttpProber {
    fn is_available(&self) -> bool {
        true
    }

    fn probe(&self, url: &str, timeout: Duration) -> Result<ProbeResponse, ProbeError> {
        // First, try a HEAD request (faster, no body download)
        let response = self.send(Method::HEAD, url, timeout)?;

        // Some servers don't implement HEAD at all; ask again with GET
        if response.status() == StatusCode::METHOD_NOT_ALLOWED {
            tracing::debug!("HEAD not allowed for {}, retrying with GET", url);
            let response = self.send(Method::GET, url, timeout)?;
            return Ok(ProbeResponse {
                status: response.status().as_u16(),
                used_get_fallback: true,
            });
        }

        Ok(ProbeResponse {
            status: response.status().as_u16(),
            used_get_fallback: false,
        })
    }
}

// Stand-in used when no HTTP client should (or could) be used
pub struct UnavailableProber;

impl Prober for UnavailableProber {
    fn is_available(&self) -> bool {
        false
    }

    fn probe(&self, _url: &str, _timeout: Duration) -> Result<ProbeResponse, ProbeError> {
        Err(ProbeError::Unavailable)
    }
}

// Picks the prober for a configuration
pub fn build_prober(http: &HttpConfig) -> Result<Box<dyn Prober>, CheckError> {
    if http.offline {
        tracing::info!("offline mode: links will not be probed");
        return Ok(Box::new(UnavailableProber));
    }
    Ok(Box::new(HttpProber::new(http)?))
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why HEAD first?
//    - HEAD returns the same status line as GET without the body
//    - Some servers (and some CDNs) answer HEAD with 405; GET settles it
//
// 2. What gets retried?
//    - 429 Too Many Requests and the 5xx statuses in the retry set
//    - Connection failures and timeouts
//    - Not 404: a missing page won't appear by asking again
//
// 3. What is #[error(transparent)]?
//    - thiserror forwards Display and source() to the wrapped error
//    - The text a user sees is reqwest's own, unchanged
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config(retries: u32) -> HttpConfig {
        HttpConfig {
            retry_attempts: retries,
            backoff_factor: 0.0,
            ..HttpConfig::default()
        }
    }

    fn timeout() -> Duration {
        Duration::from_secs(5)
    }

    #[test]
    fn test_head_success() {
        let mut server = mockito::Server::new();
        let head = server.mock("HEAD", "/ok").with_status(200).expect(1).create();

        let prober = HttpProber::new(&config(0)).unwrap();
        let response = prober.probe(&format!("{}/ok", server.url()), timeout()).unwrap();

        assert_eq!(response.status, 200);
        assert!(!response.used_get_fallback);
        head.assert();
    }

    #[test]
    fn test_405_falls_back_to_exactly_one_get() {
        let mut server = mockito::Server::new();
        let head = server.mock("HEAD", "/legacy").with_status(405).expect(1).create();
        let get = server.mock("GET", "/legacy").with_status(200).expect(1).create();

        let prober = HttpProber::new(&config(3)).unwrap();
        let response = prober
            .probe(&format!("{}/legacy", server.url()), timeout())
            .unwrap();

        assert_eq!(response.status, 200);
        assert!(response.used_get_fallback);
        head.assert();
        get.assert();
    }

    #[test]
    fn test_retryable_status_is_retried_then_reported() {
        let mut server = mockito::Server::new();
        let head = server.mock("HEAD", "/busy").with_status(503).expect(3).create();

        let prober = HttpProber::new(&config(2)).unwrap();
        let response = prober.probe(&format!("{}/busy", server.url()), timeout()).unwrap();

        assert_eq!(response.status, 503);
        head.assert();
    }

    #[test]
    fn test_not_found_is_not_retried() {
        let mut server = mockito::Server::new();
        let head = server.mock("HEAD", "/gone").with_status(404).expect(1).create();

        let prober = HttpProber::new(&config(3)).unwrap();
        let response = prober.probe(&format!("{}/gone", server.url()), timeout()).unwrap();

        assert_eq!(response.status, 404);
        head.assert();
    }

    #[test]
    fn test_connection_refused_is_an_error() {
        // Grab a free port, then close it so nothing is listening
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let prober = HttpProber::new(&config(0)).unwrap();
        let err = prober
            .probe(&format!("http://127.0.0.1:{}/", port), timeout())
            .unwrap_err();
        assert!(matches!(err, ProbeError::Transport(_)));
    }

    #[test]
    fn test_unavailable_prober() {
        let prober = UnavailableProber;
        assert!(!prober.is_available());
        let err = prober.probe("https://example.com", timeout()).unwrap_err();
        assert_eq!(err.to_string(), "HTTP client not available");
    }

    #[test]
    fn test_offline_config_selects_stub() {
        let http = HttpConfig {
            offline: true,
            ..HttpConfig::default()
        };
        assert!(!build_prober(&http).unwrap().is_available());
        assert!(build_prober(&HttpConfig::default()).unwrap().is_available());
    }
}
