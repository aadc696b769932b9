//! Blocking HTTP session with retry/backoff and a rotating client identity.
//!
//! The session picks one User-Agent at random from a fixed pool when it is
//! constructed; the same identity is reused for every request the session
//! makes. Idempotent GETs are retried on transient statuses and transport
//! errors with geometric backoff.

use rand::seq::SliceRandom;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Total attempts per request, including the first.
pub const MAX_ATTEMPTS: u32 = 5;

/// Per-request timeout default, seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Statuses worth retrying: rate limiting and transient server failures.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Browser identities rotated per session construction.
pub const USER_AGENTS: [&str; 6] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (Version/17.3 Safari/605.1.15)",
];

/// Typed failure for a single HTTP call. A failed call is a distinct signal
/// from a legitimately empty page; callers must not collapse the two.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid JSON body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("retries exhausted after {attempts} attempts for {url}: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: String,
    },
}

/// Minimal GET-a-JSON-document surface the scrapers are written against.
/// Tests substitute a scripted implementation; production uses [`HttpSession`].
pub trait Transport {
    fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value, HttpError>;
}

/// Whether a response status is worth another attempt.
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Delay before retry number `attempt` (1-based count of failures so far).
/// Base-2 geometric growth: 2s, 4s, 8s, 16s across the five attempts.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}

/// Blocking reqwest session with a fixed randomized identity.
pub struct HttpSession {
    client: reqwest::blocking::Client,
    user_agent: &'static str,
    sleep_on_retry: bool,
}

impl HttpSession {
    pub fn new(timeout: Duration) -> Self {
        let user_agent = *USER_AGENTS
            .choose(&mut rand::thread_rng())
            .unwrap_or(&USER_AGENTS[0]);
        // Builder failure means the TLS backend could not initialize; a
        // session stripped of its timeout and identity must not limp on.
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .expect("constructing the HTTP client");
        Self { client, user_agent, sleep_on_retry: true }
    }

    /// Identity chosen for this session's lifetime.
    pub fn user_agent(&self) -> &str {
        self.user_agent
    }

    /// Disable backoff sleeps (test hook; retry accounting is unchanged).
    pub fn without_retry_sleep(mut self) -> Self {
        self.sleep_on_retry = false;
        self
    }

    fn wait(&self, attempt: u32) {
        if self.sleep_on_retry {
            std::thread::sleep(backoff_delay(attempt));
        }
    }
}

impl Default for HttpSession {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl Transport for HttpSession {
    fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value, HttpError> {
        let mut last = String::new();
        for attempt in 1..=MAX_ATTEMPTS {
            let sent = self.client.get(url).query(params).send();
            match sent {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if resp.status().is_success() {
                        debug!(url, attempt, "GET ok");
                        return resp.json::<Value>().map_err(|source| HttpError::Decode {
                            url: url.to_string(),
                            source,
                        });
                    }
                    if !is_retryable_status(status) {
                        return Err(HttpError::Status { url: url.to_string(), status });
                    }
                    warn!(url, status, attempt, "retryable status");
                    last = format!("status {status}");
                }
                Err(source) => {
                    warn!(url, attempt, error = %source, "transport error");
                    if attempt == MAX_ATTEMPTS {
                        return Err(HttpError::RetriesExhausted {
                            url: url.to_string(),
                            attempts: MAX_ATTEMPTS,
                            last: source.to_string(),
                        });
                    }
                    last = source.to_string();
                    self.wait(attempt);
                    continue;
                }
            }
            if attempt < MAX_ATTEMPTS {
                self.wait(attempt);
            }
        }
        Err(HttpError::RetriesExhausted {
            url: url.to_string(),
            attempts: MAX_ATTEMPTS,
            last,
        })
    }
}
