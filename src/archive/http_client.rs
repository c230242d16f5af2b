//! GET-with-retry against the archive API.

use crate::archive::error::ArchiveError;
use crate::archive::transport::{RawResponse, Transport};
use log::warn;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

const TRANSIENT_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Upper bound on a single backoff wait.
pub const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Number of body characters kept in error messages.
const BODY_EXCERPT_CHARS: usize = 200;

/// How many times to try a request and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. `0` behaves like `1`.
    pub max_retries: u32,
    /// The wait before attempt `n + 1` is `backoff_base.powi(n)` seconds.
    pub backoff_base: f64,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: 1.6,
            timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Wait after failed attempt `attempt`, capped at [`MAX_BACKOFF`].
    ///
    /// A result that is not a finite, non-negative number of seconds also yields the cap.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.backoff_base.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .map(|wait| wait.min(MAX_BACKOFF))
            .unwrap_or(MAX_BACKOFF)
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Issues archive requests through a [`Transport`], retrying transient failures.
#[derive(Debug, Clone)]
pub struct RetryingClient<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingClient<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Performs a GET and decodes the body as JSON.
    ///
    /// Statuses 429, 500, 502, 503 and 504 and transport-level failures are retried
    /// with exponential backoff; once [`RetryPolicy::max_retries`] attempts have failed the
    /// last cause is returned wrapped in [`ArchiveError::RetryExhausted`]. Any other error
    /// status is returned immediately as [`ArchiveError::HttpStatus`].
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<Value, ArchiveError> {
        let max_attempts = self.policy.attempts();
        let mut attempt = 1;

        loop {
            let error = match self.attempt(url, query).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => e,
                Err(e) => return Err(e),
            };

            if attempt >= max_attempts {
                warn!(
                    "Archive request failed (attempt {}/{}). Giving up. Error: {}",
                    attempt, max_attempts, error
                );
                return Err(ArchiveError::RetryExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    last_error: Box::new(error),
                });
            }

            let wait = self.policy.backoff(attempt);
            warn!(
                "Archive request failed (attempt {}/{}). Waiting {:.1}s. Error: {}",
                attempt,
                max_attempts,
                wait.as_secs_f64(),
                error
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }

    async fn attempt(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<Value, ArchiveError> {
        let RawResponse { status, body } = self
            .transport
            .get(url, query, self.policy.timeout)
            .await
            .map_err(|source| ArchiveError::NetworkRequest {
                url: url.to_string(),
                source,
            })?;

        if TRANSIENT_STATUSES.contains(&status) {
            return Err(ArchiveError::TransientStatus {
                url: url.to_string(),
                status,
                body_excerpt: excerpt(&body),
            });
        }
        if !status.is_success() {
            return Err(ArchiveError::HttpStatus {
                url: url.to_string(),
                status,
                body_excerpt: excerpt(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| ArchiveError::JsonDecode {
            url: url.to_string(),
            source,
        })
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
