//! Backoff policy shared by the weather and food HTTP clients.
//!
//! Only transient failures are repeated: timeouts, refused connections,
//! 5xx responses, 429 and 408. Anything else, including the 401/404 the
//! clients map to their own errors, is handed back on the first attempt.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};

/// Upper bound for a single backoff pause
pub const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// How often and how patiently a request is repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Repeats after the first attempt
    pub max_retries: u32,
    /// Pause before the first repeat; doubled for each further one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(200))
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Single attempt
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Policy from the `max_retries` / `retry_base_delay_ms` pair of a client config section
    pub fn from_settings(max_retries: u32, base_delay_ms: u64) -> Self {
        Self::new(max_retries, Duration::from_millis(base_delay_ms))
    }

    /// Pause before repeat number `retry` (0-based), capped at [`MAX_BACKOFF`]
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

fn transient_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
}

fn transient_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

/// Send a request, repeating it per `policy` while the outcome is transient.
///
/// The last outcome is returned as-is once the retries run out, so callers
/// still see the final status or transport error.
pub async fn with_retry<F, Fut>(policy: &RetryPolicy, send: F) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut retry = 0;
    loop {
        let outcome = send().await;
        let transient = match &outcome {
            Ok(response) => transient_status(response.status()),
            Err(e) => transient_error(e),
        };
        if !transient || retry >= policy.max_retries {
            if retry > 0 {
                tracing::debug!(retries = retry, transient, "Request settled after retrying");
            }
            return outcome;
        }

        let pause = policy.backoff(retry);
        match &outcome {
            Ok(response) => tracing::warn!(status = %response.status(), ?pause, "Transient HTTP status, retrying"),
            Err(e) => tracing::warn!(error = %e, ?pause, "Transient transport error, retrying"),
        }
        tokio::time::sleep(pause).await;
        retry += 1;
    }
}
