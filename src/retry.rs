use crate::error::ScrapeError;
use std::future::Future;
use std::time::Duration;

/// How often a scrape is attempted before the run is aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, at least 1
    pub attempts: u32,
    /// Fixed pause between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Policy allowing `retries` extra attempts after the first one
    pub fn with_retries(retries: u32, backoff: Duration) -> Self {
        Self {
            attempts: retries.saturating_add(1),
            backoff,
        }
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy runs out of attempts
///
/// `what` names the target in log lines (usually the endpoint URL).
pub async fn with_retries<F, Fut, T>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts && is_retryable(&e) => {
                tracing::warn!(
                    target_endpoint = what,
                    attempt,
                    attempts,
                    error = %e,
                    "Scrape failed, retrying"
                );
                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Determine if a scrape error is worth another attempt
///
/// ## Retryable (returns true):
/// - Connection failures (connection refused, DNS failures)
/// - Request timeouts
/// - HTTP 5xx responses
///
/// ## NOT retryable (returns false):
/// - HTTP 4xx responses
/// - Invalid endpoints
/// - Unparseable payloads
pub fn is_retryable(error: &ScrapeError) -> bool {
    match error {
        ScrapeError::Request { source, .. } => source.is_connect() || source.is_timeout(),
        ScrapeError::Status { status, .. } => status.is_server_error(),
        ScrapeError::InvalidEndpoint { .. } => false,
        ScrapeError::Parse { .. } => false,
    }
}
