//! Retry with exponential backoff for flaky remote calls.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// How often, and how patiently, an operation is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts including the first; values below 1 behave as 1
    pub max_attempts: u32,
    /// Wait before the second attempt; doubles after every further failure
    pub initial_delay: Duration,
    /// Upper bound on a single wait
    pub max_delay: Duration,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Translation requests: waits 1s, 2s, 4s, ... between attempts.
    pub fn translation(max_attempts: u32) -> Self {
        Self::new(max_attempts.max(1), Duration::from_secs(1))
    }

    /// Wait after failed attempt `failed` (1-based) before trying again.
    pub(crate) fn backoff(&self, failed: u32) -> Duration {
        let factor = 1u32.checked_shl(failed.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::translation(3)
    }
}

/// Run `operation` until it succeeds or the attempts run out.
///
/// The closure receives the 1-based attempt number. Every error is retried;
/// the error of the final attempt is returned.
pub async fn with_retry<T, E, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{}: succeeded on attempt {}/{}", operation_name, attempt, max_attempts);
                }
                return Ok(value);
            }
            Err(e) if attempt >= max_attempts => {
                warn!("{}: giving up after {} attempt(s): {}", operation_name, attempt, e);
                return Err(e);
            }
            Err(e) => {
                let wait = config.backoff(attempt);
                warn!(
                    "{}: attempt {}/{} failed ({}), retrying in {:?}",
                    operation_name, attempt, max_attempts, e, wait
                );
                sleep(wait).await;
                attempt += 1;
            }
        }
    }
}
