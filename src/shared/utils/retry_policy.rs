//! Retry policy shared by the fetch client and the persistence layer
//!
//! Holds the attempt cap, the backoff curve and the jitter, and knows how to
//! drive an async operation through it.

use crate::shared::errors::{AppError, AppResult};
use reqwest::header::HeaderMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt; grows with `backoff_multiplier`
    pub base_delay: Duration,
    /// Upper bound for any computed delay
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Short fixed pause used after non-rate-limit failures
    pub error_delay: Duration,
    /// Fraction of the delay added as random jitter (0.0 disables)
    pub jitter: f64,
}

impl RetryPolicy {
    /// Policy for scraping fetches: 3 attempts, `2^attempt` seconds after a 429
    pub fn scraping() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            error_delay: Duration::from_secs(1),
            jitter: 0.0,
        }
    }

    /// Policy for storage writes: one quick retry
    pub fn persistence() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            error_delay: Duration::from_millis(100),
            jitter: 0.1,
        }
    }

    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            error_delay: Duration::ZERO,
            jitter: 0.0,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_error_delay(mut self, error_delay: Duration) -> Self {
        self.error_delay = error_delay;
        self
    }

    /// Backoff for the given zero-based attempt
    pub fn calculate_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let multiplier = self.backoff_multiplier.powi(attempt as i32);
        let backoff =
            Duration::from_millis((self.base_delay.as_millis() as f64 * multiplier) as u64);

        // A server-provided Retry-After can only lengthen the wait
        let delay = match retry_after {
            Some(server_delay) if server_delay > backoff => server_delay,
            _ => backoff,
        };

        self.apply_jitter(delay.min(self.max_delay))
    }

    pub fn has_attempts_left(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }

    fn apply_jitter(&self, delay: Duration) -> Duration {
        if self.jitter <= 0.0 || delay.is_zero() {
            return delay;
        }
        let jitter_ms = (delay.as_millis() as f64 * self.jitter * rand::random::<f64>()) as u64;
        delay + Duration::from_millis(jitter_ms)
    }

    /// Execute `operation` until it succeeds, fails permanently, or attempts run out
    pub async fn run<F, Fut, T>(&self, operation_name: &str, operation: F) -> AppResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::debug!("{} succeeded on attempt {}", operation_name, attempt + 1);
                    }
                    return Ok(value);
                }
                Err(error) if is_retryable_error(&error) && self.has_attempts_left(attempt) => {
                    let delay = self.calculate_delay(attempt, None);
                    tracing::warn!(
                        "{} failed on attempt {}/{} ({}), retrying in {:?}",
                        operation_name,
                        attempt + 1,
                        self.max_attempts,
                        error,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::scraping()
    }
}

/// Whether an error is worth another attempt
pub fn is_retryable_error(error: &AppError) -> bool {
    match error {
        AppError::ExternalServiceError(_)
        | AppError::RateLimitError(_)
        | AppError::DatabaseError(_)
        | AppError::InternalError(_) => true,

        AppError::ApiError(msg) => {
            let msg = msg.to_lowercase();
            !msg.contains("not found")
                && !msg.contains("unauthorized")
                && !msg.contains("forbidden")
                && !msg.contains("bad request")
        }

        AppError::ValidationError(_)
        | AppError::NotFound(_)
        | AppError::SerializationError(_)
        | AppError::ConfigurationError(_)
        | AppError::FetchFailed { .. }
        | AppError::Cancelled(_) => false,
    }
}

/// Seconds from a `Retry-After` header, when it carries a plain number
pub fn retry_after_from_headers(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
