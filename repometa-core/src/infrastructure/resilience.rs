//! Retry with exponential backoff and jitter for upstream calls

use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retry configuration for exponential backoff
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Add up to 25% random jitter to each delay
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based), before jitter.
    fn base_delay(&self, retry: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(retry.saturating_sub(1) as i32);
        let millis = (self.initial_delay.as_millis() as f64 * factor).min(u64::MAX as f64) as u64;
        std::cmp::min(Duration::from_millis(millis), self.max_delay)
    }

    fn delay_for(&self, retry: u32) -> Duration {
        let base = self.base_delay(retry);
        if !self.jitter {
            return base;
        }
        let jitter_ceiling = (base.as_millis() as u64) / 4;
        let jitter = if jitter_ceiling == 0 {
            0
        } else {
            rand::rng().random_range(0..=jitter_ceiling)
        };
        std::cmp::min(base + Duration::from_millis(jitter), self.max_delay)
    }

    /// Upper bound of the time spent sleeping across all retries.
    pub fn max_total_backoff(&self) -> Duration {
        (1..self.max_attempts.max(1))
            .map(|retry| {
                let base = self.base_delay(retry);
                if self.jitter {
                    std::cmp::min(base + base / 4, self.max_delay)
                } else {
                    base
                }
            })
            .sum()
    }
}

/// Execute an operation with exponential backoff retry logic.
///
/// The operation is attempted at most `config.max_attempts` times. Errors for
/// which `is_retryable` returns false are returned immediately.
pub async fn retry_with_backoff<F, Fut, T, E, R>(
    config: &RetryConfig,
    is_retryable: R,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    R: Fn(&E) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(result) => return Ok(result),
            Err(error) => {
                if attempt >= max_attempts || !is_retryable(&error) {
                    return Err(error);
                }

                let delay = config.delay_for(attempt);
                tracing::debug!(
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Retrying operation with exponential backoff"
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}
