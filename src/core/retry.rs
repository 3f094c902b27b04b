//! Bounded retry with configurable backoff.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::error::CompletionError;

/// How many times to attempt an operation and how long to sleep in between.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
    /// Cap on the backoff duration.
    pub max_delay: Duration,
    pub jitter: bool,
}

impl RetryPolicy {
    /// Fixed delay between attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay: delay,
            backoff_factor: 1.0,
            max_delay: delay,
            jitter: false,
        }
    }

    /// Exponential backoff with +/- 10% jitter, capped at `max_delay`.
    pub fn exponential(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            backoff_factor: 2.0,
            max_delay,
            jitter: true,
        }
    }

    /// Delay to sleep after the given zero-based attempt.
    fn delay_for(&self, attempt: u32) -> Duration {
        let base =
            self.initial_delay.as_millis() as f64 * self.backoff_factor.powi(attempt as i32);
        let jitter_factor = if self.jitter {
            rand::random::<f64>() * 0.2 + 0.9
        } else {
            1.0
        };
        Duration::from_millis((base * jitter_factor) as u64).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    /// Three attempts, one second apart.
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(1))
    }
}

/// Run `op` until it succeeds or the policy is exhausted.
///
/// Every failure is logged and followed by the policy delay; the last error
/// is returned once attempts run out. `op` receives the zero-based attempt
/// number.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, CompletionError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, CompletionError>>,
{
    let mut last_error = None;

    for attempt in 0..policy.max_attempts {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!(attempt = attempt + 1, error = %err, "attempt failed");
                last_error = Some(err);
            }
        }

        if attempt + 1 < policy.max_attempts {
            tokio::time::sleep(policy.delay_for(attempt)).await;
        }
    }

    Err(last_error.unwrap_or_else(|| {
        CompletionError::Configuration("Retry policy allows no attempts".to_string())
    }))
}
