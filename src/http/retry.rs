//! Retry policies for backend requests.

use std::time::Duration;

/// Retry policy for one backend request.
#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// Single attempt. Default, and the only safe choice for the
    /// deposit-notification POST, which must not be replayed.
    #[default]
    None,
    /// Retry on transport failures + 502/503/504, with backoff on 429.
    /// Used for address lookups and other read-only GETs.
    Idempotent,
    /// Caller-provided retry logic.
    Custom(RetryConfig),
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not counting the initial request).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Ceiling on the delay between retries.
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_factor: f64,
    /// Whether to spread delays with random jitter.
    pub jitter: bool,
    /// HTTP status codes that trigger a retry.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter: true,
            retryable_statuses: vec![502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// The config [`RetryPolicy::Idempotent`] expands to: the defaults plus
    /// retry-on-429.
    pub fn idempotent() -> Self {
        Self {
            retryable_statuses: vec![429, 502, 503, 504],
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base =
            self.initial_delay.as_millis() as f64 * self.backoff_factor.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);

        let final_ms = if self.jitter {
            // ±25% around the capped delay.
            let spread = capped * 0.25;
            let offset = (rand::random::<f64>() - 0.5) * 2.0 * spread;
            (capped + offset).max(0.0)
        } else {
            capped
        };

        Duration::from_millis(final_ms as u64)
    }
}
