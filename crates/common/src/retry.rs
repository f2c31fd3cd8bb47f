//! Retry policy and backoff computation for event delivery.
//!
//! A [`RetryPolicy`] bounds the number of full delivery attempts and shapes
//! the delay between them: geometric growth from `min_delay` by
//! `backoff_factor`, capped at `max_delay`, optionally randomized. The policy
//! is immutable per dispatch; callers snapshot it once and reuse it for the
//! whole call.

use std::time::Duration;

use rand::Rng;
use thiserror::Error;

/// Errors produced when a retry policy fails validation.
#[derive(Debug, Error)]
pub enum RetryPolicyError {
    /// The policy configuration is invalid
    #[error("invalid retry policy: {message}")]
    InvalidConfiguration {
        /// Description of the offending field
        message: String,
    },
}

/// Bounds and backoff shape for repeated delivery attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts (initial try included), at least 1
    pub max_attempts: u32,
    /// Exponential growth factor between consecutive delays, greater than 1
    pub backoff_factor: f64,
    /// Delay before the first retry
    pub min_delay: Duration,
    /// Upper bound on any computed delay
    pub max_delay: Duration,
    /// Randomize each delay uniformly within `[0, base]`
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            backoff_factor: 5.0,
            min_delay: Duration::from_secs(60),
            max_delay: Duration::from_secs(20 * 60),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Create a builder seeded with the default policy.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::new()
    }

    /// Validate the policy invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RetryPolicyError::InvalidConfiguration`] if `max_attempts`
    /// is zero, `backoff_factor` is not greater than 1, or `max_delay` is
    /// below `min_delay`.
    pub fn validate(&self) -> Result<(), RetryPolicyError> {
        if self.max_attempts == 0 {
            return Err(RetryPolicyError::InvalidConfiguration {
                message: "max_attempts must be at least 1".to_string(),
            });
        }
        if self.backoff_factor <= 1.0 {
            return Err(RetryPolicyError::InvalidConfiguration {
                message: "backoff_factor must be greater than 1".to_string(),
            });
        }
        if self.max_delay < self.min_delay {
            return Err(RetryPolicyError::InvalidConfiguration {
                message: "max_delay must not be below min_delay".to_string(),
            });
        }
        Ok(())
    }

    /// Deterministic delay before attempt `attempt + 1`, without jitter.
    ///
    /// `attempt` is the 1-based index of the attempt that just failed:
    /// `min_delay * backoff_factor^(attempt - 1)`, capped at `max_delay`.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let millis = self.min_delay.as_millis() as f64 * self.backoff_factor.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Delay to sleep before the next attempt, jittered when enabled.
    ///
    /// The result is never negative and never exceeds the capped base delay.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        if !self.jitter || base.is_zero() {
            return base;
        }
        let millis = rand::thread_rng().gen_range(0..=base.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

/// Builder for [`RetryPolicy`] with validation on `build`.
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl RetryPolicyBuilder {
    /// Start from the default policy.
    pub fn new() -> Self {
        Self { policy: RetryPolicy::default() }
    }

    /// Set the total attempt budget (initial try included).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.policy.max_attempts = attempts;
        self
    }

    /// Set the exponential growth factor.
    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.policy.backoff_factor = factor;
        self
    }

    /// Set the delay before the first retry.
    pub fn min_delay(mut self, delay: Duration) -> Self {
        self.policy.min_delay = delay;
        self
    }

    /// Set the upper bound on any computed delay.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.policy.max_delay = delay;
        self
    }

    /// Enable or disable delay randomization.
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.policy.jitter = jitter;
        self
    }

    /// Validate and return the policy.
    ///
    /// # Errors
    ///
    /// Returns [`RetryPolicyError::InvalidConfiguration`] when the resulting
    /// policy is invalid.
    pub fn build(self) -> Result<RetryPolicy, RetryPolicyError> {
        self.policy.validate()?;
        Ok(self.policy)
    }
}
