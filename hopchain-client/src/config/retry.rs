//! Retry policy for the built-in [`RetryInterceptor`](crate::RetryInterceptor).
//!
//! The retry stage sits before the connect stage and re-enters the rest of
//! the chain once per attempt. A failed attempt is retried when:
//!
//! - it failed with a transport error,
//! - it timed out and the request method is idempotent,
//! - the server answered with one of [`RetryPolicy::retry_on_status`].
//!
//! Protocol violations, cancellation and invalid requests end the call
//! immediately.

use std::time::Duration;

use http::{Method, StatusCode};

use crate::ChainError;

/// Values used by [`RetryPolicy::default`].
pub mod defaults {
    use std::time::Duration;

    use http::StatusCode;

    pub const BASE_DELAY: Duration = Duration::from_secs(1);

    pub const MULTIPLIER: f64 = 1.6;

    /// Relative spread applied to each delay (0.2 is +/- 20%).
    pub const JITTER: f64 = 0.2;

    pub const MAX_DELAY: Duration = Duration::from_secs(120);

    /// Retries after the first attempt.
    pub const MAX_RETRIES: u32 = 3;

    pub const RETRY_STATUSES: [StatusCode; 3] = [
        StatusCode::BAD_GATEWAY,
        StatusCode::SERVICE_UNAVAILABLE,
        StatusCode::GATEWAY_TIMEOUT,
    ];
}

/// When and how often a call is retried.
///
/// Out-of-range values are not rejected by the setters; the client builder
/// checks them with [`RetryPolicy::validate`].
///
/// # Example
///
/// ```
/// use hopchain_client::RetryPolicy;
/// use http::StatusCode;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .max_retries(5)
///     .base_delay(Duration::from_millis(100))
///     .max_delay(Duration::from_secs(30))
///     .retry_on_status([StatusCode::TOO_MANY_REQUESTS, StatusCode::SERVICE_UNAVAILABLE]);
/// assert!(policy.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub base_delay: Duration,

    /// Growth factor between consecutive delays. Must be at least 1.0.
    pub multiplier: f64,

    /// Relative random spread of each delay, between 0.0 and 1.0.
    pub jitter: f64,

    /// Upper bound for any single delay.
    pub max_delay: Duration,

    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Response statuses that count as a failed attempt.
    pub retry_on_status: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: defaults::BASE_DELAY,
            multiplier: defaults::MULTIPLIER,
            jitter: defaults::JITTER,
            max_delay: defaults::MAX_DELAY,
            max_retries: defaults::MAX_RETRIES,
            retry_on_status: defaults::RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Replace the retried statuses. An empty list only retries failures.
    pub fn retry_on_status(mut self, statuses: impl IntoIterator<Item = StatusCode>) -> Self {
        self.retry_on_status = statuses.into_iter().collect();
        self
    }

    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retry_on_status.contains(&status)
    }

    /// Whether an attempt of a `method` request that failed with `error`
    /// may be repeated.
    ///
    /// A timeout can fire after the server received the request, so it is
    /// only retried for idempotent methods.
    pub fn should_retry_error(&self, error: &ChainError, method: &Method) -> bool {
        match error {
            ChainError::Timeout(_) => method.is_idempotent(),
            other => other.is_retryable(),
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.base_delay > self.max_delay {
            return Err("base_delay must not exceed max_delay");
        }
        if !(self.multiplier >= 1.0 && self.multiplier.is_finite()) {
            return Err("multiplier must be a finite value >= 1.0");
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err("jitter must be between 0.0 and 1.0");
        }
        Ok(())
    }

    /// Delay schedule for one call.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.clone())
    }
}

/// Delay schedule of one call: `base_delay * multiplier^n`, spread by
/// `jitter` and capped at `max_delay`.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    policy: RetryPolicy,
    attempts: u32,
}

impl ExponentialBackoff {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempts: 0 }
    }

    /// Retries handed out so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn can_retry(&self) -> bool {
        self.attempts < self.policy.max_retries
    }

    /// The delay before the next retry. Counts one attempt.
    pub fn next_delay(&mut self) -> Duration {
        let cap = self.policy.max_delay.as_secs_f64();
        let exponent = i32::try_from(self.attempts).unwrap_or(i32::MAX);
        let mut secs = (self.policy.base_delay.as_secs_f64() * self.policy.multiplier.powi(exponent)).min(cap);

        let jitter = self.policy.jitter;
        if jitter > 0.0 {
            secs *= 1.0 + rand::random_range(-jitter..=jitter);
        }

        self.attempts += 1;
        Duration::try_from_secs_f64(secs.clamp(0.0, cap)).unwrap_or(self.policy.max_delay)
    }
}
