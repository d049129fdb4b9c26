//! Bounded retry for transient request failures.
//!
//! Only failures that happen before the server answers (connect errors,
//! timeouts) are retried. An HTTP status, redirects included, is an answer
//! and is never retried.
//!
//! # Example
//!
//! ```
//! use coursesync_core::transport::{FailureType, RetryDecision, RetryPolicy, TransportError, classify_error};
//!
//! let policy = RetryPolicy::default();
//! let error = TransportError::timeout("https://lms.example/my/");
//!
//! match policy.should_retry(classify_error(&error), 1) {
//!     RetryDecision::Retry { delay, attempt } => println!("retry #{attempt} in {delay:?}"),
//!     RetryDecision::DoNotRetry { reason } => println!("giving up: {reason}"),
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument};

use super::TransportError;
use super::constants::MAX_ATTEMPTS;

/// Default base delay before the first retry.
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// Default maximum delay cap.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Upper bound for random jitter added to a delay.
const MAX_JITTER: Duration = Duration::from_millis(100);

/// Whether a failed request is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// The request never got an answer; repeating it may succeed.
    Transient,
    /// The server answered, or the failure is local; repeating will not help.
    Permanent,
}

/// Decision on whether to retry a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Retry configuration with exponential backoff.
///
/// Defaults: 3 attempts in total, 200ms base delay doubling per attempt,
/// capped at 2s, plus up to 100ms jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with custom settings.
    ///
    /// `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Policy that retries without waiting between attempts.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO, 1.0)
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Determines whether to retry after `attempt` (1-indexed) failed.
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        if failure_type == FailureType::Permanent {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// `min(base_delay * multiplier^(attempt-1), max_delay) + jitter`
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn calculate_delay(&self, attempt: u32) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let base_ms = self.base_delay.as_millis() as f64;
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = base_ms * f64::from(self.backoff_multiplier).powf(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_ms as u64) + self.calculate_jitter()
    }

    fn calculate_jitter(&self) -> Duration {
        let bound = MAX_JITTER.min(self.base_delay / 2).as_millis();
        let bound = u64::try_from(bound).unwrap_or(u64::MAX);
        let jitter_ms = rand::thread_rng().gen_range(0..=bound);
        Duration::from_millis(jitter_ms)
    }
}

/// Classifies a transport error for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | Timeout | Transient |
/// | Network (connect/request) | Transient |
/// | Network (TLS/certificate) | Permanent |
/// | Redirect / HttpStatus | Permanent |
/// | Incomplete (body already streaming) | Permanent |
/// | Io / InvalidUrl / Setup | Permanent |
#[must_use]
pub fn classify_error(error: &TransportError) -> FailureType {
    match error {
        TransportError::Timeout { .. } => FailureType::Transient,
        TransportError::Network { source, .. } => {
            if is_tls_error(source) || source.is_builder() || source.is_status() {
                FailureType::Permanent
            } else {
                FailureType::Transient
            }
        }
        TransportError::Redirect { .. }
        | TransportError::HttpStatus { .. }
        | TransportError::Io { .. }
        | TransportError::InvalidUrl { .. }
        | TransportError::Incomplete { .. }
        | TransportError::Setup { .. } => FailureType::Permanent,
    }
}

/// Whether a TLS or certificate failure caused `error`.
///
/// Only the wrapped sources are inspected. The outer reqwest message embeds
/// the request URL, which may contain any of the keywords.
fn is_tls_error(error: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        if cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::InvalidData)
        {
            return true;
        }
        let message = cause.to_string().to_lowercase();
        if ["certificate", "tls", "ssl", "handshake"]
            .iter()
            .any(|keyword| message.contains(keyword))
        {
            return true;
        }
        source = cause.source();
    }
    false
}
