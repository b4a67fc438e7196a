//! Error types used by callvisor callers and run bodies.
//!
//! This module defines:
//!
//! - [`ConfigError`]: a caller could not be constructed (fatal, never retried).
//! - [`CallError`]: a ready-made fault type for run bodies.
//! - [`DeliveryError`]: a terminal value could not be queued for delivery.
//! - [`UnknownStrategy`]: a backpressure strategy name did not parse.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! [`CallError::is_retryable`] doubles as a retry predicate.

use thiserror::Error;

/// # Errors produced while configuring a caller.
///
/// Raised immediately by [`CallerBuilder::build`](crate::CallerBuilder::build); never retried.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No run body was supplied.
    #[error("run body is required")]
    MissingRunBody,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use callvisor::ConfigError;
    ///
    /// assert_eq!(ConfigError::MissingRunBody.as_label(), "config_missing_run_body");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::MissingRunBody => "config_missing_run_body",
        }
    }
}

/// # Faults raised by a run body.
///
/// A convenience fault type. Run bodies may use any error type; this one carries
/// a retryable/fatal distinction that pairs with [`CallError::is_retryable`].
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// Execution failed but may succeed if retried.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Non-recoverable fatal error (should not be retried).
    #[error("fatal error (no retry): {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// The run body observed cancellation and gave up.
    #[error("call cancelled")]
    Canceled,
}

impl CallError {
    /// Shorthand for [`CallError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        CallError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for [`CallError::Fatal`].
    pub fn fatal(error: impl Into<String>) -> Self {
        CallError::Fatal {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use callvisor::CallError;
    ///
    /// assert_eq!(CallError::fail("boom").as_label(), "call_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CallError::Fail { .. } => "call_failed",
            CallError::Fatal { .. } => "call_fatal",
            CallError::Canceled => "call_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CallError::Fail { error } => format!("error: {error}"),
            CallError::Fatal { error } => format!("fatal: {error}"),
            CallError::Canceled => "call cancelled".to_string(),
        }
    }

    /// Indicates whether the error is worth another attempt.
    ///
    /// Returns `true` only for [`CallError::Fail`].
    ///
    /// # Example
    /// ```
    /// use callvisor::CallError;
    ///
    /// assert!(CallError::fail("flaky").is_retryable());
    /// assert!(!CallError::fatal("nope").is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, CallError::Fail { .. })
    }
}

/// # Errors produced while queueing a terminal value for delivery.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// Queue is full and the strategy is [`BackpressureStrategy::Error`](crate::BackpressureStrategy::Error).
    #[error("delivery queue overflow (capacity {capacity})")]
    Overflow {
        /// Capacity of the queue that overflowed.
        capacity: usize,
    },

    /// Queue was closed before the value could be queued.
    #[error("delivery queue closed")]
    Closed,
}

impl DeliveryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DeliveryError::Overflow { .. } => "delivery_overflow",
            DeliveryError::Closed => "delivery_closed",
        }
    }
}

/// Unrecognised backpressure strategy name.
///
/// Returned by `str::parse::<BackpressureStrategy>()`; resolution from the
/// environment falls back to the default instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown backpressure strategy {0:?}")]
pub struct UnknownStrategy(pub String);

impl UnknownStrategy {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        "unknown_backpressure_strategy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_error_messages() {
        assert_eq!(CallError::fail("boom").to_string(), "execution failed: boom");
        assert_eq!(CallError::fatal("bad").as_message(), "fatal: bad");
        assert_eq!(CallError::Canceled.as_label(), "call_canceled");
    }

    #[test]
    fn test_only_fail_is_retryable() {
        assert!(CallError::fail("x").is_retryable());
        assert!(!CallError::fatal("x").is_retryable());
        assert!(!CallError::Canceled.is_retryable());
    }

    #[test]
    fn test_delivery_error_display() {
        let err = DeliveryError::Overflow { capacity: 4 };
        assert_eq!(err.to_string(), "delivery queue overflow (capacity 4)");
        assert_eq!(err.as_label(), "delivery_overflow");
    }

    #[test]
    fn test_unknown_strategy_display() {
        let err = UnknownStrategy("sideways".into());
        assert_eq!(err.to_string(), "unknown backpressure strategy \"sideways\"");
        assert_eq!(err.as_label(), "unknown_backpressure_strategy");
    }
}
