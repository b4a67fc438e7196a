//! # Retry decision policy.
//!
//! [`RetryPolicy`] decides, for one [`Signal`], whether the call should be attempted
//! again. It does not look at attempt counts; the orchestrator enforces the hard cap.
//!
//! ## Evaluation order
//! ```text
//! should_retry(signal)
//!   ├─► predicate configured?
//!   │     ├─ no  ─► retry (any signal)
//!   │     └─ yes ─► predicate(signal) == true ─► retry
//!   ├─► retry_unsuccessful && signal is NonSuccess ─► retry
//!   └─► terminate
//! ```
//!
//! The second channel keeps unsuccessful-result retries working when a narrow
//! predicate (for example "network faults only") is configured.
//!
//! The predicate is typed on the fault. A [`Signal::NonSuccess`] carries no fault,
//! so it never matches the predicate and is decided by the fallback channel.

use std::fmt;
use std::sync::Arc;

/// Shared fault predicate: `true` means "retry this fault".
pub type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// What an attempt produced, from the point of view of the retry policy.
#[derive(Debug)]
pub enum Signal<'a, E> {
    /// The run body failed with a fault.
    Fault(&'a E),
    /// The run body returned a result whose `is_success()` was `false`.
    NonSuccess,
}

/// Ordered retry decision over faults and unsuccessful results.
pub struct RetryPolicy<E> {
    predicate: Option<RetryPredicate<E>>,
    retry_unsuccessful: bool,
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            retry_unsuccessful: self.retry_unsuccessful,
        }
    }
}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("predicate", &self.predicate.as_ref().map(|_| "<fn>"))
            .field("retry_unsuccessful", &self.retry_unsuccessful)
            .finish()
    }
}

impl<E> Default for RetryPolicy<E> {
    /// Retry on any fault, never on unsuccessful results.
    fn default() -> Self {
        Self {
            predicate: None,
            retry_unsuccessful: false,
        }
    }
}

impl<E> RetryPolicy<E> {
    /// Creates a policy.
    ///
    /// - `predicate`: `None` retries every fault.
    /// - `retry_unsuccessful`: enables the unsuccessful-result retry channel.
    pub fn new(predicate: Option<RetryPredicate<E>>, retry_unsuccessful: bool) -> Self {
        Self {
            predicate,
            retry_unsuccessful,
        }
    }

    /// Returns a policy with the given fault predicate.
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Returns a policy with the unsuccessful-result channel toggled.
    pub fn with_retry_unsuccessful(mut self, enabled: bool) -> Self {
        self.retry_unsuccessful = enabled;
        self
    }

    /// Whether unsuccessful results are retried.
    #[inline]
    pub fn retries_unsuccessful(&self) -> bool {
        self.retry_unsuccessful
    }

    /// Decides whether `signal` warrants another attempt.
    ///
    /// # Example
    /// ```
    /// use callvisor::{CallError, RetryPolicy, Signal};
    ///
    /// let policy = RetryPolicy::default()
    ///     .with_predicate(CallError::is_retryable)
    ///     .with_retry_unsuccessful(true);
    ///
    /// assert!(policy.should_retry(&Signal::Fault(&CallError::fail("flaky"))));
    /// assert!(!policy.should_retry(&Signal::Fault(&CallError::fatal("nope"))));
    /// assert!(policy.should_retry(&Signal::NonSuccess));
    /// ```
    pub fn should_retry(&self, signal: &Signal<'_, E>) -> bool {
        let Some(predicate) = &self.predicate else {
            return true;
        };

        let matched = match signal {
            Signal::Fault(fault) => predicate(fault),
            Signal::NonSuccess => false,
        };
        if matched {
            return true;
        }

        self.retry_unsuccessful && matches!(signal, Signal::NonSuccess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum Fault {
        Network,
        Parse,
    }

    fn network_only() -> RetryPolicy<Fault> {
        RetryPolicy::default().with_predicate(|f: &Fault| matches!(f, Fault::Network))
    }

    #[test]
    fn test_no_predicate_retries_everything() {
        let policy = RetryPolicy::<Fault>::default();
        assert!(policy.should_retry(&Signal::Fault(&Fault::Parse)));
        assert!(policy.should_retry(&Signal::NonSuccess));
    }

    #[test]
    fn test_predicate_is_authoritative_when_true() {
        let policy = network_only();
        assert!(policy.should_retry(&Signal::Fault(&Fault::Network)));
    }

    #[test]
    fn test_predicate_false_without_fallback_terminates() {
        let policy = network_only();
        assert!(!policy.should_retry(&Signal::Fault(&Fault::Parse)));
        assert!(!policy.should_retry(&Signal::NonSuccess));
    }

    #[test]
    fn test_fallback_channel_keeps_non_success_retries() {
        let policy = network_only().with_retry_unsuccessful(true);
        assert!(policy.should_retry(&Signal::NonSuccess));
        // The fallback only covers the non-success signal, never other faults.
        assert!(!policy.should_retry(&Signal::Fault(&Fault::Parse)));
    }

    #[test]
    fn test_clone_shares_predicate() {
        let policy = network_only().with_retry_unsuccessful(true);
        let copy = policy.clone();
        assert!(copy.retries_unsuccessful());
        assert!(copy.should_retry(&Signal::Fault(&Fault::Network)));
    }
}
