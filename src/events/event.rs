//! # Events emitted while a call runs.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Attempt events**: one run body invocation and its verdict
//! - **Terminal events**: which callback the call resolved to
//! - **Lifecycle events**: delivery and handle disposal
//!
//! The [`Event`] struct carries metadata such as the call name, attempt number,
//! retry delay and remaining retry budget.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use callvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_call("fetch-invoice")
//!     .with_attempt(2)
//!     .with_delay(Duration::from_millis(200));
//!
//! assert_eq!(ev.kind, EventKind::RetryScheduled);
//! assert_eq!(ev.call.as_deref(), Some("fetch-invoice"));
//! assert_eq!(ev.attempt, Some(2));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of call events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Attempt events ===
    /// Run body is about to be invoked.
    ///
    /// Sets: `call`, `attempt` (1-based).
    AttemptStarting,

    /// Run body faulted on this attempt.
    ///
    /// Sets: `call`, `attempt`, `error`.
    AttemptFailed,

    /// Run body returned a result reporting `is_success() == false`.
    ///
    /// Sets: `call`, `attempt`, `remaining` (budget after this attempt).
    ResultUnsuccessful,

    /// Another attempt will follow.
    ///
    /// Sets: `call`, `attempt` (the attempt that just ended), `delay`.
    RetryScheduled,

    // === Terminal events ===
    /// Call resolved to the success callback (successful or unsuccessful result).
    ///
    /// Sets: `call`, `attempt`.
    CallSucceeded,

    /// Call resolved to the failure callback.
    ///
    /// Sets: `call`, `attempt`, `error`.
    CallFailed,

    // === Lifecycle events ===
    /// A terminal value was discarded because the handle was disposed.
    ///
    /// Sets: `call`, `attempt` (if any attempt ran).
    DeliverySuppressed,

    /// The delivery queue rejected a terminal value.
    ///
    /// Sets: `call`, `error`.
    DeliveryOverflow,

    /// Execution handle transitioned to disposed.
    ///
    /// Sets: `call`.
    HandleDisposed,
}

impl EventKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::AttemptStarting => "attempt_starting",
            EventKind::AttemptFailed => "attempt_failed",
            EventKind::ResultUnsuccessful => "result_unsuccessful",
            EventKind::RetryScheduled => "retry_scheduled",
            EventKind::CallSucceeded => "call_succeeded",
            EventKind::CallFailed => "call_failed",
            EventKind::DeliverySuppressed => "delivery_suppressed",
            EventKind::DeliveryOverflow => "delivery_overflow",
            EventKind::HandleDisposed => "handle_disposed",
        }
    }

    /// True for events that end a call.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EventKind::CallSucceeded | EventKind::CallFailed | EventKind::DeliverySuppressed
        )
    }
}

/// Call event with optional metadata.
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the call, if known.
    pub call: Option<Arc<str>>,
    /// Attempt number (1-based).
    pub attempt: Option<u64>,
    /// Delay before the next attempt.
    pub delay: Option<Duration>,
    /// Retry budget left after this attempt.
    pub remaining: Option<u32>,
    /// Error or reason text.
    pub error: Option<String>,
}

impl Event {
    /// Creates an event of the given kind, stamped with the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            call: None,
            attempt: None,
            delay: None,
            remaining: None,
            error: None,
        }
    }

    /// Sets the call name.
    #[must_use]
    pub fn with_call(mut self, call: impl Into<Arc<str>>) -> Self {
        self.call = Some(call.into());
        self
    }

    /// Sets the attempt number.
    #[must_use]
    pub fn with_attempt(mut self, attempt: u64) -> Self {
        self.attempt = Some(attempt);
        self
    }

    /// Sets the retry delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the remaining retry budget.
    #[must_use]
    pub fn with_remaining(mut self, remaining: u32) -> Self {
        self.remaining = Some(remaining);
        self
    }

    /// Sets the error text.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::AttemptStarting);
        let b = Event::new(EventKind::AttemptStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(EventKind::CallSucceeded.is_terminal());
        assert!(EventKind::CallFailed.is_terminal());
        assert!(!EventKind::RetryScheduled.is_terminal());
        assert_eq!(EventKind::ResultUnsuccessful.as_label(), "result_unsuccessful");
    }
}
