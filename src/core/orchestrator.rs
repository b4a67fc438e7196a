//! # Orchestrator: per-attempt verdicts for one call.
//!
//! The orchestrator owns the mutable state of a run (attempt counter and
//! [`RetryBudget`]) and turns each attempt's output into a [`Step`]. It performs no
//! I/O and never sleeps; the blocking and async drivers in
//! [`Caller`](crate::Caller) do that.
//!
//! ## Verdicts
//! ```text
//! settle(output)
//!   ├─ Ok(r), r.is_success()        ─► Done(Success(r))
//!   ├─ Ok(r), !r.is_success()
//!   │     ├─ channel off / budget 0 ─► Done(Success(r))
//!   │     └─ budget -= 1, signal NonSuccess
//!   │           ├─ policy retry && attempts left ─► Retry
//!   │           └─ otherwise                     ─► Done(Success(r))
//!   └─ Err(f)
//!         ├─ policy retry && attempts left ─► Retry
//!         └─ otherwise                     ─► Done(Failure(f))
//! ```
//!
//! ## Rules
//! - At most `limit + 1` attempts (hard cap, independent of the budget).
//! - The non-success signal never becomes a `Failure`; an unsuccessful result that
//!   cannot be retried is always delivered as `Success`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    calls::Outcome,
    events::{Bus, Event, EventKind},
    policies::{BackoffPolicy, RetryBudget, RetryLimit, RetryPolicy, Signal},
};

/// Final value of a call, routed to exactly one callback.
pub(crate) enum Terminal<R, E> {
    /// For the success callback (successful or unsuccessful result).
    Success(R),
    /// For the failure callback.
    Failure(E),
}

/// What the driver does after an attempt.
pub(crate) enum Step<R, E> {
    /// Invoke the run body again after `delay`.
    Retry { delay: Duration },
    /// Stop and deliver.
    Done(Terminal<R, E>),
}

pub(crate) struct Orchestrator<E> {
    call: Arc<str>,
    limit: RetryLimit,
    policy: RetryPolicy<E>,
    budget: RetryBudget,
    backoff: BackoffPolicy,
    attempt: u64,
    bus: Option<Bus>,
}

impl<E: fmt::Display> Orchestrator<E> {
    pub(crate) fn new(
        call: Arc<str>,
        limit: RetryLimit,
        policy: RetryPolicy<E>,
        backoff: BackoffPolicy,
        bus: Option<Bus>,
    ) -> Self {
        Self {
            call,
            limit,
            policy,
            budget: RetryBudget::new(limit.get()),
            backoff,
            attempt: 0,
            bus,
        }
    }

    /// Retry budget left for unsuccessful results.
    pub(crate) fn budget(&self) -> RetryBudget {
        self.budget
    }

    /// Counts a new attempt and announces it.
    pub(crate) fn begin_attempt(&mut self) -> u64 {
        self.attempt += 1;
        self.emit(EventKind::AttemptStarting, |ev| ev);
        self.attempt
    }

    /// Judges the output of the current attempt.
    pub(crate) fn settle<R: Outcome>(&mut self, output: Result<R, E>) -> Step<R, E> {
        match output {
            Ok(result) if result.is_success() => Step::Done(Terminal::Success(result)),
            Ok(result) => {
                let signalled = self.policy.retries_unsuccessful() && self.budget.try_consume();
                let remaining = self.budget.remaining();
                self.emit(EventKind::ResultUnsuccessful, |ev| ev.with_remaining(remaining));

                if signalled && self.may_retry(&Signal::NonSuccess) {
                    self.schedule_retry()
                } else {
                    Step::Done(Terminal::Success(result))
                }
            }
            Err(fault) => {
                let text = fault.to_string();
                self.emit(EventKind::AttemptFailed, |ev| ev.with_error(text));

                if self.may_retry(&Signal::Fault(&fault)) {
                    self.schedule_retry()
                } else {
                    Step::Done(Terminal::Failure(fault))
                }
            }
        }
    }

    /// Publishes an event for this call, decorated by `with`.
    pub(crate) fn emit(&self, kind: EventKind, with: impl FnOnce(Event) -> Event) {
        if let Some(bus) = &self.bus {
            let mut ev = Event::new(kind).with_call(self.call.clone());
            if self.attempt > 0 {
                ev = ev.with_attempt(self.attempt);
            }
            bus.publish(with(ev));
        }
    }

    fn may_retry(&self, signal: &Signal<'_, E>) -> bool {
        self.policy.should_retry(signal) && self.attempt < self.limit.max_attempts()
    }

    fn schedule_retry<R>(&self) -> Step<R, E> {
        let retry = u32::try_from(self.attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let delay = self.backoff.next(retry);
        self.emit(EventKind::RetryScheduled, |ev| ev.with_delay(delay));
        Step::Retry { delay }
    }
}
