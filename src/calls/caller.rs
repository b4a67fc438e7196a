//! # Caller: retrying execution with callback delivery.
//!
//! A [`Caller`] invokes its run body until the orchestrator reaches a verdict,
//! then delivers exactly one terminal value:
//!
//! ```text
//! run()
//!   ├─► handle: Idle → Running (otherwise no-op)
//!   loop {
//!   ├─► handle disposed? ─► suppress, return
//!   ├─► attempt += 1, invoke run body
//!   ├─► orchestrator.settle(output)
//!   │     ├─ Retry { delay } ─► pause(delay), continue
//!   │     └─ Done(terminal)  ─► break
//!   }
//!   ├─► mailbox.push(terminal)   (backpressure applies)
//!   └─► drain: Success(r) → on_success(r) | Failure(e) → on_failure(e)
//! ```
//!
//! ## Rules
//! - No fault escapes `run()`; outcomes are observed only through callbacks.
//! - Attempts are strictly sequential; the next starts after the previous verdict.
//! - Dropping a caller disposes its handle (release on every exit path, including
//!   a panicking callback).
//! - Disposal suppresses delivery but never interrupts a running body.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use crate::{
    calls::{CallerBuilder, Outcome},
    core::{
        BackpressureStrategy, ExecutionHandle, Mailbox,
        orchestrator::{Orchestrator, Step, Terminal},
    },
    error::CallError,
    events::{Bus, EventKind},
    policies::{BackoffPolicy, RetryLimit, RetryPolicy},
};

/// Work executed on every attempt.
pub type RunBody<R, E> = Box<dyn FnMut() -> Result<R, E> + Send>;

/// Consumer of the terminal result.
pub type OnSuccess<R> = Box<dyn FnOnce(R) + Send>;

/// Consumer of the terminal fault.
pub type OnFailure<E> = Box<dyn FnOnce(E) + Send>;

/// Retrying call with success/failure callbacks.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::{Arc, Mutex};
/// use callvisor::{CallError, Caller};
///
/// let tries = Arc::new(AtomicUsize::new(0));
/// let failed = Arc::new(Mutex::new(None));
///
/// let counter = Arc::clone(&tries);
/// let sink = Arc::clone(&failed);
/// let mut caller = Caller::<bool, CallError>::builder()
///     .run_body(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///         Err(CallError::fail("unreachable host"))
///     })
///     .max_retries(2)
///     .on_failure(move |e| *sink.lock().unwrap() = Some(e))
///     .build()
///     .unwrap();
///
/// caller.run();
/// assert_eq!(tries.load(Ordering::SeqCst), 3);
/// assert_eq!(*failed.lock().unwrap(), Some(CallError::fail("unreachable host")));
/// ```
pub struct Caller<R, E = CallError> {
    pub(super) call: Arc<str>,
    pub(super) body: Arc<Mutex<RunBody<R, E>>>,
    pub(super) limit: RetryLimit,
    pub(super) policy: RetryPolicy<E>,
    pub(super) backoff: BackoffPolicy,
    pub(super) on_success: Option<OnSuccess<R>>,
    pub(super) on_failure: Option<OnFailure<E>>,
    pub(super) handle: ExecutionHandle,
    pub(super) mailbox: Mailbox<Terminal<R, E>>,
    pub(super) bus: Option<Bus>,
}

impl<R, E> fmt::Debug for Caller<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caller")
            .field("call", &self.call)
            .field("limit", &self.limit)
            .field("policy", &self.policy)
            .field("backoff", &self.backoff)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl<R, E> Caller<R, E>
where
    R: Outcome + 'static,
    E: fmt::Display + 'static,
{
    /// Starts a [`CallerBuilder`].
    pub fn builder() -> CallerBuilder<R, E> {
        CallerBuilder::new()
    }

    /// Call name used in events.
    pub fn name(&self) -> &str {
        &self.call
    }

    /// Configured retry maximum.
    pub fn max_retries(&self) -> RetryLimit {
        self.limit
    }

    /// Backpressure strategy of the delivery queue.
    pub fn backpressure(&self) -> BackpressureStrategy {
        self.mailbox.strategy()
    }

    /// Event bus, if events are enabled.
    pub fn bus(&self) -> Option<&Bus> {
        self.bus.as_ref()
    }

    /// Shared handle for this caller's run; any clone may dispose it.
    pub fn handle(&self) -> ExecutionHandle {
        self.handle.clone()
    }

    /// Releases the handle. Idempotent; returns `true` on the first release.
    pub fn close(&self) -> bool {
        self.handle.dispose()
    }

    /// Runs the call on the current thread until a terminal outcome.
    ///
    /// Effective once: later calls, or calls after disposal, do nothing.
    pub fn run(&mut self) {
        if !self.handle.start() {
            return;
        }
        let mut orch = self.orchestrator();

        let terminal = loop {
            if self.handle.is_disposed() {
                orch.emit(EventKind::DeliverySuppressed, |ev| ev);
                return;
            }
            orch.begin_attempt();
            let output = invoke(&self.body);
            match orch.settle(output) {
                Step::Done(terminal) => break terminal,
                Step::Retry { delay } => pause(&self.handle, delay),
            }
        };

        self.deliver(&orch, terminal);
    }

    fn orchestrator(&self) -> Orchestrator<E> {
        Orchestrator::new(
            self.call.clone(),
            self.limit,
            self.policy.clone(),
            self.backoff,
            self.bus.clone(),
        )
    }

    fn deliver(&mut self, orch: &Orchestrator<E>, terminal: Terminal<R, E>) {
        if self.handle.is_disposed() {
            orch.emit(EventKind::DeliverySuppressed, |ev| ev);
            return;
        }
        if let Err(err) = self.mailbox.push(terminal) {
            orch.emit(EventKind::DeliveryOverflow, |ev| ev.with_error(err.to_string()));
            return;
        }

        while let Some(terminal) = self.mailbox.pop() {
            if self.handle.is_disposed() {
                orch.emit(EventKind::DeliverySuppressed, |ev| ev);
                continue;
            }
            match terminal {
                Terminal::Success(result) => {
                    let remaining = orch.budget().remaining();
                    orch.emit(EventKind::CallSucceeded, |ev| ev.with_remaining(remaining));
                    if let Some(on_success) = self.on_success.take() {
                        on_success(result);
                    }
                }
                Terminal::Failure(fault) => {
                    let text = fault.to_string();
                    orch.emit(EventKind::CallFailed, |ev| ev.with_error(text));
                    if let Some(on_failure) = self.on_failure.take() {
                        on_failure(fault);
                    }
                }
            }
        }
    }
}

impl<R, E> Caller<R, E>
where
    R: Outcome + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    /// Runs the call on tokio.
    ///
    /// Each attempt executes on the blocking pool; backoff pauses end early when
    /// the handle is disposed. Retry and delivery rules match [`Caller::run`].
    /// A panic inside the run body is resumed on the awaiting task.
    pub async fn run_async(mut self) {
        if !self.handle.start() {
            return;
        }
        let mut orch = self.orchestrator();

        let terminal = loop {
            if self.handle.is_disposed() {
                orch.emit(EventKind::DeliverySuppressed, |ev| ev);
                return;
            }
            orch.begin_attempt();

            let body = Arc::clone(&self.body);
            let output = match tokio::task::spawn_blocking(move || invoke(&body)).await {
                Ok(output) => output,
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(_cancelled) => {
                    orch.emit(EventKind::DeliverySuppressed, |ev| ev);
                    return;
                }
            };

            match orch.settle(output) {
                Step::Done(terminal) => break terminal,
                Step::Retry { delay } if delay.is_zero() => {}
                Step::Retry { delay } => {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = self.handle.disposed() => {}
                    }
                }
            }
        };

        self.deliver(&orch, terminal);
    }

    /// Spawns [`Caller::run_async`] onto the current tokio runtime.
    ///
    /// Returns the execution handle (for cancellation) and the task's join handle.
    pub fn spawn(self) -> (ExecutionHandle, JoinHandle<()>) {
        let handle = self.handle();
        (handle, tokio::spawn(self.run_async()))
    }
}

impl<R, E> Drop for Caller<R, E> {
    fn drop(&mut self) {
        self.handle.dispose();
        self.mailbox.close();
    }
}

/// Sleeps for `delay` in short slices, returning early once `handle` is disposed.
fn pause(handle: &ExecutionHandle, delay: Duration) {
    const SLICE: Duration = Duration::from_millis(10);

    let deadline = Instant::now() + delay;
    while !handle.is_disposed() {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            break;
        }
        std::thread::sleep(left.min(SLICE));
    }
}

fn invoke<R, E>(body: &Mutex<RunBody<R, E>>) -> Result<R, E> {
    let mut body = body.lock().unwrap_or_else(PoisonError::into_inner);
    (*body)()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::core::{Config, HandleState};
    use crate::policies::JitterPolicy;

    #[derive(Debug, Clone, PartialEq)]
    struct Reply {
        ok: bool,
        tag: u32,
    }

    impl Outcome for Reply {
        fn is_success(&self) -> bool {
            self.ok
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Fault {
        Network,
        Parse,
    }

    impl fmt::Display for Fault {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    /// Records what reached each callback.
    #[derive(Default, Clone)]
    struct Recorder {
        invocations: Arc<AtomicUsize>,
        successes: Arc<Mutex<Vec<Reply>>>,
        failures: Arc<Mutex<Vec<Fault>>>,
    }

    impl Recorder {
        fn builder<F>(&self, mut script: F) -> CallerBuilder<Reply, Fault>
        where
            F: FnMut(usize) -> Result<Reply, Fault> + Send + 'static,
        {
            let invocations = Arc::clone(&self.invocations);
            let successes = Arc::clone(&self.successes);
            let failures = Arc::clone(&self.failures);
            Caller::builder()
                .run_body(move || script(invocations.fetch_add(1, Ordering::SeqCst) + 1))
                .on_success(move |r| successes.lock().unwrap().push(r))
                .on_failure(move |e| failures.lock().unwrap().push(e))
        }

        fn invocations(&self) -> usize {
            self.invocations.load(Ordering::SeqCst)
        }

        fn successes(&self) -> Vec<Reply> {
            self.successes.lock().unwrap().clone()
        }

        fn failures(&self) -> Vec<Fault> {
            self.failures.lock().unwrap().clone()
        }
    }

    fn reply(ok: bool, tag: u32) -> Reply {
        Reply { ok, tag }
    }

    #[test]
    fn test_always_faulting_ends_in_failure_after_n_plus_one() {
        for n in [0_i64, 1, 4] {
            let rec = Recorder::default();
            let mut caller = rec
                .builder(|_| Err(Fault::Network))
                .max_retries(n)
                .build()
                .unwrap();
            caller.run();

            assert_eq!(rec.invocations(), n as usize + 1);
            assert_eq!(rec.failures(), vec![Fault::Network]);
            assert!(rec.successes().is_empty());
        }
    }

    #[test]
    fn test_last_fault_is_delivered() {
        let rec = Recorder::default();
        let mut caller = rec
            .builder(|i| Err(if i < 3 { Fault::Network } else { Fault::Parse }))
            .max_retries(2)
            .build()
            .unwrap();
        caller.run();
        assert_eq!(rec.failures(), vec![Fault::Parse]);
    }

    #[test]
    fn test_always_unsuccessful_with_retry_ends_in_success_callback() {
        let rec = Recorder::default();
        let mut caller = rec
            .builder(|i| Ok(reply(false, i as u32)))
            .max_retries(2)
            .retry_on_unsuccessful(true)
            .build()
            .unwrap();
        caller.run();

        assert_eq!(rec.invocations(), 3);
        assert_eq!(rec.successes(), vec![reply(false, 3)]);
        assert!(rec.failures().is_empty());
    }

    #[test]
    fn test_unsuccessful_without_retry_delivered_immediately() {
        let rec = Recorder::default();
        let mut caller = rec
            .builder(|_| Ok(reply(false, 1)))
            .max_retries(5)
            .build()
            .unwrap();
        caller.run();

        assert_eq!(rec.invocations(), 1);
        assert_eq!(rec.successes(), vec![reply(false, 1)]);
    }

    #[test]
    fn test_predicate_rejecting_fault_stops_retries() {
        let rec = Recorder::default();
        let mut caller = rec
            .builder(|_| Err(Fault::Parse))
            .max_retries(3)
            .retry_predicate(|f: &Fault| *f == Fault::Network)
            .build()
            .unwrap();
        caller.run();

        assert_eq!(rec.invocations(), 1);
        assert_eq!(rec.failures(), vec![Fault::Parse]);
    }

    #[test]
    fn test_three_faults_then_success() {
        let rec = Recorder::default();
        let mut caller = rec
            .builder(|i| if i <= 3 { Err(Fault::Network) } else { Ok(reply(true, 4)) })
            .max_retries(3)
            .build()
            .unwrap();
        caller.run();

        assert_eq!(rec.invocations(), 4);
        assert_eq!(rec.successes(), vec![reply(true, 4)]);
        assert!(rec.failures().is_empty());
    }

    #[test]
    fn test_narrow_predicate_still_retries_unsuccessful() {
        let rec = Recorder::default();
        let mut caller = rec
            .builder(|i| Ok(reply(i == 3, 3)))
            .max_retries(3)
            .retry_on_unsuccessful(true)
            .retry_predicate(|f: &Fault| *f == Fault::Network)
            .build()
            .unwrap();
        caller.run();

        assert_eq!(rec.invocations(), 3);
        assert_eq!(rec.successes(), vec![reply(true, 3)]);
    }

    #[test]
    fn test_run_is_effective_once() {
        let rec = Recorder::default();
        let mut caller = rec.builder(|_| Ok(reply(true, 0))).build().unwrap();
        caller.run();
        caller.run();
        assert_eq!(rec.invocations(), 1);
        assert_eq!(rec.successes().len(), 1);
    }

    #[test]
    fn test_close_twice_is_noop() {
        let rec = Recorder::default();
        let mut caller = rec.builder(|_| Ok(reply(true, 0))).build().unwrap();
        caller.run();
        assert!(caller.close());
        assert!(!caller.close());
        assert_eq!(caller.handle().state(), HandleState::Disposed);
    }

    #[test]
    fn test_disposed_before_run_does_nothing() {
        let rec = Recorder::default();
        let mut caller = rec.builder(|_| Ok(reply(true, 0))).build().unwrap();
        caller.close();
        caller.run();
        assert_eq!(rec.invocations(), 0);
        assert!(rec.successes().is_empty());
    }

    #[test]
    fn test_dispose_during_run_suppresses_delivery() {
        let slot: Arc<Mutex<Option<ExecutionHandle>>> = Arc::default();
        let rec = Recorder::default();
        let inner = Arc::clone(&slot);
        let mut caller = rec
            .builder(move |_| {
                if let Some(handle) = inner.lock().unwrap().as_ref() {
                    handle.dispose();
                }
                Err(Fault::Network)
            })
            .max_retries(5)
            .build()
            .unwrap();
        *slot.lock().unwrap() = Some(caller.handle());

        caller.run();
        // The in-flight attempt completes, nothing further runs or is delivered.
        assert_eq!(rec.invocations(), 1);
        assert!(rec.failures().is_empty());
        assert!(rec.successes().is_empty());
    }

    #[test]
    fn test_drop_releases_handle_even_when_callback_panics() {
        let caller = Caller::<bool, Fault>::builder()
            .run_body(|| Ok(true))
            .on_success(|_| panic!("callback blew up"))
            .build()
            .unwrap();
        let handle = caller.handle();

        let outcome = catch_unwind(AssertUnwindSafe(move || {
            let mut caller = caller;
            caller.run();
        }));
        assert!(outcome.is_err());
        assert!(handle.is_disposed());
    }

    /// A run queues one value into an empty mailbox, so no strategy can
    /// overflow here; overflow handling is covered by the `Mailbox` tests.
    #[test]
    fn test_error_strategy_config_is_accepted_smoke() {
        let rec = Recorder::default();
        let mut caller = rec
            .builder(|_| Ok(reply(true, 9)))
            .config(Config {
                backpressure: BackpressureStrategy::Error,
                delivery_capacity: 1,
                bus_capacity: 4,
            })
            .build()
            .unwrap();
        caller.run();
        assert_eq!(rec.successes(), vec![reply(true, 9)]);
    }

    #[test]
    fn test_events_trace_a_retried_call() {
        let rec = Recorder::default();
        let mut caller = rec
            .builder(|i| if i == 1 { Err(Fault::Network) } else { Ok(reply(true, 2)) })
            .name("traced")
            .max_retries(1)
            .with_events()
            .build()
            .unwrap();
        let mut rx = caller.bus().expect("events enabled").subscribe();
        caller.run();
        drop(caller);

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::AttemptStarting,
                EventKind::AttemptFailed,
                EventKind::RetryScheduled,
                EventKind::AttemptStarting,
                EventKind::CallSucceeded,
                EventKind::HandleDisposed,
            ]
        );
    }

    #[test]
    fn test_backoff_pauses_between_attempts() {
        let rec = Recorder::default();
        let mut caller = rec
            .builder(|_| Err(Fault::Network))
            .max_retries(2)
            .backoff(
                BackoffPolicy::exponential(Duration::from_millis(10), Duration::from_millis(10), 1.0)
                    .with_jitter(JitterPolicy::None),
            )
            .build()
            .unwrap();
        let started = std::time::Instant::now();
        caller.run();
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(rec.invocations(), 3);
    }

    #[tokio::test]
    async fn test_run_async_matches_blocking_contract() {
        let rec = Recorder::default();
        let caller = rec
            .builder(|i| if i <= 2 { Err(Fault::Network) } else { Ok(reply(true, 3)) })
            .max_retries(2)
            .build()
            .unwrap();
        caller.run_async().await;

        assert_eq!(rec.invocations(), 3);
        assert_eq!(rec.successes(), vec![reply(true, 3)]);
    }

    #[tokio::test]
    async fn test_spawned_call_cancelled_during_backoff() {
        let rec = Recorder::default();
        let caller = rec
            .builder(|_| Err(Fault::Network))
            .max_retries(10)
            .backoff(BackoffPolicy::exponential(
                Duration::from_secs(60),
                Duration::from_secs(60),
                1.0,
            ))
            .build()
            .unwrap();

        let (handle, join) = caller.spawn();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.dispose());
        tokio::time::timeout(Duration::from_secs(5), join)
            .await
            .expect("call stops promptly")
            .expect("task completes");

        assert!(rec.invocations() <= 1);
        assert!(rec.failures().is_empty());
    }
}
