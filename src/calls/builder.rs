//! # Caller configuration.
//!
//! [`CallerBuilder`] collects named options and validates them in
//! [`build`](CallerBuilder::build). Only the run body is required.
//!
//! | Option                  | Default                        |
//! |-------------------------|--------------------------------|
//! | `run_body`              | required                       |
//! | `name`                  | `"call"`                       |
//! | `max_retries`           | `0` (negative clamped to `0`)  |
//! | `retry_on_unsuccessful` | `false`                        |
//! | `retry_predicate`       | none (retry on any fault)      |
//! | `on_success`            | none                           |
//! | `on_failure`            | none                           |
//! | `backoff`               | `BackoffPolicy::immediate()`   |
//! | `config`                | `Config::default()`            |
//! | `bus`                   | none (no events)               |

use std::borrow::Cow;
use std::sync::{Arc, Mutex};

use crate::{
    calls::{
        Outcome,
        caller::{Caller, OnFailure, OnSuccess, RunBody},
    },
    core::{Config, ExecutionHandle, Mailbox},
    error::{CallError, ConfigError},
    events::Bus,
    policies::{BackoffPolicy, NegativeRetries, RetryLimit, RetryPolicy, RetryPredicate},
};

/// Builder for [`Caller`].
///
/// # Example
/// ```
/// use std::sync::{Arc, Mutex};
/// use callvisor::{CallError, Caller};
///
/// let seen = Arc::new(Mutex::new(None));
/// let sink = Arc::clone(&seen);
///
/// let mut caller = Caller::<bool, CallError>::builder()
///     .name("ping")
///     .run_body(|| Ok(true))
///     .max_retries(2)
///     .on_success(move |ok| *sink.lock().unwrap() = Some(ok))
///     .build()
///     .expect("run body configured");
///
/// caller.run();
/// assert_eq!(*seen.lock().unwrap(), Some(true));
/// ```
pub struct CallerBuilder<R, E = CallError> {
    name: Cow<'static, str>,
    body: Option<RunBody<R, E>>,
    limit: RetryLimit,
    retry_unsuccessful: bool,
    predicate: Option<RetryPredicate<E>>,
    on_success: Option<OnSuccess<R>>,
    on_failure: Option<OnFailure<E>>,
    backoff: BackoffPolicy,
    config: Option<Config>,
    bus: Option<Bus>,
    events: bool,
}

impl<R, E> Default for CallerBuilder<R, E> {
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("call"),
            body: None,
            limit: RetryLimit::NONE,
            retry_unsuccessful: false,
            predicate: None,
            on_success: None,
            on_failure: None,
            backoff: BackoffPolicy::immediate(),
            config: None,
            bus: None,
            events: false,
        }
    }
}

impl<R, E> CallerBuilder<R, E>
where
    R: Outcome + 'static,
    E: 'static,
{
    /// Creates a builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the work to execute on every attempt.
    pub fn run_body<F>(mut self, body: F) -> Self
    where
        F: FnMut() -> Result<R, E> + Send + 'static,
    {
        self.body = Some(Box::new(body));
        self
    }

    /// Sets the call name used in events.
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the retry maximum; negative values are clamped to zero.
    pub fn max_retries(self, retries: i64) -> Self {
        self.max_retries_with(retries, NegativeRetries::ClampToZero)
    }

    /// Sets the retry maximum, interpreting negative values per `mode`.
    pub fn max_retries_with(mut self, retries: i64, mode: NegativeRetries) -> Self {
        self.limit = RetryLimit::from_signed(retries, mode);
        self
    }

    /// Sets the retry maximum directly.
    pub fn retry_limit(mut self, limit: RetryLimit) -> Self {
        self.limit = limit;
        self
    }

    /// Enables retries for results whose `is_success()` is `false`.
    pub fn retry_on_unsuccessful(mut self, enabled: bool) -> Self {
        self.retry_unsuccessful = enabled;
        self
    }

    /// Restricts fault retries to faults matching `predicate`.
    pub fn retry_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Sets or clears a shared fault predicate.
    pub fn retry_predicate_shared(mut self, predicate: Option<RetryPredicate<E>>) -> Self {
        self.predicate = predicate;
        self
    }

    /// Receives every terminal non-faulting result, successful or not.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(R) + Send + 'static,
    {
        self.on_success = Some(Box::new(f));
        self
    }

    /// Receives the terminal fault once fault retries are exhausted.
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(E) + Send + 'static,
    {
        self.on_failure = Some(Box::new(f));
        self
    }

    pub(crate) fn callbacks(
        mut self,
        on_success: Option<OnSuccess<R>>,
        on_failure: Option<OnFailure<E>>,
    ) -> Self {
        self.on_success = on_success;
        self.on_failure = on_failure;
        self
    }

    /// Sets the delay schedule between attempts.
    pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Overrides delivery settings (backpressure, capacities).
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Publishes call events to `bus`.
    pub fn bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Publishes call events to a fresh bus sized by [`Config::bus_capacity`].
    ///
    /// Retrieve it with [`Caller::bus`] to subscribe before running.
    pub fn with_events(mut self) -> Self {
        self.events = true;
        self
    }

    /// Validates the configuration and creates the caller.
    ///
    /// # Errors
    /// [`ConfigError::MissingRunBody`] if no run body was set.
    pub fn build(mut self) -> Result<Caller<R, E>, ConfigError> {
        let body = self.body.take().ok_or(ConfigError::MissingRunBody)?;
        Ok(self.assemble(body))
    }

    pub(crate) fn assemble(self, body: RunBody<R, E>) -> Caller<R, E> {
        let config = self.config.unwrap_or_default();
        let bus = match self.bus {
            Some(bus) => Some(bus),
            None if self.events => Some(Bus::new(config.bus_capacity_clamped())),
            None => None,
        };
        let call: Arc<str> = Arc::from(self.name.as_ref());

        Caller {
            handle: ExecutionHandle::with_bus(call.clone(), bus.clone()),
            call,
            body: Arc::new(Mutex::new(body)),
            limit: self.limit,
            policy: RetryPolicy::new(self.predicate, self.retry_unsuccessful),
            backoff: self.backoff,
            on_success: self.on_success,
            on_failure: self.on_failure,
            mailbox: Mailbox::new(config.delivery_capacity_clamped(), config.backpressure),
            bus,
        }
    }
}
