//! # One-shot call helpers.
//!
//! Fire-and-forget entry points that build a [`Caller`], run it on the current
//! thread and release it. Each layer fills in one more option:
//!
//! ```text
//! call(body)
//!  └─► call_with_retries(body, 0)
//!       └─► call_with_policy(body, retries, false)
//!            └─► call_with_predicate(body, retries, flag, None)
//!                 └─► call_with_callbacks(body, retries, flag, predicate, None, None)
//! ```
//!
//! The caller is dropped on return (or unwind), which disposes its handle.

use std::fmt;

use crate::{
    calls::{
        CallerBuilder, Outcome,
        caller::{Caller, OnFailure, OnSuccess},
    },
    policies::RetryPredicate,
};

/// Runs `body` once with no retries and no callbacks.
pub fn call<R, E, F>(body: F)
where
    R: Outcome + 'static,
    E: fmt::Display + 'static,
    F: FnMut() -> Result<R, E> + Send + 'static,
{
    call_with_retries(body, 0);
}

/// Runs `body` with up to `retries` retries on any fault.
pub fn call_with_retries<R, E, F>(body: F, retries: i64)
where
    R: Outcome + 'static,
    E: fmt::Display + 'static,
    F: FnMut() -> Result<R, E> + Send + 'static,
{
    call_with_policy(body, retries, false);
}

/// Runs `body`, optionally retrying unsuccessful results too.
pub fn call_with_policy<R, E, F>(body: F, retries: i64, retry_on_unsuccessful: bool)
where
    R: Outcome + 'static,
    E: fmt::Display + 'static,
    F: FnMut() -> Result<R, E> + Send + 'static,
{
    call_with_predicate(body, retries, retry_on_unsuccessful, None);
}

/// Runs `body` with an optional fault predicate.
pub fn call_with_predicate<R, E, F>(
    body: F,
    retries: i64,
    retry_on_unsuccessful: bool,
    predicate: Option<RetryPredicate<E>>,
) where
    R: Outcome + 'static,
    E: fmt::Display + 'static,
    F: FnMut() -> Result<R, E> + Send + 'static,
{
    call_with_callbacks(body, retries, retry_on_unsuccessful, predicate, None, None);
}

/// Runs `body` with the full option set.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use callvisor::{call_with_callbacks, CallError, OnSuccess, RetryPredicate};
///
/// let tries = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&tries);
/// let only_retryable: RetryPredicate<CallError> = Arc::new(CallError::is_retryable);
/// let on_success: OnSuccess<bool> = Box::new(|ok| assert!(ok));
///
/// call_with_callbacks(
///     move || {
///         let n = counter.fetch_add(1, Ordering::SeqCst);
///         if n < 2 { Err(CallError::fail("busy")) } else { Ok(true) }
///     },
///     5,
///     false,
///     Some(only_retryable),
///     Some(on_success),
///     None,
/// );
/// assert_eq!(tries.load(Ordering::SeqCst), 3);
/// ```
pub fn call_with_callbacks<R, E, F>(
    body: F,
    retries: i64,
    retry_on_unsuccessful: bool,
    predicate: Option<RetryPredicate<E>>,
    on_success: Option<OnSuccess<R>>,
    on_failure: Option<OnFailure<E>>,
) where
    R: Outcome + 'static,
    E: fmt::Display + 'static,
    F: FnMut() -> Result<R, E> + Send + 'static,
{
    let mut caller: Caller<R, E> = CallerBuilder::new()
        .max_retries(retries)
        .retry_on_unsuccessful(retry_on_unsuccessful)
        .retry_predicate_shared(predicate)
        .callbacks(on_success, on_failure)
        .assemble(Box::new(body));
    caller.run();
}
