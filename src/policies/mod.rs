//! Retry decisions and pacing.
//!
//! This module groups the knobs that control **whether** a call is attempted again
//! and **how long** to wait before the next attempt.
//!
//! ## Contents
//! - [`RetryPolicy`] ordered retry decision over a [`Signal`] (fault or non-success)
//! - [`RetryBudget`] live counter for retries triggered by unsuccessful results
//! - [`RetryLimit`]  immutable configured maximum (with [`NegativeRetries`] modes)
//! - [`BackoffPolicy`] delay between attempts (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization of those delays
//!
//! ## Quick wiring
//! ```text
//! CallerBuilder { max_retries, retry_on_unsuccessful, retry_predicate, backoff }
//!      └─► core::orchestrator::Orchestrator uses:
//!           - RetryLimit as the hard attempt cap (limit + 1 invocations)
//!           - RetryBudget for unsuccessful-result retries
//!           - RetryPolicy to decide retry/terminate per signal
//!           - backoff.next(attempt) to pace the next attempt
//! ```
//!
//! ## Defaults
//! - `RetryLimit` = 0 (single attempt), negative input clamped to zero.
//! - `RetryPolicy` without predicate retries on any fault.
//! - Callers use `BackoffPolicy::immediate()` (no delay) unless configured.

mod backoff;
mod budget;
mod jitter;
mod limit;
mod retry;

pub use backoff::BackoffPolicy;
pub use budget::RetryBudget;
pub use jitter::JitterPolicy;
pub use limit::{NegativeRetries, RetryLimit};
pub use retry::{RetryPolicy, RetryPredicate, Signal};
