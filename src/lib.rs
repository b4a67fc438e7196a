//! # callvisor
//!
//! **Callvisor** is a small retrying call engine for Rust.
//!
//! It runs a unit of work that produces a self-describing result (a value that knows
//! whether it represents success), retries it under configurable conditions and
//! delivers the outcome through success/failure callbacks, with an idempotently
//! disposable handle for cancellation and cleanup.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   CallerBuilder ──build()──► Caller
//!                                │ run() / run_async()
//!                                ▼
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │  Orchestrator (one per run)                                  │
//!   │  - attempt counter (hard cap: max_retries + 1)               │
//!   │  - RetryBudget (unsuccessful-result retries)                 │
//!   │  - RetryPolicy (predicate, then non-success fallback)        │
//!   │  - BackoffPolicy (pause between attempts)                    │
//!   └──────┬──────────────────────────────┬────────────────────────┘
//!          ▼                              ▼
//!      Mailbox (backpressure)         Bus (events) ──► SubscriberSet
//!          │                                              │
//!     ┌────┴─────┐                                   LogWriter, ...
//!     ▼          ▼
//!  on_success  on_failure
//! ```
//!
//! ### Terminal routing
//! ```text
//! run body keeps faulting            ─► on_failure(last fault)
//! run body keeps returning !success  ─► on_success(last unsuccessful result)
//! run body returns success           ─► on_success(result)
//! handle disposed before delivery    ─► nothing
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                          |
//! |-------------------|----------------------------------------------------------|---------------------------------------------|
//! | **Calls**         | Configure and run retrying calls, one-shot helpers.      | [`Caller`], [`CallerBuilder`], [`call`]     |
//! | **Results**       | Self-describing results.                                 | [`Outcome`]                                 |
//! | **Policies**      | Retry decisions, budget, limits, backoff.                | [`RetryPolicy`], [`RetryBudget`], [`BackoffPolicy`] |
//! | **Lifecycle**     | Idempotent disposal and cancellation.                    | [`ExecutionHandle`]                         |
//! | **Delivery**      | Process-wide backpressure for terminal values.           | [`BackpressureStrategy`], [`Mailbox`]       |
//! | **Events**        | Attempt/terminal events and subscribers.                 | [`Bus`], [`Event`], [`Subscribe`]           |
//! | **Errors**        | Typed errors for configuration, calls and delivery.      | [`ConfigError`], [`CallError`], [`DeliveryError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//! use callvisor::{CallError, Caller, Outcome};
//!
//! struct Reply {
//!     status: u16,
//! }
//!
//! impl Outcome for Reply {
//!     fn is_success(&self) -> bool {
//!         self.status == 200
//!     }
//! }
//!
//! let tries = Arc::new(AtomicU32::new(0));
//! let counter = Arc::clone(&tries);
//!
//! let mut caller = Caller::builder()
//!     .name("fetch-quote")
//!     .run_body(move || {
//!         let n = counter.fetch_add(1, Ordering::SeqCst);
//!         match n {
//!             0 => Err(CallError::fail("connection reset")),
//!             1 => Ok(Reply { status: 503 }),
//!             _ => Ok(Reply { status: 200 }),
//!         }
//!     })
//!     .max_retries(3)
//!     .retry_on_unsuccessful(true)
//!     .on_success(|reply: Reply| assert_eq!(reply.status, 200))
//!     .on_failure(|err: CallError| panic!("unexpected: {err}"))
//!     .build()?;
//!
//! caller.run();
//! assert_eq!(tries.load(Ordering::SeqCst), 3);
//! # Ok::<(), callvisor::ConfigError>(())
//! ```
mod calls;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use calls::{
    Caller, CallerBuilder, OnFailure, OnSuccess, Outcome, RunBody, call, call_with_callbacks,
    call_with_policy, call_with_predicate, call_with_retries,
};
pub use crate::core::{
    BACKPRESSURE_ENV, BackpressureStrategy, Config, ExecutionHandle, HandleState, Mailbox,
};
pub use error::{CallError, ConfigError, DeliveryError, UnknownStrategy};
pub use events::{Bus, Event, EventKind};
pub use policies::{
    BackoffPolicy, JitterPolicy, NegativeRetries, RetryBudget, RetryLimit, RetryPolicy,
    RetryPredicate, Signal,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
