//! # Callers and their configuration.
//!
//! This module provides the public entry points:
//! - [`Outcome`] - result contract (`is_success`)
//! - [`CallerBuilder`] - named configuration options, validated by `build()`
//! - [`Caller`] - runs the body with retries and delivers to callbacks
//! - [`call`] and friends - one-shot, fire-and-forget helpers

mod builder;
mod call;
mod caller;
mod outcome;

pub use builder::CallerBuilder;
pub use call::{call, call_with_callbacks, call_with_policy, call_with_predicate, call_with_retries};
pub use caller::{Caller, OnFailure, OnSuccess, RunBody};
pub use outcome::Outcome;
