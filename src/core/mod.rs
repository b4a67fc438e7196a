//! Runtime core: orchestration, lifecycle and delivery.
//!
//! Internal modules:
//! - [`orchestrator`]: turns each attempt into retry/terminate verdicts;
//! - [`handle`]: tri-state, idempotently disposable execution handle;
//! - [`delivery`]: bounded delivery queue governed by backpressure;
//! - [`config`]: process-wide backpressure resolution and delivery settings.

mod config;
mod delivery;
mod handle;
pub(crate) mod orchestrator;

pub use config::{BACKPRESSURE_ENV, BackpressureStrategy, Config};
pub use delivery::Mailbox;
pub use handle::{ExecutionHandle, HandleState};
