//! Call events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the orchestrator (attempt and terminal events) and
//!   [`ExecutionHandle`](crate::ExecutionHandle) (disposal).
//! - **Consumers**: anything holding a receiver from [`Bus::subscribe`], typically
//!   [`SubscriberSet::listen`](crate::SubscriberSet::listen).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
