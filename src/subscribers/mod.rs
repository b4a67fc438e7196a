//! # Event subscribers.
//!
//! ```text
//!   Caller ── publish(Event) ──► Bus ──► SubscriberSet::listen
//!                                              │
//!                                   ┌──────────┼──────────┐
//!                                   ▼          ▼          ▼
//!                               LogWriter   Metrics    Custom
//! ```
//!
//! Implement [`Subscribe`] for custom handlers. The built-in [`LogWriter`] is
//! available with the `logging` feature.

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
