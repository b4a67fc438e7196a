//! # Process-wide delivery configuration.
//!
//! Provides [`BackpressureStrategy`] and [`Config`].
//!
//! The backpressure strategy is read **once per process** from the
//! [`BACKPRESSURE_ENV`] environment variable and cached. Absent, blank or
//! unrecognised values resolve to [`BackpressureStrategy::Latest`]; resolution never fails.
//!
//! ## Sentinel values
//! - `delivery_capacity = 0` → treated as 1
//! - `bus_capacity = 0` → treated as 1

use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::UnknownStrategy;

/// Environment variable consulted by [`BackpressureStrategy::global`].
pub const BACKPRESSURE_ENV: &str = "CALLVISOR_BACKPRESSURE";

static GLOBAL_BACKPRESSURE: OnceLock<BackpressureStrategy> = OnceLock::new();

/// What the delivery queue does when a value arrives and the queue is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackpressureStrategy {
    /// Keep everything; the queue grows past its capacity.
    Buffer,
    /// Evict the oldest queued value to make room.
    DropOldest,
    /// Overwrite the newest queued value; older queued values stay (default).
    #[default]
    Latest,
    /// Reject the value with [`DeliveryError::Overflow`](crate::DeliveryError::Overflow).
    Error,
    /// Wait until the consumer frees a slot or the queue closes.
    Block,
}

impl FromStr for BackpressureStrategy {
    type Err = UnknownStrategy;

    /// Case-insensitive; `-` and `_` are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('-', "_");
        match norm.as_str() {
            "buffer" | "buffer_all" => Ok(Self::Buffer),
            "drop" | "drop_oldest" => Ok(Self::DropOldest),
            "latest" | "keep_latest" => Ok(Self::Latest),
            "error" => Ok(Self::Error),
            "block" => Ok(Self::Block),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

impl BackpressureStrategy {
    /// Resolves a raw setting, falling back to [`BackpressureStrategy::Latest`].
    ///
    /// # Example
    /// ```
    /// use callvisor::BackpressureStrategy;
    ///
    /// assert_eq!(BackpressureStrategy::resolve(Some("BUFFER")), BackpressureStrategy::Buffer);
    /// assert_eq!(BackpressureStrategy::resolve(Some("  ")), BackpressureStrategy::Latest);
    /// assert_eq!(BackpressureStrategy::resolve(Some("bogus")), BackpressureStrategy::Latest);
    /// assert_eq!(BackpressureStrategy::resolve(None), BackpressureStrategy::Latest);
    /// ```
    pub fn resolve(raw: Option<&str>) -> Self {
        raw.filter(|s| !s.trim().is_empty())
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Process-wide strategy, read from [`BACKPRESSURE_ENV`] on first use.
    pub fn global() -> Self {
        *GLOBAL_BACKPRESSURE
            .get_or_init(|| Self::resolve(std::env::var(BACKPRESSURE_ENV).ok().as_deref()))
    }
}

/// Delivery settings for a caller.
///
/// ## Field semantics
/// - `backpressure`: overflow behavior of the delivery queue
/// - `delivery_capacity`: delivery queue capacity (min 1)
/// - `bus_capacity`: capacity of a bus created by the builder (min 1)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Overflow behavior of the delivery queue.
    pub backpressure: BackpressureStrategy,
    /// Capacity of the delivery queue.
    pub delivery_capacity: usize,
    /// Capacity of an event bus created through [`CallerBuilder::with_events`](crate::CallerBuilder::with_events).
    pub bus_capacity: usize,
}

impl Config {
    /// Delivery queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn delivery_capacity_clamped(&self) -> usize {
        self.delivery_capacity.max(1)
    }

    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// - `backpressure = BackpressureStrategy::global()`
    /// - `delivery_capacity = 1` (one terminal value per run)
    /// - `bus_capacity = 64`
    fn default() -> Self {
        Self {
            backpressure: BackpressureStrategy::global(),
            delivery_capacity: 1,
            bus_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_spellings() {
        let cases = [
            ("buffer", BackpressureStrategy::Buffer),
            ("DROP", BackpressureStrategy::DropOldest),
            ("drop-oldest", BackpressureStrategy::DropOldest),
            ("Latest", BackpressureStrategy::Latest),
            ("ERROR", BackpressureStrategy::Error),
            ("block", BackpressureStrategy::Block),
        ];
        for (raw, expected) in cases {
            assert_eq!(raw.parse::<BackpressureStrategy>(), Ok(expected), "{raw}");
        }
    }

    #[test]
    fn test_missing_is_not_a_blocking_alias() {
        let err = "missing".parse::<BackpressureStrategy>().unwrap_err();
        assert_eq!(err.as_label(), "unknown_backpressure_strategy");
        assert_eq!(BackpressureStrategy::resolve(Some("MISSING")), BackpressureStrategy::Latest);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "sideways".parse::<BackpressureStrategy>().unwrap_err();
        assert_eq!(err, UnknownStrategy("sideways".into()));
    }

    #[test]
    fn test_resolve_never_fails() {
        assert_eq!(BackpressureStrategy::resolve(Some("sideways")), BackpressureStrategy::Latest);
        assert_eq!(BackpressureStrategy::resolve(Some("")), BackpressureStrategy::Latest);
        assert_eq!(BackpressureStrategy::resolve(None), BackpressureStrategy::Latest);
    }

    #[test]
    fn test_global_is_stable() {
        assert_eq!(BackpressureStrategy::global(), BackpressureStrategy::global());
    }

    #[test]
    fn test_capacities_are_clamped() {
        let cfg = Config {
            delivery_capacity: 0,
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.delivery_capacity_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
