//! # Configured retry maximum.
//!
//! [`RetryLimit`] is the immutable number of **additional** attempts allowed after the
//! first one. A limit of `n` permits at most `n + 1` invocations of the run body.
//!
//! Callers historically passed a signed count. Two interpretations of a negative
//! count exist and both are available by name:
//!
//! ```text
//! NegativeRetries::ClampToZero → -3 becomes 0 (single attempt)   [default]
//! NegativeRetries::RetryOnce   → -3 becomes 1 (one extra attempt)
//! ```

/// How a negative retry count is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NegativeRetries {
    /// Negative counts mean "no retries" (default).
    #[default]
    ClampToZero,
    /// Negative counts mean "retry once".
    RetryOnce,
}

/// Immutable maximum number of retries beyond the first attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct RetryLimit(u32);

impl RetryLimit {
    /// No retries: the run body is invoked exactly once.
    pub const NONE: RetryLimit = RetryLimit(0);

    /// Creates a limit from an unsigned count.
    pub const fn new(retries: u32) -> Self {
        Self(retries)
    }

    /// Creates a limit from a signed count, resolving negatives per `mode`.
    ///
    /// Counts larger than `u32::MAX` saturate.
    ///
    /// # Example
    /// ```
    /// use callvisor::{NegativeRetries, RetryLimit};
    ///
    /// assert_eq!(RetryLimit::from_signed(-1, NegativeRetries::ClampToZero).get(), 0);
    /// assert_eq!(RetryLimit::from_signed(-1, NegativeRetries::RetryOnce).get(), 1);
    /// assert_eq!(RetryLimit::from_signed(4, NegativeRetries::RetryOnce).get(), 4);
    /// ```
    pub fn from_signed(retries: i64, mode: NegativeRetries) -> Self {
        if retries < 0 {
            return match mode {
                NegativeRetries::ClampToZero => Self(0),
                NegativeRetries::RetryOnce => Self(1),
            };
        }
        Self(u32::try_from(retries).unwrap_or(u32::MAX))
    }

    /// Returns the number of retries.
    #[inline]
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Returns the maximum number of run body invocations (`retries + 1`).
    #[inline]
    pub fn max_attempts(&self) -> u64 {
        u64::from(self.0) + 1
    }
}
