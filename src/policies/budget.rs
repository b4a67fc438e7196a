//! # Retry budget for unsuccessful results.
//!
//! [`RetryBudget`] tracks how many more retries may be spent on results that are
//! structurally valid but report `is_success() == false`. It starts at the configured
//! [`RetryLimit`](crate::RetryLimit) and only moves down.
//!
//! The budget is independent from the orchestrator's hard attempt cap: faults consume
//! attempts but never budget.

/// Remaining retries for the unsuccessful-result path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u32,
}

impl RetryBudget {
    /// Creates a budget holding `max` retries.
    pub fn new(max: u32) -> Self {
        Self { remaining: max }
    }

    /// Retries still available.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// True once every retry has been spent.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Spends one retry.
    ///
    /// Returns `false` (and leaves the budget at zero) when already exhausted.
    pub fn try_consume(&mut self) -> bool {
        match self.remaining.checked_sub(1) {
            Some(left) => {
                self.remaining = left;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_until_exhausted() {
        let mut budget = RetryBudget::new(2);
        assert!(!budget.is_exhausted());
        assert!(budget.try_consume());
        assert_eq!(budget.remaining(), 1);
        assert!(budget.try_consume());
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_never_goes_below_zero() {
        let mut budget = RetryBudget::new(0);
        assert!(budget.is_exhausted());
        assert!(!budget.try_consume());
        assert!(!budget.try_consume());
        assert_eq!(budget.remaining(), 0);
    }
}
