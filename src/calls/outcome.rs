//! # Result contract.
//!
//! [`Outcome`] is the only thing the engine asks of a run body's result: whether it
//! represents success. An unsuccessful outcome is not a fault; it still reaches the
//! success callback, optionally after retries.

/// A value that knows whether it represents success.
///
/// # Example
/// ```
/// use callvisor::Outcome;
///
/// struct Reply {
///     code: u16,
/// }
///
/// impl Outcome for Reply {
///     fn is_success(&self) -> bool {
///         (200..300).contains(&self.code)
///     }
/// }
///
/// assert!(Reply { code: 204 }.is_success());
/// assert!(!Reply { code: 503 }.is_success());
/// ```
pub trait Outcome {
    /// True if this value represents a successful outcome.
    fn is_success(&self) -> bool;
}

impl Outcome for bool {
    fn is_success(&self) -> bool {
        *self
    }
}

impl<T: Outcome + ?Sized> Outcome for Box<T> {
    fn is_success(&self) -> bool {
        (**self).is_success()
    }
}
