//! # Execution handle: lifecycle and cancellation point of one run.
//!
//! ```text
//!   Idle ──start()──► Running ──dispose()──► Disposed
//!     └───────────────dispose()──────────────────┘
//! ```
//!
//! ## Rules
//! - `start()` succeeds only from `Idle` (one run per handle).
//! - `dispose()` transitions to `Disposed` exactly once; later calls are no-ops.
//! - Disposal is cooperative: it stops further callback delivery and wakes async
//!   waits, but never interrupts a run body invocation already in progress.
//! - Clones share state; any clone may dispose.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const DISPOSED: u8 = 2;

/// Observable state of an [`ExecutionHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleState {
    /// Created, not yet running.
    Idle,
    /// A run is in progress or has completed without disposal.
    Running,
    /// Released; no further delivery happens.
    Disposed,
}

struct Inner {
    state: AtomicU8,
    token: CancellationToken,
    call: Arc<str>,
    bus: Option<Bus>,
}

/// Cloneable, idempotently disposable handle for one run.
///
/// # Example
/// ```
/// use callvisor::{ExecutionHandle, HandleState};
///
/// let handle = ExecutionHandle::new();
/// assert_eq!(handle.state(), HandleState::Idle);
///
/// assert!(handle.dispose());
/// assert!(!handle.dispose()); // second call is a no-op
/// assert!(handle.is_disposed());
/// ```
#[derive(Clone)]
pub struct ExecutionHandle {
    inner: Arc<Inner>,
}

impl Default for ExecutionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExecutionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionHandle")
            .field("call", &self.inner.call)
            .field("state", &self.state())
            .finish()
    }
}

impl ExecutionHandle {
    /// Creates an idle handle that publishes nothing.
    pub fn new() -> Self {
        Self::with_bus("call".into(), None)
    }

    pub(crate) fn with_bus(call: Arc<str>, bus: Option<Bus>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: AtomicU8::new(IDLE),
                token: CancellationToken::new(),
                call,
                bus,
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> HandleState {
        match self.inner.state.load(Ordering::Acquire) {
            IDLE => HandleState::Idle,
            RUNNING => HandleState::Running,
            _ => HandleState::Disposed,
        }
    }

    /// Moves `Idle → Running`. Returns `false` from any other state.
    pub(crate) fn start(&self) -> bool {
        self.inner
            .state
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Releases the handle.
    ///
    /// Returns `true` if this call performed the transition, `false` if the handle
    /// was already disposed.
    pub fn dispose(&self) -> bool {
        let prev = self.inner.state.swap(DISPOSED, Ordering::AcqRel);
        if prev == DISPOSED {
            return false;
        }
        self.inner.token.cancel();
        if let Some(bus) = &self.inner.bus {
            bus.publish(Event::new(EventKind::HandleDisposed).with_call(self.inner.call.clone()));
        }
        true
    }

    /// True once disposed.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) == DISPOSED
    }

    /// Completes when the handle is disposed.
    pub async fn disposed(&self) {
        self.inner.token.cancelled().await;
    }
}
