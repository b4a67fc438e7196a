//! # LogWriter: one line per event
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//!
//! ## Example output
//! ```text
//! [attempt] call="fetch" attempt=1
//! [attempt-failed] call="fetch" attempt=1 err="execution failed: timeout"
//! [retry] call="fetch" after_attempt=1 delay=100ms
//! [unsuccessful] call="fetch" attempt=2 budget_left=1
//! [succeeded] call="fetch" attempt=3
//! [disposed] call="fetch"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn render(e: &Event) -> String {
        let call = e.call.as_deref().unwrap_or("?");
        let attempt = e.attempt.unwrap_or(0);
        match e.kind {
            EventKind::AttemptStarting => format!("[attempt] call={call:?} attempt={attempt}"),
            EventKind::AttemptFailed => format!(
                "[attempt-failed] call={call:?} attempt={attempt} err={:?}",
                e.error.as_deref().unwrap_or("")
            ),
            EventKind::ResultUnsuccessful => format!(
                "[unsuccessful] call={call:?} attempt={attempt} budget_left={}",
                e.remaining.unwrap_or(0)
            ),
            EventKind::RetryScheduled => format!(
                "[retry] call={call:?} after_attempt={attempt} delay={:?}",
                e.delay.unwrap_or_default()
            ),
            EventKind::CallSucceeded => format!("[succeeded] call={call:?} attempt={attempt}"),
            EventKind::CallFailed => format!(
                "[failed] call={call:?} attempt={attempt} err={:?}",
                e.error.as_deref().unwrap_or("")
            ),
            EventKind::DeliverySuppressed => format!("[suppressed] call={call:?}"),
            EventKind::DeliveryOverflow => format!(
                "[overflow] call={call:?} err={:?}",
                e.error.as_deref().unwrap_or("")
            ),
            EventKind::HandleDisposed => format!("[disposed] call={call:?}"),
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", Self::render(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_render_retry_line() {
        let ev = Event::new(EventKind::RetryScheduled)
            .with_call("fetch")
            .with_attempt(1)
            .with_delay(Duration::from_millis(100));
        assert_eq!(
            LogWriter::render(&ev),
            "[retry] call=\"fetch\" after_attempt=1 delay=100ms"
        );
    }

    #[test]
    fn test_render_without_call_name() {
        let ev = Event::new(EventKind::HandleDisposed);
        assert_eq!(LogWriter::render(&ev), "[disposed] call=\"?\"");
    }
}
