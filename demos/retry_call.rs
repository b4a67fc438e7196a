//! # Demo: retry_call
//!
//! Shows a caller retrying a flaky quote service: one transport fault, one
//! unsuccessful reply, then success. Events are printed by [`LogWriter`].
//!
//! ## Flow
//! ```text
//! Caller::run_async()
//!   ├─► attempt 1 → Err("connection reset") → RetryScheduled{delay≈100ms}
//!   ├─► attempt 2 → Ok(Quote{status=503})   → budget 3→2, RetryScheduled{delay≈200ms}
//!   ├─► attempt 3 → Ok(Quote{status=200})   → CallSucceeded
//!   └─► on_success(quote)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example retry_call --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use callvisor::{
    BackoffPolicy, CallError, Caller, JitterPolicy, LogWriter, Outcome, Subscribe, SubscriberSet,
};

#[derive(Debug)]
struct Quote {
    status: u16,
    price: Option<f64>,
}

impl Outcome for Quote {
    fn is_success(&self) -> bool {
        self.status == 200
    }
}

static CALLS: AtomicU32 = AtomicU32::new(0);

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let caller = Caller::builder()
        .name("quote")
        .run_body(|| match CALLS.fetch_add(1, Ordering::SeqCst) {
            0 => Err(CallError::fail("connection reset")),
            1 => Ok(Quote {
                status: 503,
                price: None,
            }),
            _ => Ok(Quote {
                status: 200,
                price: Some(101.25),
            }),
        })
        .max_retries(3)
        .retry_on_unsuccessful(true)
        .retry_predicate(CallError::is_retryable)
        .backoff(
            BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_secs(2), 2.0)
                .with_jitter(JitterPolicy::Equal),
        )
        .on_success(|q: Quote| println!("[demo] quote status={} price={:?}", q.status, q.price))
        .on_failure(|e: CallError| println!("[demo] gave up: {e}"))
        .with_events()
        .build()?;

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let bus = caller.bus().cloned().ok_or("events not enabled")?;
    let listener = SubscriberSet::new(subs).listen(&bus);
    drop(bus);

    caller.run_async().await;

    listener.await?.shutdown().await;
    Ok(())
}
