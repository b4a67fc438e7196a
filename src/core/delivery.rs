//! # Delivery queue for terminal values.
//!
//! [`Mailbox`] sits between the orchestrator and the callbacks. A terminal value is
//! pushed, then drained to the consumer. When the consumer is busy and the queue is
//! full, the configured [`BackpressureStrategy`] decides what happens:
//!
//! ```text
//! push(v) on a full queue
//!   ├─ Buffer     ─► queue grows past capacity
//!   ├─ DropOldest ─► front evicted, v appended
//!   ├─ Latest     ─► newest slot overwritten with v
//!   ├─ Error      ─► Err(DeliveryError::Overflow)
//!   └─ Block      ─► wait for pop() or close()
//! ```
//!
//! Popping and closing wake blocked producers. Values queued before `close()` can
//! still be popped.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::core::config::BackpressureStrategy;
use crate::error::DeliveryError;

struct Slots<T> {
    queue: VecDeque<T>,
    closed: bool,
}

/// Bounded, strategy-governed delivery queue.
pub struct Mailbox<T> {
    slots: Mutex<Slots<T>>,
    space: Condvar,
    capacity: usize,
    strategy: BackpressureStrategy,
}

impl<T> Mailbox<T> {
    /// Creates a queue; `capacity` is clamped to at least 1.
    pub fn new(capacity: usize, strategy: BackpressureStrategy) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Mutex::new(Slots {
                queue: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            space: Condvar::new(),
            capacity,
            strategy,
        }
    }

    /// Queue capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Strategy applied on overflow.
    pub fn strategy(&self) -> BackpressureStrategy {
        self.strategy
    }

    /// Number of queued values.
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queues `value`, applying the backpressure strategy when full.
    ///
    /// # Example
    /// ```
    /// use callvisor::{BackpressureStrategy, DeliveryError, Mailbox};
    ///
    /// let mb = Mailbox::new(1, BackpressureStrategy::Error);
    /// mb.push("first").unwrap();
    /// assert_eq!(mb.push("second"), Err(DeliveryError::Overflow { capacity: 1 }));
    /// assert_eq!(mb.pop(), Some("first"));
    /// ```
    pub fn push(&self, value: T) -> Result<(), DeliveryError> {
        let mut slots = self.lock();
        if slots.closed {
            return Err(DeliveryError::Closed);
        }
        if slots.queue.len() < self.capacity {
            slots.queue.push_back(value);
            return Ok(());
        }

        match self.strategy {
            BackpressureStrategy::Buffer => slots.queue.push_back(value),
            BackpressureStrategy::DropOldest => {
                slots.queue.pop_front();
                slots.queue.push_back(value);
            }
            BackpressureStrategy::Latest => {
                if let Some(newest) = slots.queue.back_mut() {
                    *newest = value;
                }
            }
            BackpressureStrategy::Error => {
                return Err(DeliveryError::Overflow {
                    capacity: self.capacity,
                });
            }
            BackpressureStrategy::Block => {
                while slots.queue.len() >= self.capacity && !slots.closed {
                    slots = self
                        .space
                        .wait(slots)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                if slots.closed {
                    return Err(DeliveryError::Closed);
                }
                slots.queue.push_back(value);
            }
        }
        Ok(())
    }

    /// Takes the oldest queued value without waiting.
    pub fn pop(&self) -> Option<T> {
        let value = self.lock().queue.pop_front();
        if value.is_some() {
            self.space.notify_one();
        }
        value
    }

    /// Rejects further pushes and wakes blocked producers.
    pub fn close(&self) {
        self.lock().closed = true;
        self.space.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, Slots<T>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn drain<T>(mb: &Mailbox<T>) -> Vec<T> {
        std::iter::from_fn(|| mb.pop()).collect()
    }

    #[test]
    fn test_buffer_grows_past_capacity() {
        let mb = Mailbox::new(1, BackpressureStrategy::Buffer);
        for i in 0..3 {
            mb.push(i).unwrap();
        }
        assert_eq!(drain(&mb), vec![0, 1, 2]);
    }

    #[test]
    fn test_drop_oldest_evicts_front() {
        let mb = Mailbox::new(2, BackpressureStrategy::DropOldest);
        for i in 0..4 {
            mb.push(i).unwrap();
        }
        assert_eq!(drain(&mb), vec![2, 3]);
    }

    #[test]
    fn test_latest_overwrites_newest() {
        let mb = Mailbox::new(2, BackpressureStrategy::Latest);
        for i in 0..4 {
            mb.push(i).unwrap();
        }
        assert_eq!(drain(&mb), vec![0, 3]);
    }

    #[test]
    fn test_error_rejects_overflow() {
        let mb = Mailbox::new(0, BackpressureStrategy::Error);
        assert_eq!(mb.capacity(), 1);
        mb.push(1).unwrap();
        assert_eq!(mb.push(2), Err(DeliveryError::Overflow { capacity: 1 }));
        assert_eq!(drain(&mb), vec![1]);
    }

    #[test]
    fn test_closed_rejects_push_but_keeps_queued() {
        let mb = Mailbox::new(1, BackpressureStrategy::Latest);
        mb.push(7).unwrap();
        mb.close();
        assert_eq!(mb.push(8), Err(DeliveryError::Closed));
        assert_eq!(mb.pop(), Some(7));
    }

    #[test]
    fn test_block_waits_for_consumer() {
        let mb = Arc::new(Mailbox::new(1, BackpressureStrategy::Block));
        mb.push(1).unwrap();

        let producer = {
            let mb = Arc::clone(&mb);
            thread::spawn(move || mb.push(2))
        };
        thread::sleep(Duration::from_millis(20));
        assert_eq!(mb.pop(), Some(1));

        producer.join().unwrap().unwrap();
        assert_eq!(mb.pop(), Some(2));
    }

    #[test]
    fn test_block_released_by_close() {
        let mb = Arc::new(Mailbox::new(1, BackpressureStrategy::Block));
        mb.push(1).unwrap();

        let producer = {
            let mb = Arc::clone(&mb);
            thread::spawn(move || mb.push(2))
        };
        thread::sleep(Duration::from_millis(20));
        mb.close();
        assert_eq!(producer.join().unwrap(), Err(DeliveryError::Closed));
    }
}
