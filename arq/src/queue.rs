//! Bounded queue plumbing shared by `iq`/`oq`, the ARQ's internal `ack_queue`, and the
//! server's per-session inbound packet queues.
//!
//! Generalizes `flux::shared::PayloadBatch`'s instinct — wrap the raw collection in a small
//! typed API instead of handing out the bare channel — around `std::sync::mpsc::sync_channel`,
//! which already has exactly the non-blocking-put / blocking-get-with-timeout shape this
//! protocol needs.

use std::sync::{mpsc, Mutex};
use std::time::Duration;

#[derive(Debug)]
pub struct QueueFull;

#[derive(Debug)]
pub struct Timeout;

/// The producing half of a bounded queue.
#[derive(Clone)]
pub struct Sender<T> {
    inner: mpsc::SyncSender<T>,
}

impl<T> Sender<T> {
    /// Enqueues `item` without blocking. Fails with `QueueFull` if the queue has no free slot
    /// or the receiver has gone away.
    #[inline]
    pub fn try_push(&self, item: T) -> Result<(), QueueFull> {
        self.inner.try_send(item).map_err(|_| QueueFull)
    }

    /// Enqueues `item`, blocking until a slot is free. Used by the application side of `oq`,
    /// which has no non-blocking requirement.
    #[inline]
    pub fn push(&self, item: T) -> Result<(), QueueFull> {
        self.inner.send(item).map_err(|_| QueueFull)
    }
}

/// The consuming half of a bounded queue.
pub struct Receiver<T> {
    inner: Mutex<mpsc::Receiver<T>>,
}

impl<T> Receiver<T> {
    /// Blocks indefinitely for the next item. Used to take a payload off `oq`.
    #[inline]
    pub fn pull(&self) -> Option<T> {
        self.inner.lock().unwrap().recv().ok()
    }

    /// Blocks for at most `timeout` for the next item.
    #[inline]
    pub fn pull_timeout(&self, timeout: Duration) -> Result<T, Timeout> {
        self.inner.lock().unwrap().recv_timeout(timeout).map_err(|_| Timeout)
    }
}

/// Creates a bounded queue with room for `capacity` items in flight.
pub fn bounded<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = mpsc::sync_channel(capacity);
    (Sender { inner: tx }, Receiver { inner: Mutex::new(rx) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_push_fails_when_full() {
        let (tx, rx) = bounded::<u8>(1);
        tx.try_push(1).unwrap();
        assert!(tx.try_push(2).is_err());
        assert_eq!(rx.pull(), Some(1));
    }

    #[test]
    fn pull_timeout_fires_when_empty() {
        let (_tx, rx) = bounded::<u8>(1);
        assert!(rx.pull_timeout(Duration::from_millis(10)).is_err());
    }
}
