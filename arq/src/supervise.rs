//! Scoped concurrent task supervision (component F).
//!
//! `concurrently` in the original design is "spawn a task, guarantee its cancellation and join
//! on scope exit." On a cooperative single-threaded runtime that's a structured-concurrency
//! primitive; mapped onto real OS threads it becomes an RAII guard that flips a stop flag and
//! joins, which is what [`Scoped`] is. Exposed as a first-class type rather than folded into
//! `Drop` impls on unrelated state, per the design notes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Handed to a supervised task so it can observe a cancellation request at its own suspension
/// points (anywhere it already blocks with a timeout).
#[derive(Clone)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A task spawned on its own thread whose cancellation and join are guaranteed on drop.
pub struct Scoped {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Scoped {
    /// Spawns `task` on a new thread, handing it a [`StopToken`] it is expected to poll at its
    /// own blocking/timed-wait points.
    pub fn spawn<F>(name: &str, task: F) -> Scoped
    where
        F: FnOnce(StopToken) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let token = StopToken(stop.clone());

        let handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || task(token))
            .expect("failed to spawn supervised task");

        Scoped {
            stop,
            handle: Some(handle),
        }
    }

    /// Requests cancellation without waiting for the task to observe it.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

impl Drop for Scoped {
    fn drop(&mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
