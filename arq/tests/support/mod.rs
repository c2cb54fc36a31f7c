//! A `slog::Drain` that records formatted messages instead of printing them, so integration
//! tests can assert on the exact log wording the ARQ layer is documented to produce.

use slog::{Drain, Never, OwnedKVList, Record};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct RecordingDrain {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingDrain {
    pub fn new() -> RecordingDrain {
        RecordingDrain {
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn logger(&self) -> slog::Logger {
        slog::Logger::root(self.clone().fuse(), slog::o!())
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().unwrap().iter().any(|line| line.contains(needle))
    }

    /// Polls for up to `timeout` for a logged line containing `needle`. Log lines land on a
    /// session's own thread, so a bare `contains` check right after an assertion can race it.
    pub fn wait_for(&self, needle: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.contains(needle) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Drain for RecordingDrain {
    type Ok = ();
    type Err = Never;

    fn log(&self, record: &Record, _values: &OwnedKVList) -> Result<Self::Ok, Self::Err> {
        self.messages
            .lock()
            .unwrap()
            .push(format!("{}", record.msg()));
        Ok(())
    }
}
