//! Config values that accept either a plain number of seconds or a duration-shaped value.
//!
//! This mirrors how `sloggers::LoggerConfig` lets a single TOML field take more than one
//! shape (see [`logging`](crate::logging)); here it lets `disconnect_timeout` and
//! `retransmit_delay` be written as `15` or `{ secs = 15, nanos = 0 }` in a config file.

use serde_derive::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationOrSecs {
    Secs(f64),
    Duration { secs: u64, #[serde(default)] nanos: u32 },
}

impl DurationOrSecs {
    pub fn to_duration(self) -> Duration {
        match self {
            DurationOrSecs::Secs(secs) => Duration::from_secs_f64(secs.max(0.0)),
            DurationOrSecs::Duration { secs, nanos } => Duration::new(secs, nanos),
        }
    }
}

impl From<Duration> for DurationOrSecs {
    fn from(duration: Duration) -> Self {
        DurationOrSecs::Duration {
            secs: duration.as_secs(),
            nanos: duration.subsec_nanos(),
        }
    }
}

impl From<DurationOrSecs> for Duration {
    fn from(value: DurationOrSecs) -> Self {
        value.to_duration()
    }
}

/// Converts a duration into fractional seconds, the form most of the diagnostic logging
/// in this workspace prefers over a raw `Duration` debug print.
#[inline]
pub fn as_secs_f64(duration: Duration) -> f64 {
    duration.as_secs_f64()
}
