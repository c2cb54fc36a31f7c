//! Runtime configuration. Follows `flux::logging::init`'s "small TOML snippet with sensible
//! defaults, parsed with `serdeconv`" pattern rather than inventing a bespoke loader.

use flux::duration::DurationOrSecs;
use serde_derive::{Deserialize, Serialize};
use std::time::Duration;

/// Per-session inbound queue capacity. `Unbounded` exists for completeness but is not
/// recommended: `iq`/`oq` are meant to stay bounded so a slow consumer applies backpressure
/// instead of growing memory use without limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueueCapacity {
    Bounded(usize),
    Unbounded(UnboundedMarker),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnboundedMarker {
    Unbounded,
}

impl QueueCapacity {
    /// Resolves to an actual allocation size, substituting a generous but finite cap for
    /// `Unbounded` so the underlying `std::sync::mpsc::sync_channel` stays representable.
    pub fn resolve(self) -> usize {
        match self {
            QueueCapacity::Bounded(n) => n,
            QueueCapacity::Unbounded(_) => usize::MAX >> 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub disconnect_timeout: DurationOrSecs,
    pub max_pending_packets: QueueCapacity,
    pub retransmit_delay: DurationOrSecs,
    pub log_level: String,
}

impl Config {
    pub fn disconnect_timeout(&self) -> Duration {
        self.disconnect_timeout.to_duration()
    }

    pub fn retransmit_delay(&self) -> Duration {
        self.retransmit_delay.to_duration()
    }

    pub fn max_pending_packets(&self) -> usize {
        self.max_pending_packets.resolve()
    }

    pub fn from_toml_str(toml: &str) -> Result<Config, serdeconv::Error> {
        serdeconv::from_toml_str(toml)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            disconnect_timeout: DurationOrSecs::Secs(15.0),
            max_pending_packets: QueueCapacity::Bounded(64),
            retransmit_delay: DurationOrSecs::Duration {
                secs: 0,
                nanos: 10_000_000,
            },
            log_level: "info".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Config::default();
        assert_eq!(config.disconnect_timeout(), Duration::from_secs(15));
        assert_eq!(config.retransmit_delay(), Duration::from_millis(10));
        assert_eq!(config.max_pending_packets(), 64);
    }

    #[test]
    fn parses_seconds_and_queue_capacity_from_toml() {
        let config = Config::from_toml_str(
            r#"
disconnect_timeout = 5
max_pending_packets = 128
retransmit_delay = 0.02
log_level = "debug"
"#,
        )
        .unwrap();

        assert_eq!(config.disconnect_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_pending_packets(), 128);
        assert_eq!(config.retransmit_delay(), Duration::from_millis(20));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn accepts_unbounded_queue_capacity() {
        let config = Config::from_toml_str(r#"max_pending_packets = "unbounded""#).unwrap();
        assert!(config.max_pending_packets() > 1_000_000);
    }
}
