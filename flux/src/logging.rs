//! Thin wrapper around `slog`/`sloggers` so every crate in the workspace builds its root
//! logger the same way, and child loggers are threaded down explicitly rather than reached
//! for through a global.

pub use slog::{debug, error, info, o, warn, Discard, Logger};

use sloggers::{Config, LoggerConfig};

/// Builds the process-wide root logger from a small TOML snippet, following the same
/// `sloggers::Config` shape the rest of the workspace expects. `level` accepts the usual
/// severity names (`"trace"`, `"debug"`, `"info"`, `"warning"`, `"error"`, `"critical"`).
pub fn init(level: &str) -> Logger {
    let toml = format!(
        r#"
type = "terminal"
level = "{}"
destination = "stdout"
"#,
        level
    );

    let config: LoggerConfig = match serdeconv::from_toml_str(&toml) {
        Ok(config) => config,
        Err(_) => return discard(),
    };

    config.build_logger().unwrap_or_else(|_| discard())
}

/// A logger that discards everything, handy for tests and library consumers that
/// haven't wired up their own sink yet.
pub fn discard() -> Logger {
    Logger::root(Discard, o!())
}
