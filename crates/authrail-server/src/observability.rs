//! Tracing setup for the demo server.
//!
//! Logging starts at `info` so configuration loading is visible, then
//! switches to `logging.level` once the config file has been read. An
//! explicit `RUST_LOG` pins the filter for the whole run.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

use crate::config::LoggingConfig;

const STARTUP_LEVEL: &str = "info";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

static FILTER: OnceLock<FilterHandle> = OnceLock::new();

fn rust_log_pinned() -> bool {
    std::env::var_os(EnvFilter::DEFAULT_ENV).is_some()
}

/// `RUST_LOG` directives when set and parseable, `level` otherwise.
fn filter_for(level: &str) -> EnvFilter {
    if rust_log_pinned() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    EnvFilter::new(level)
}

/// Installs the global subscriber. Later calls do nothing.
pub fn init_tracing() {
    let (filter, handle) = reload::Layer::new(filter_for(STARTUP_LEVEL));
    if FILTER.set(handle).is_err() {
        return;
    }
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}

/// Switches the running filter to the configured level.
///
/// Returns `false` when the filter was left alone: `RUST_LOG` is set or
/// [`init_tracing`] has not run.
pub fn apply_logging(logging: &LoggingConfig) -> bool {
    if rust_log_pinned() {
        return false;
    }
    let Some(handle) = FILTER.get() else {
        return false;
    };
    let level = logging.level.to_ascii_lowercase();
    handle
        .modify(|filter| *filter = EnvFilter::new(&level))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_uses_level_without_rust_log() {
        if rust_log_pinned() {
            return;
        }
        assert_eq!(filter_for("warn").to_string(), "warn");
    }

    #[test]
    fn test_apply_logging_after_init() {
        let logging = LoggingConfig {
            level: "DEBUG".to_string(),
        };
        assert!(!apply_logging(&logging));

        init_tracing();
        assert_eq!(apply_logging(&logging), !rust_log_pinned());
    }
}
