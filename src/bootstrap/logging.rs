//! Tracing initialization, driven by the single `log_level` configuration
//! field (`off`, `error`, `warn`, `info`, `debug`, `trace`).
use std::sync::Once;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initializes the global `tracing` subscriber, unless `log_level` is `off`.
///
/// # Panics
///
/// Panics if `log_level` is not one of the recognized level names.
pub fn init(log_level: &str) {
    if log_level.eq_ignore_ascii_case("off") {
        return;
    }

    let filter: LevelFilter = log_level.parse().unwrap_or_else(|_| {
        panic!("unrecognized log_level `{log_level}`, expected one of: off, error, warn, info, debug, trace")
    });

    INIT.call_once(|| {
        tracing_subscriber::fmt().with_env_filter(EnvFilter::from(filter.to_string())).init();
    });
}
