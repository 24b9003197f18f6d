//! Tracing setup for hosts and tests.
//!
//! The engine only emits `tracing` events; installing a subscriber is up to the host.
//! These helpers cover the common case.
//!
//! # Environment Variables
//!
//! - `CARTESIAN_LOG`: an `EnvFilter` directive (default: `warn`), for example
//!   `cartesian_engine=debug`.

use std::sync::Once;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "CARTESIAN_LOG";

static INIT: Once = Once::new();

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs a stderr subscriber filtered by `CARTESIAN_LOG`. Safe to call multiple times;
/// does nothing when another global subscriber is already set.
pub fn init_tracing() {
    INIT.call_once(|| {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact();
        let _ = tracing_subscriber::registry().with(filter()).with(layer).try_init();
    });
}

/// Like [`init_tracing`], but writes through the test harness so output is captured
/// per test.
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_level(true)
            .compact();
        let _ = tracing_subscriber::registry().with(filter()).with(layer).try_init();
    });
}
