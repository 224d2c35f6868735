//! Tracing initialization.

use tracing_subscriber::{fmt, EnvFilter, prelude::*};

/// Filter used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_FILTER: &str = "info,xox=info,tower_http=info,axum=info";

/// Install the global subscriber. Room lifecycle events carry `room`,
/// `role` and `conn` fields; the compact formatter keeps them on one line.
///
/// RUST_LOG=debug,xox=trace shows rejected requests and timer activity.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(true))
        .try_init();
    if installed.is_err() {
        tracing::warn!("tracing subscriber already installed");
    }
}
