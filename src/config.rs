//! Configuration utilities (port, static assets, grace period) from env vars.

use std::path::PathBuf;
use std::time::Duration;
use std::{env, net::{Ipv4Addr, SocketAddr}};

use crate::room::manager::DEFAULT_GRACE;

pub const DEFAULT_PORT: u16 = 3000;

/// Socket address to bind the server to.
///
/// Reads the `PORT` env var or defaults to 3000, binds to 0.0.0.0.
pub fn server_addr() -> SocketAddr {
    let port = parse_or(env::var("PORT").ok(), DEFAULT_PORT);
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

/// Directory holding `index.html`, `styles.css` and `app.js`.
/// `STATIC_DIR` env var, else `./public`.
pub fn static_dir() -> PathBuf {
    env::var("STATIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./public"))
}

/// How long a dropped player's seat is held. `XOX_GRACE_SECS`, default 60.
pub fn grace_period() -> Duration {
    let secs = parse_or(env::var("XOX_GRACE_SECS").ok(), DEFAULT_GRACE.as_secs());
    Duration::from_secs(secs)
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
