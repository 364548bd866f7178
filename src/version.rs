// Name and version baked in at build time, reported by GET /version and sent upstream.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// User-Agent for upstream requests, e.g. "homelab-status/0.3.0".
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
