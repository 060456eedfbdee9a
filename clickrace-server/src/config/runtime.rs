//! Validated runtime configuration.
//!
//! The game section lives in `clickrace-core` because the scheduler reads
//! it; it is re-exported here for convenience.

pub use clickrace_core::config::GameConfig;

use std::net::SocketAddr;

/// Server configuration (listen address).
///
/// Only read at startup; changing it requires a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}
