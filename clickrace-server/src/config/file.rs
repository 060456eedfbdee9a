//! TOML file configuration structures.
//!
//! These structs directly map to the `clickrace-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub game: GameConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Game configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Round length in milliseconds.
    #[serde(default = "default_round_interval_ms")]
    pub round_interval_ms: u64,
    /// Close the first round immediately at startup.
    #[serde(default = "default_close_on_start")]
    pub close_on_start: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_interval_ms: default_round_interval_ms(),
            close_on_start: default_close_on_start(),
        }
    }
}

fn default_round_interval_ms() -> u64 {
    30_000
}

fn default_close_on_start() -> bool {
    true
}
