//! Runtime configuration shared between the server and the engine.
//!
//! Loading and parsing is handled by the server crate; the engine only
//! sees validated values through a [`ConfigStore`], which lets SIGHUP
//! reloads reach the running scheduler.

mod config_store;
mod game;

pub use config_store::{ConfigStore, ConfigWatcher};
pub use game::GameConfig;
