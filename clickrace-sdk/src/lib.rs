//! Shared types for Click Race.
//!
//! `objects` holds everything that crosses the wire between the server and
//! its clients. The `client` feature adds a typed HTTP + WebSocket client.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]

pub mod objects;

#[cfg(feature = "client")]
pub mod client;
