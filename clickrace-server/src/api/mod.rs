//! HTTP and WebSocket API.

pub mod game;
