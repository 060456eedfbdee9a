//! WebSocket message types for the game stream.
//!
//! The `GET /game/ws?player={user_id}` endpoint upgrades to a WebSocket
//! connection. Opening the connection joins the player to the running
//! round; closing it removes them.
//!
//! # Protocol
//!
//! 1. The client sends a [`WsClientMessage::Click`] frame for every click.
//! 2. The server sends a [`WsServerMessage::EndRound`] frame to every
//!    connected client each time a round closes, whether or not anyone
//!    participated.
//! 3. A malformed client frame is answered with a
//!    [`WsServerMessage::Error`]; the connection stays open.
//! 4. When the server shuts down it sends a normal close frame.
//!
//! Unknown players are rejected with HTTP 404 before the upgrade.

use serde::{Deserialize, Serialize};

use super::round::EndRound;

/// Server-to-client WebSocket message.
///
/// Serialized as an internally-tagged JSON object so the client can
/// dispatch on the `"type"` field:
///
/// ```json
/// {"type":"EndRound","winners":["alice"],"nbClicks":12}
/// {"type":"Error","code":4000,"reason":"invalid message"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsServerMessage {
    /// A round has just closed.
    EndRound(EndRound),

    /// A server-side error that does **not** close the connection by
    /// itself.
    Error {
        /// Application-level error code (mirrors [`WsCloseCode`] values
        /// where applicable).
        code: u16,
        /// Human-readable reason.
        reason: String,
    },
}

/// Client-to-server WebSocket message.
///
/// ```json
/// {"type":"Click"}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsClientMessage {
    /// One click for the sending player in the current round.
    Click,
}

/// Well-known WebSocket close codes used by the game stream.
///
/// Codes in the 4000–4999 range are reserved for application use by
/// [RFC 6455 §7.4.2](https://www.rfc-editor.org/rfc/rfc6455#section-7.4.2).
pub struct WsCloseCode;

impl WsCloseCode {
    /// Normal closure.
    pub const NORMAL: u16 = 1000;

    /// The client sent a frame that is not a valid [`WsClientMessage`].
    pub const INVALID_MESSAGE: u16 = 4000;
}
