//! Round result fan-out.

use super::channels::EndRoundSender;
use clickrace_sdk::objects::EndRound;

/// Delivers a round result to every connected client.
///
/// Delivery is fire-and-forget: implementations must not wait on
/// individual clients.
pub trait Broadcaster: Send + Sync {
    /// Publish `payload`; returns how many clients it was handed to.
    /// Having no connected client is not a failure.
    fn publish(&self, payload: EndRound) -> usize;
}

/// [`Broadcaster`] over a `tokio::sync::broadcast` channel.
///
/// Each WebSocket connection holds its own receiver, so a slow client
/// only lags itself and a closed one just drops its receiver.
#[derive(Debug, Clone)]
pub struct ChannelBroadcaster {
    tx: EndRoundSender,
}

impl ChannelBroadcaster {
    pub fn new(tx: EndRoundSender) -> Self {
        Self { tx }
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn publish(&self, payload: EndRound) -> usize {
        // `send` only fails when no receiver is subscribed.
        self.tx.send(payload).unwrap_or(0)
    }
}
